//! Person (family member) types

use crate::tree::TreeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for a person within a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A recorded family member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier (unique within the tree)
    pub id: PersonId,

    /// Tree this person belongs to
    pub tree_id: TreeId,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub birth_date: Option<String>,

    #[serde(default)]
    pub death_date: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub photo_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Person {
    /// Create a person from its input record
    pub fn new(id: PersonId, tree_id: TreeId, details: NewPerson) -> Self {
        Self {
            id,
            tree_id,
            name: details.name,
            gender: details.gender,
            birth_date: details.birth_date,
            death_date: details.death_date,
            notes: details.notes,
            photo_url: details.photo_url,
            created_at: Utc::now(),
        }
    }

    /// Replace every editable field, keeping id, tree and creation time
    pub fn apply(&mut self, details: NewPerson) {
        self.name = details.name;
        self.gender = details.gender;
        self.birth_date = details.birth_date;
        self.death_date = details.death_date;
        self.notes = details.notes;
        self.photo_url = details.photo_url;
    }
}

/// Data for creating or replacing a person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_birth_date(mut self, date: impl Into<String>) -> Self {
        self.birth_date = Some(date.into());
        self
    }

    pub fn with_death_date(mut self, date: impl Into<String>) -> Self {
        self.death_date = Some(date.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Blank optional fields are stored as absent
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        self.name = self.name.trim().to_string();
        self.gender = blank_to_none(self.gender);
        self.birth_date = blank_to_none(self.birth_date);
        self.death_date = blank_to_none(self.death_date);
        self.notes = blank_to_none(self.notes);
        self.photo_url = blank_to_none(self.photo_url);
        self
    }
}
