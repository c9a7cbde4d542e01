//! Relationship (edge) types and the reverse-kind mapping

use crate::person::PersonId;
use crate::tree::TreeId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub i64);

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RelationshipId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Kind of a relationship, read as "person1 is the `kind` of person2"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipKind {
    Parent,
    Child,
    Spouse,
    Sibling,
    /// Any kind outside the built-in vocabulary
    Other(String),
}

impl RelationshipKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Spouse => "spouse",
            Self::Sibling => "sibling",
            Self::Other(kind) => kind,
        }
    }

    /// The kind as seen from the other end of the edge.
    ///
    /// Custom kinds map to themselves.
    pub fn reverse(&self) -> Self {
        match self {
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
            Self::Spouse => Self::Spouse,
            Self::Sibling => Self::Sibling,
            Self::Other(kind) => Self::Other(kind.clone()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for RelationshipKind {
    fn from(s: &str) -> Self {
        match s {
            "parent" => Self::Parent,
            "child" => Self::Child,
            "spouse" => Self::Spouse,
            "sibling" => Self::Sibling,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RelationshipKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "parent" | "child" | "spouse" | "sibling" => Self::from(s.as_str()),
            _ => Self::Other(s),
        }
    }
}

impl From<RelationshipKind> for String {
    fn from(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::Other(kind) => kind,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored relationship between two people of the same tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier
    pub id: RelationshipId,

    /// Tree this relationship belongs to
    pub tree_id: TreeId,

    pub person1_id: PersonId,

    pub person2_id: PersonId,

    /// How person1 relates to person2
    pub relationship_type: RelationshipKind,
}

impl Relationship {
    pub fn new(
        id: RelationshipId,
        tree_id: TreeId,
        person1_id: PersonId,
        person2_id: PersonId,
        relationship_type: impl Into<RelationshipKind>,
    ) -> Self {
        Self {
            id,
            tree_id,
            person1_id,
            person2_id,
            relationship_type: relationship_type.into(),
        }
    }

    /// Whether this edge touches the given person
    pub fn involves(&self, person: PersonId) -> bool {
        self.person1_id == person || self.person2_id == person
    }
}

/// Data for creating a new relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelationship {
    pub person1_id: PersonId,
    pub person2_id: PersonId,
    pub relationship_type: RelationshipKind,
}

impl NewRelationship {
    pub fn new(
        person1_id: PersonId,
        person2_id: PersonId,
        relationship_type: impl Into<RelationshipKind>,
    ) -> Self {
        Self {
            person1_id,
            person2_id,
            relationship_type: relationship_type.into(),
        }
    }

    /// Same endpoints and kind as a stored relationship
    pub fn matches(&self, existing: &Relationship) -> bool {
        existing.person1_id == self.person1_id
            && existing.person2_id == self.person2_id
            && existing.relationship_type == self.relationship_type
    }
}
