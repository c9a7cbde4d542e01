//! Family tree (namespace) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for a family tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(pub i64);

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TreeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A passcode-protected family tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyTree {
    /// Unique identifier
    pub id: TreeId,

    /// Display name of the tree
    pub name: String,

    /// bcrypt hash of the shared passcode
    #[serde(skip_serializing, default)]
    pub passcode_hash: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl FamilyTree {
    pub fn new(id: TreeId, name: impl Into<String>, passcode_hash: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            passcode_hash: passcode_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Public view of the tree, safe to hand to clients
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Id and name of a tree, without the passcode hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub id: TreeId,
    pub name: String,
}
