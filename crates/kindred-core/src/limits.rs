//! Input validation limits for stored records

use crate::person::{NewPerson, PersonId};
use crate::relation::NewRelationship;

/// Maximum length for tree names (128 chars)
pub const MAX_TREE_NAME_LEN: usize = 128;

/// Maximum length for person names (256 chars)
pub const MAX_PERSON_NAME_LEN: usize = 256;

/// Maximum length for person notes (64KB)
pub const MAX_NOTES_LEN: usize = 64 * 1024;

/// Maximum length for a relationship kind (64 chars)
pub const MAX_KIND_LEN: usize = 64;

/// Maximum passcode length in bytes; bcrypt ignores anything past 72
pub const MAX_PASSCODE_LEN: usize = 72;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyTreeName,
    TreeNameTooLong { len: usize, max: usize },
    EmptyPersonName,
    PersonNameTooLong { len: usize, max: usize },
    NotesTooLong { len: usize, max: usize },
    EmptyKind,
    KindTooLong { len: usize, max: usize },
    EmptyPasscode,
    PasscodeTooLong { len: usize, max: usize },
    SelfRelationship,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTreeName => write!(f, "Tree name cannot be empty"),
            Self::TreeNameTooLong { len, max } => {
                write!(f, "Tree name too long: {} chars (max {})", len, max)
            }
            Self::EmptyPersonName => write!(f, "Name is required"),
            Self::PersonNameTooLong { len, max } => {
                write!(f, "Name too long: {} chars (max {})", len, max)
            }
            Self::NotesTooLong { len, max } => {
                write!(f, "Notes too long: {} chars (max {})", len, max)
            }
            Self::EmptyKind => write!(f, "Relationship type cannot be empty"),
            Self::KindTooLong { len, max } => {
                write!(f, "Relationship type too long: {} chars (max {})", len, max)
            }
            Self::EmptyPasscode => write!(f, "Passcode cannot be empty"),
            Self::PasscodeTooLong { len, max } => {
                write!(f, "Passcode too long: {} bytes (max {})", len, max)
            }
            Self::SelfRelationship => {
                write!(f, "A person cannot have a relationship with themselves")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate tree name
pub fn validate_tree_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyTreeName);
    }
    let len = name.chars().count();
    if len > MAX_TREE_NAME_LEN {
        return Err(ValidationError::TreeNameTooLong {
            len,
            max: MAX_TREE_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate a passcode before hashing
pub fn validate_passcode(passcode: &str) -> Result<(), ValidationError> {
    if passcode.is_empty() {
        return Err(ValidationError::EmptyPasscode);
    }
    if passcode.len() > MAX_PASSCODE_LEN {
        return Err(ValidationError::PasscodeTooLong {
            len: passcode.len(),
            max: MAX_PASSCODE_LEN,
        });
    }
    Ok(())
}

/// Validate a person record
pub fn validate_person(person: &NewPerson) -> Result<(), ValidationError> {
    let name = person.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyPersonName);
    }
    let len = name.chars().count();
    if len > MAX_PERSON_NAME_LEN {
        return Err(ValidationError::PersonNameTooLong {
            len,
            max: MAX_PERSON_NAME_LEN,
        });
    }
    if let Some(notes) = &person.notes {
        let len = notes.chars().count();
        if len > MAX_NOTES_LEN {
            return Err(ValidationError::NotesTooLong {
                len,
                max: MAX_NOTES_LEN,
            });
        }
    }
    Ok(())
}

/// Validate that two people may be related
pub fn validate_distinct(person1: PersonId, person2: PersonId) -> Result<(), ValidationError> {
    if person1 == person2 {
        return Err(ValidationError::SelfRelationship);
    }
    Ok(())
}

/// Validate a relationship record
pub fn validate_relationship(rel: &NewRelationship) -> Result<(), ValidationError> {
    validate_distinct(rel.person1_id, rel.person2_id)?;

    let kind = rel.relationship_type.as_str();
    if kind.trim().is_empty() {
        return Err(ValidationError::EmptyKind);
    }
    let len = kind.chars().count();
    if len > MAX_KIND_LEN {
        return Err(ValidationError::KindTooLong {
            len,
            max: MAX_KIND_LEN,
        });
    }
    Ok(())
}
