//! Kindred Core - Family relationship graph engine
//!
//! This crate provides the data types for family trees, the bidirectional
//! relationship graph built from recorded edges, and the breadth-first path
//! resolver that connects any two people in a tree.

pub mod error;
pub mod graph;
pub mod limits;
pub mod passcode;
pub mod path;
pub mod person;
pub mod relation;
pub mod tree;

pub use error::{Error, Result};
pub use graph::{Neighbor, RelationshipGraph};
pub use path::{
    find_path, resolve_relationship_path, HydratedPath, HydratedStep, PathResolver, PathStep,
    RelationshipPath, VisitStrategy,
};
pub use person::{NewPerson, Person, PersonId};
pub use relation::{NewRelationship, Relationship, RelationshipId, RelationshipKind};
pub use tree::{FamilyTree, TreeId, TreeSummary};
