//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use kindred_core::{
    FamilyTree, NewPerson, NewRelationship, Person, PersonId, Relationship, RelationshipId,
    TreeId,
};

/// The two feeds of one tree that the relationship graph is built from
#[derive(Debug, Clone, Default)]
pub struct Family {
    pub people: Vec<Person>,
    pub relationships: Vec<Relationship>,
}

/// Trait for storage backend implementations
///
/// Listings are ordered by id so that graph construction, and therefore
/// path tie-breaking, is deterministic.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Tree Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a tree with an already hashed passcode
    async fn create_tree(&self, name: &str, passcode_hash: &str) -> StorageResult<FamilyTree>;

    /// Get a tree by ID
    async fn get_tree(&self, id: TreeId) -> StorageResult<Option<FamilyTree>>;

    /// Get all trees
    async fn get_all_trees(&self) -> StorageResult<Vec<FamilyTree>>;

    /// Delete a tree with all its members and relationships
    async fn delete_tree(&self, id: TreeId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Member Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a member to a tree
    async fn create_person(&self, tree: TreeId, person: NewPerson) -> StorageResult<Person>;

    /// Get a member by ID
    async fn get_person(&self, tree: TreeId, id: PersonId) -> StorageResult<Option<Person>>;

    /// Get all members of a tree
    async fn get_all_people(&self, tree: TreeId) -> StorageResult<Vec<Person>>;

    /// Replace a member's details
    async fn update_person(
        &self,
        tree: TreeId,
        id: PersonId,
        person: NewPerson,
    ) -> StorageResult<Person>;

    /// Delete a member and every relationship touching them
    async fn delete_person(&self, tree: TreeId, id: PersonId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record a relationship
    async fn create_relationship(
        &self,
        tree: TreeId,
        relationship: NewRelationship,
    ) -> StorageResult<Relationship>;

    /// Get all relationships of a tree
    async fn get_all_relationships(&self, tree: TreeId) -> StorageResult<Vec<Relationship>>;

    /// Delete a relationship
    async fn delete_relationship(&self, tree: TreeId, id: RelationshipId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Load both graph feeds for a tree
    async fn load_family(&self, tree: TreeId) -> StorageResult<Family> {
        let people = self.get_all_people(tree).await?;
        let relationships = self.get_all_relationships(tree).await?;
        Ok(Family {
            people,
            relationships,
        })
    }
}
