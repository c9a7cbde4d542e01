//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use kindred_core::{
    FamilyTree, NewPerson, NewRelationship, Person, PersonId, Relationship, RelationshipId,
    TreeId,
};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct Tables {
    trees: BTreeMap<TreeId, FamilyTree>,
    people: BTreeMap<PersonId, Person>,
    relationships: BTreeMap<RelationshipId, Relationship>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_tree(&self, tree: TreeId) -> StorageResult<()> {
        if self.trees.contains_key(&tree) {
            Ok(())
        } else {
            Err(StorageError::TreeNotFound(tree))
        }
    }
}

/// In-memory storage backend
///
/// Useful for testing and temporary storage. Ids come from a single counter
/// shared by all record types, like an auto-increment column.
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(self.tables.read().is_ok())
    }

    // Tree operations

    async fn create_tree(&self, name: &str, passcode_hash: &str) -> StorageResult<FamilyTree> {
        let mut tables = self.write()?;
        let id = TreeId(tables.next_id());
        let tree = FamilyTree::new(id, name, passcode_hash);
        tables.trees.insert(id, tree.clone());
        Ok(tree)
    }

    async fn get_tree(&self, id: TreeId) -> StorageResult<Option<FamilyTree>> {
        Ok(self.read()?.trees.get(&id).cloned())
    }

    async fn get_all_trees(&self) -> StorageResult<Vec<FamilyTree>> {
        Ok(self.read()?.trees.values().cloned().collect())
    }

    async fn delete_tree(&self, id: TreeId) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.trees.remove(&id).is_none() {
            return Err(StorageError::TreeNotFound(id));
        }
        tables.people.retain(|_, p| p.tree_id != id);
        tables.relationships.retain(|_, r| r.tree_id != id);
        Ok(())
    }

    // Member operations

    async fn create_person(&self, tree: TreeId, person: NewPerson) -> StorageResult<Person> {
        let mut tables = self.write()?;
        tables.require_tree(tree)?;

        let id = PersonId(tables.next_id());
        let person = Person::new(id, tree, person);
        tables.people.insert(id, person.clone());
        Ok(person)
    }

    async fn get_person(&self, tree: TreeId, id: PersonId) -> StorageResult<Option<Person>> {
        Ok(self
            .read()?
            .people
            .get(&id)
            .filter(|p| p.tree_id == tree)
            .cloned())
    }

    async fn get_all_people(&self, tree: TreeId) -> StorageResult<Vec<Person>> {
        Ok(self
            .read()?
            .people
            .values()
            .filter(|p| p.tree_id == tree)
            .cloned()
            .collect())
    }

    async fn update_person(
        &self,
        tree: TreeId,
        id: PersonId,
        person: NewPerson,
    ) -> StorageResult<Person> {
        let mut tables = self.write()?;
        match tables.people.get_mut(&id) {
            Some(existing) if existing.tree_id == tree => {
                existing.apply(person);
                Ok(existing.clone())
            }
            _ => Err(StorageError::PersonNotFound(id)),
        }
    }

    async fn delete_person(&self, tree: TreeId, id: PersonId) -> StorageResult<()> {
        let mut tables = self.write()?;
        match tables.people.get(&id) {
            Some(p) if p.tree_id == tree => {}
            _ => return Err(StorageError::PersonNotFound(id)),
        }
        tables.people.remove(&id);
        tables.relationships.retain(|_, r| !r.involves(id));
        Ok(())
    }

    // Relationship operations

    async fn create_relationship(
        &self,
        tree: TreeId,
        relationship: NewRelationship,
    ) -> StorageResult<Relationship> {
        let mut tables = self.write()?;
        tables.require_tree(tree)?;

        for person in [relationship.person1_id, relationship.person2_id] {
            if tables.people.get(&person).map(|p| p.tree_id) != Some(tree) {
                return Err(StorageError::PersonNotFound(person));
            }
        }

        if tables.relationships.values().any(|r| relationship.matches(r)) {
            return Err(StorageError::DuplicateRelationship);
        }

        let id = RelationshipId(tables.next_id());
        let relationship = Relationship::new(
            id,
            tree,
            relationship.person1_id,
            relationship.person2_id,
            relationship.relationship_type,
        );
        tables.relationships.insert(id, relationship.clone());
        Ok(relationship)
    }

    async fn get_all_relationships(&self, tree: TreeId) -> StorageResult<Vec<Relationship>> {
        Ok(self
            .read()?
            .relationships
            .values()
            .filter(|r| r.tree_id == tree)
            .cloned()
            .collect())
    }

    async fn delete_relationship(&self, tree: TreeId, id: RelationshipId) -> StorageResult<()> {
        let mut tables = self.write()?;
        match tables.relationships.get(&id) {
            Some(r) if r.tree_id == tree => {
                tables.relationships.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::RelationshipNotFound(id)),
        }
    }
}
