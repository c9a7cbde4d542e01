//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_core::{
    FamilyTree, NewPerson, NewRelationship, Person, PersonId, Relationship, RelationshipId,
    RelationshipKind, TreeId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const PERSON_COLUMNS: &str =
    "id, tree_id, name, gender, birth_date, death_date, notes, photo_url, created_at";

const SCHEMA_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS family_trees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        passcode_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS family_members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tree_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        gender TEXT,
        birth_date TEXT,
        death_date TEXT,
        notes TEXT,
        photo_url TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (tree_id) REFERENCES family_trees(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS relationships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tree_id INTEGER NOT NULL,
        person1_id INTEGER NOT NULL,
        person2_id INTEGER NOT NULL,
        relationship_type TEXT NOT NULL,
        FOREIGN KEY (tree_id) REFERENCES family_trees(id) ON DELETE CASCADE,
        FOREIGN KEY (person1_id) REFERENCES family_members(id) ON DELETE CASCADE,
        FOREIGN KEY (person2_id) REFERENCES family_members(id) ON DELETE CASCADE,
        UNIQUE (person1_id, person2_id, relationship_type)
    );

    CREATE INDEX IF NOT EXISTS idx_members_tree ON family_members(tree_id);
    CREATE INDEX IF NOT EXISTS idx_relationships_tree ON relationships(tree_id);
"#;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!("Opening SQLite database at {:?}", path);
        Self::with_connection(Connection::open(path)?)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
        Ok(Person {
            id: PersonId(row.get(0)?),
            tree_id: TreeId(row.get(1)?),
            name: row.get(2)?,
            gender: row.get(3)?,
            birth_date: row.get(4)?,
            death_date: row.get(5)?,
            notes: row.get(6)?,
            photo_url: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
        let kind: String = row.get(4)?;
        Ok(Relationship {
            id: RelationshipId(row.get(0)?),
            tree_id: TreeId(row.get(1)?),
            person1_id: PersonId(row.get(2)?),
            person2_id: PersonId(row.get(3)?),
            relationship_type: RelationshipKind::from(kind),
        })
    }

    fn tree_from_row(row: &Row<'_>) -> rusqlite::Result<FamilyTree> {
        Ok(FamilyTree {
            id: TreeId(row.get(0)?),
            name: row.get(1)?,
            passcode_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn tree_exists(conn: &Connection, tree: TreeId) -> StorageResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM family_trees WHERE id = ?1",
                params![tree.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn person_in_tree(conn: &Connection, tree: TreeId, id: PersonId) -> StorageResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM family_members WHERE id = ?1 AND tree_id = ?2",
                params![id.0, tree.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

impl Migratable for SqliteStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self.lock()?;
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!("PRAGMA user_version = {};", version))?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        let conn = self.lock()?;
        match version {
            1 => conn.execute_batch(SCHEMA_V1)?,
            other => {
                return Err(StorageError::Migration(format!(
                    "No migration defined for schema version {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.lock()?;
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(one == 1)
    }

    async fn create_tree(&self, name: &str, passcode_hash: &str) -> StorageResult<FamilyTree> {
        let conn = self.lock()?;
        let created_at: DateTime<Utc> = Utc::now();

        conn.execute(
            "INSERT INTO family_trees (name, passcode_hash, created_at) VALUES (?1, ?2, ?3)",
            params![name, passcode_hash, created_at],
        )?;

        Ok(FamilyTree {
            id: TreeId(conn.last_insert_rowid()),
            name: name.to_string(),
            passcode_hash: passcode_hash.to_string(),
            created_at,
        })
    }

    async fn get_tree(&self, id: TreeId) -> StorageResult<Option<FamilyTree>> {
        let conn = self.lock()?;
        let tree = conn
            .query_row(
                "SELECT id, name, passcode_hash, created_at FROM family_trees WHERE id = ?1",
                params![id.0],
                Self::tree_from_row,
            )
            .optional()?;
        Ok(tree)
    }

    async fn get_all_trees(&self) -> StorageResult<Vec<FamilyTree>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, passcode_hash, created_at FROM family_trees ORDER BY id",
        )?;
        let trees = stmt
            .query_map([], Self::tree_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(trees)
    }

    async fn delete_tree(&self, id: TreeId) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM relationships WHERE tree_id = ?1", params![id.0])?;
        tx.execute("DELETE FROM family_members WHERE tree_id = ?1", params![id.0])?;
        let deleted = tx.execute("DELETE FROM family_trees WHERE id = ?1", params![id.0])?;
        if deleted == 0 {
            return Err(StorageError::TreeNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    async fn create_person(&self, tree: TreeId, person: NewPerson) -> StorageResult<Person> {
        let conn = self.lock()?;
        if !Self::tree_exists(&conn, tree)? {
            return Err(StorageError::TreeNotFound(tree));
        }

        let created_at: DateTime<Utc> = Utc::now();
        conn.execute(
            "INSERT INTO family_members (tree_id, name, gender, birth_date, death_date, notes, photo_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                tree.0,
                person.name,
                person.gender,
                person.birth_date,
                person.death_date,
                person.notes,
                person.photo_url,
                created_at
            ],
        )?;

        let mut created = Person::new(PersonId(conn.last_insert_rowid()), tree, person);
        created.created_at = created_at;
        Ok(created)
    }

    async fn get_person(&self, tree: TreeId, id: PersonId) -> StorageResult<Option<Person>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM family_members WHERE id = ?1 AND tree_id = ?2",
            PERSON_COLUMNS
        );
        let person = conn
            .query_row(&sql, params![id.0, tree.0], Self::person_from_row)
            .optional()?;
        Ok(person)
    }

    async fn get_all_people(&self, tree: TreeId) -> StorageResult<Vec<Person>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM family_members WHERE tree_id = ?1 ORDER BY id",
            PERSON_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let people = stmt
            .query_map(params![tree.0], Self::person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(people)
    }

    async fn update_person(
        &self,
        tree: TreeId,
        id: PersonId,
        person: NewPerson,
    ) -> StorageResult<Person> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE family_members
             SET name = ?1, gender = ?2, birth_date = ?3, death_date = ?4, notes = ?5, photo_url = ?6
             WHERE id = ?7 AND tree_id = ?8",
            params![
                person.name,
                person.gender,
                person.birth_date,
                person.death_date,
                person.notes,
                person.photo_url,
                id.0,
                tree.0
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::PersonNotFound(id));
        }

        let sql = format!("SELECT {} FROM family_members WHERE id = ?1", PERSON_COLUMNS);
        Ok(conn.query_row(&sql, params![id.0], Self::person_from_row)?)
    }

    async fn delete_person(&self, tree: TreeId, id: PersonId) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM relationships WHERE tree_id = ?1 AND (person1_id = ?2 OR person2_id = ?2)",
            params![tree.0, id.0],
        )?;
        let deleted = tx.execute(
            "DELETE FROM family_members WHERE id = ?1 AND tree_id = ?2",
            params![id.0, tree.0],
        )?;
        if deleted == 0 {
            return Err(StorageError::PersonNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    async fn create_relationship(
        &self,
        tree: TreeId,
        relationship: NewRelationship,
    ) -> StorageResult<Relationship> {
        let conn = self.lock()?;
        if !Self::tree_exists(&conn, tree)? {
            return Err(StorageError::TreeNotFound(tree));
        }
        for person in [relationship.person1_id, relationship.person2_id] {
            if !Self::person_in_tree(&conn, tree, person)? {
                return Err(StorageError::PersonNotFound(person));
            }
        }

        let result = conn.execute(
            "INSERT INTO relationships (tree_id, person1_id, person2_id, relationship_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tree.0,
                relationship.person1_id.0,
                relationship.person2_id.0,
                relationship.relationship_type.as_str()
            ],
        );

        match result {
            Ok(_) => Ok(Relationship::new(
                RelationshipId(conn.last_insert_rowid()),
                tree,
                relationship.person1_id,
                relationship.person2_id,
                relationship.relationship_type,
            )),
            Err(e) if Self::is_unique_violation(&e) => Err(StorageError::DuplicateRelationship),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_all_relationships(&self, tree: TreeId) -> StorageResult<Vec<Relationship>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, tree_id, person1_id, person2_id, relationship_type
             FROM relationships WHERE tree_id = ?1 ORDER BY id",
        )?;
        let relationships = stmt
            .query_map(params![tree.0], Self::relationship_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(relationships)
    }

    async fn delete_relationship(&self, tree: TreeId, id: RelationshipId) -> StorageResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM relationships WHERE id = ?1 AND tree_id = ?2",
            params![id.0, tree.0],
        )?;
        if deleted == 0 {
            return Err(StorageError::RelationshipNotFound(id));
        }
        Ok(())
    }
}
