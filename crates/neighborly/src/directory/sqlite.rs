//! `SQLite`-backed directory store.
//!
//! Provides persistent storage for persons, groups, memberships, and
//! address contacts, so the service can run standalone. The proximity
//! engine only reads through [`DirectoryStore`]; the write helpers here
//! exist for seeding and for the geocoding write path.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::model::{
    GeoContact, GroupId, GroupRecord, OwnerKind, PersonId, PersonRecord, Visibility,
};

use super::{migrations, DirectoryStore};

/// Contact kind used for address records.
///
/// Other contact kinds (phone, email) live in the same table but are
/// invisible to the proximity engine.
const ADDRESS_KIND: &str = "address";

/// Directory store backed by a `SQLite` database.
#[derive(Debug)]
pub struct SqliteDirectory {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, serialized behind a mutex.
    conn: Mutex<Connection>,
}

impl SqliteDirectory {
    /// Open or create a directory database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening directory database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Directory database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory directory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("directory connection lock poisoned"))
    }

    /// Insert a person and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_person(&self, name: &str) -> Result<PersonId> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO persons (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a group and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_group(&self, name: &str) -> Result<GroupId> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO groups (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Record a group membership. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_membership(&self, person_id: PersonId, group_id: GroupId) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO group_members (person_id, group_id) VALUES (?1, ?2)",
            params![person_id, group_id],
        )?;
        Ok(())
    }

    /// Insert an address contact and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_address_contact(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
        address: &str,
        coordinate: Option<Coordinate>,
        visibility: Visibility,
    ) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT INTO contacts (owner_kind, owner_id, kind, address, latitude, longitude, visibility)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                owner_kind.to_string(),
                owner_id,
                ADDRESS_KIND,
                address,
                coordinate.map(|c| c.latitude),
                coordinate.map(|c| c.longitude),
                visibility.to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Store a geocoded coordinate on an existing contact.
    ///
    /// This is the write path the geocoding collaborator uses after
    /// resolving the address text.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_contact_coordinate(&self, contact_id: i64, coordinate: Coordinate) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE contacts SET latitude = ?1, longitude = ?2 WHERE id = ?3",
            params![coordinate.latitude, coordinate.longitude, contact_id],
        )?;
        Ok(())
    }

    /// Soft-delete a person.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn mark_person_deleted(&self, person_id: PersonId) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("UPDATE persons SET deleted = 1 WHERE id = ?1", [person_id])?;
        Ok(())
    }

    /// Soft-delete a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn mark_group_deleted(&self, group_id: GroupId) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("UPDATE groups SET deleted = 1 WHERE id = ?1", [group_id])?;
        Ok(())
    }

    fn row_to_named_record(row: &Row<'_>) -> rusqlite::Result<(i64, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::internal(format!("invalid created_at timestamp '{raw}': {e}")))
    }

    fn parse_owner_kind(raw: &str) -> Result<OwnerKind> {
        match raw {
            "person" => Ok(OwnerKind::Person),
            "group" => Ok(OwnerKind::Group),
            other => Err(Error::internal(format!("unknown owner kind '{other}'"))),
        }
    }

    fn parse_visibility(raw: &str) -> Result<Visibility> {
        match raw {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(Error::internal(format!("unknown visibility '{other}'"))),
        }
    }
}

#[async_trait]
impl DirectoryStore for SqliteDirectory {
    async fn persons(&self) -> Result<Vec<PersonRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r"
            SELECT id, name, created_at FROM persons
            WHERE deleted = 0 ORDER BY created_at, id
            ",
        )?;

        let rows = stmt
            .query_map([], Self::row_to_named_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(PersonRecord {
                    id,
                    name,
                    created_at: Self::parse_created_at(&created_at)?,
                    deleted: false,
                })
            })
            .collect()
    }

    async fn groups(&self) -> Result<Vec<GroupRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r"
            SELECT id, name, created_at FROM groups
            WHERE deleted = 0 ORDER BY created_at, id
            ",
        )?;

        let rows = stmt
            .query_map([], Self::row_to_named_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(GroupRecord {
                    id,
                    name,
                    created_at: Self::parse_created_at(&created_at)?,
                    deleted: false,
                })
            })
            .collect()
    }

    async fn address_contacts(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
    ) -> Result<Vec<GeoContact>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r"
            SELECT id, owner_kind, owner_id, address, latitude, longitude, visibility
            FROM contacts
            WHERE kind = ?1 AND deleted = 0 AND owner_kind = ?2 AND owner_id = ?3
            ORDER BY id
            ",
        )?;

        type ContactRow = (i64, String, i64, String, Option<f64>, Option<f64>, String);
        let rows = stmt
            .query_map(
                params![ADDRESS_KIND, owner_kind.to_string(), owner_id],
                |row| {
                    Ok::<ContactRow, rusqlite::Error>((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, kind, owner, address, lat, lng, visibility)| {
                // A row with only one component geocoded is treated as
                // ungeocoded rather than rejected.
                let coordinate = match (lat, lng) {
                    (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
                    _ => None,
                };
                Ok(GeoContact {
                    id,
                    owner_kind: Self::parse_owner_kind(&kind)?,
                    owner_id: owner,
                    address,
                    coordinate,
                    visibility: Self::parse_visibility(&visibility)?,
                })
            })
            .collect()
    }

    async fn group_memberships(&self, person_id: PersonId) -> Result<Vec<GroupId>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT group_id FROM group_members WHERE person_id = ?1 ORDER BY group_id",
        )?;

        let ids = stmt
            .query_map([person_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
