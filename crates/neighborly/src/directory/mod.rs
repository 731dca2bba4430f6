//! Directory store abstraction.
//!
//! This module defines the read-only collaborator seam the proximity search
//! consumes, plus the bundled implementations: a `SQLite`-backed store for
//! running standalone and an in-memory store for tests and demos.

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{GeoContact, GroupId, GroupRecord, OwnerKind, PersonId, PersonRecord};

pub use memory::MemoryDirectory;
pub use sqlite::SqliteDirectory;

/// Read access to the community directory.
///
/// Implementors must return only non-deleted records, in entity creation
/// order, and must include the privacy flag and nullable coordinate on
/// every contact. The proximity engine never writes through this trait.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All non-deleted persons, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn persons(&self) -> Result<Vec<PersonRecord>>;

    /// All non-deleted groups, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn groups(&self) -> Result<Vec<GroupRecord>>;

    /// Non-deleted address-kind contact records for one owning entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn address_contacts(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
    ) -> Result<Vec<GeoContact>>;

    /// Identifiers of every group the person is a member of, any role.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn group_memberships(&self, person_id: PersonId) -> Result<Vec<GroupId>>;
}
