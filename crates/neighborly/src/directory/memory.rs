//! In-memory directory store.
//!
//! Backs tests and demos with a directory that lives entirely in process
//! memory. Creation order is deterministic: each inserted entity gets a
//! timestamp strictly later than the previous one.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::Result;
use crate::geo::Coordinate;
use crate::model::{
    GeoContact, GroupId, GroupRecord, OwnerKind, PersonId, PersonRecord, Visibility,
};

use super::DirectoryStore;

#[derive(Debug, Default)]
struct Inner {
    persons: Vec<PersonRecord>,
    groups: Vec<GroupRecord>,
    contacts: Vec<GeoContact>,
    memberships: Vec<(PersonId, GroupId)>,
    seq: i64,
}

impl Inner {
    fn next_created_at(&mut self) -> DateTime<Utc> {
        self.seq += 1;
        Utc.timestamp_opt(self.seq, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// An in-memory [`DirectoryStore`].
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    inner: Mutex<Inner>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a person and return its id.
    pub fn add_person(&self, name: impl Into<String>) -> PersonId {
        let mut inner = self.inner.lock().expect("directory lock poisoned");
        let id = inner.persons.len() as PersonId + 1;
        let created_at = inner.next_created_at();
        inner.persons.push(PersonRecord {
            id,
            name: name.into(),
            created_at,
            deleted: false,
        });
        id
    }

    /// Insert a group and return its id.
    pub fn add_group(&self, name: impl Into<String>) -> GroupId {
        let mut inner = self.inner.lock().expect("directory lock poisoned");
        let id = inner.groups.len() as GroupId + 1;
        let created_at = inner.next_created_at();
        inner.groups.push(GroupRecord {
            id,
            name: name.into(),
            created_at,
            deleted: false,
        });
        id
    }

    /// Record that a person is a member of a group.
    pub fn add_membership(&self, person_id: PersonId, group_id: GroupId) {
        let mut inner = self.inner.lock().expect("directory lock poisoned");
        inner.memberships.push((person_id, group_id));
    }

    /// Insert an address contact for an entity and return the contact id.
    pub fn add_address(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
        address: impl Into<String>,
        coordinate: Option<Coordinate>,
        visibility: Visibility,
    ) -> i64 {
        let mut inner = self.inner.lock().expect("directory lock poisoned");
        let id = inner.contacts.len() as i64 + 1;
        inner.contacts.push(GeoContact {
            id,
            owner_kind,
            owner_id,
            address: address.into(),
            coordinate,
            visibility,
        });
        id
    }

    /// Soft-delete a person.
    pub fn mark_person_deleted(&self, person_id: PersonId) {
        let mut inner = self.inner.lock().expect("directory lock poisoned");
        if let Some(person) = inner.persons.iter_mut().find(|p| p.id == person_id) {
            person.deleted = true;
        }
    }

    /// Soft-delete a group.
    pub fn mark_group_deleted(&self, group_id: GroupId) {
        let mut inner = self.inner.lock().expect("directory lock poisoned");
        if let Some(group) = inner.groups.iter_mut().find(|g| g.id == group_id) {
            group.deleted = true;
        }
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn persons(&self) -> Result<Vec<PersonRecord>> {
        let inner = self.inner.lock().expect("directory lock poisoned");
        Ok(inner
            .persons
            .iter()
            .filter(|p| !p.deleted)
            .cloned()
            .collect())
    }

    async fn groups(&self) -> Result<Vec<GroupRecord>> {
        let inner = self.inner.lock().expect("directory lock poisoned");
        Ok(inner
            .groups
            .iter()
            .filter(|g| !g.deleted)
            .cloned()
            .collect())
    }

    async fn address_contacts(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
    ) -> Result<Vec<GeoContact>> {
        let inner = self.inner.lock().expect("directory lock poisoned");
        Ok(inner
            .contacts
            .iter()
            .filter(|c| c.owner_kind == owner_kind && c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn group_memberships(&self, person_id: PersonId) -> Result<Vec<GroupId>> {
        let inner = self.inner.lock().expect("directory lock poisoned");
        Ok(inner
            .memberships
            .iter()
            .filter(|(p, _)| *p == person_id)
            .map(|(_, g)| *g)
            .collect())
    }
}
