//! Domain types for the community directory.
//!
//! This module defines the directory entities the proximity search reads
//! (persons, groups, address contacts) and the public projections it
//! returns to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Identifier for a person entity.
pub type PersonId = i64;

/// Identifier for a group entity.
pub type GroupId = i64;

/// Which kind of entity owns a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    /// The contact belongs to a person.
    Person,
    /// The contact belongs to a group.
    Group,
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// Per-record privacy flag on a contact record.
///
/// Gates whether non-admin viewers may use the record as a location source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to every authenticated viewer.
    Public,
    /// Visible only to system admins.
    Private,
}

impl Visibility {
    /// Whether a viewer with the given admin flag may use this record.
    #[must_use]
    pub fn visible_to(self, viewer_is_admin: bool) -> bool {
        match self {
            Self::Public => true,
            Self::Private => viewer_is_admin,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// An address-kind contact record with an optional geocoded coordinate.
///
/// The coordinate is written once by the geocoding collaborator when the
/// address text is created or edited; this subsystem only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoContact {
    /// Identifier of the contact record.
    pub id: i64,
    /// Kind of the owning entity.
    pub owner_kind: OwnerKind,
    /// Identifier of the owning entity.
    pub owner_id: i64,
    /// Free-text address as entered.
    pub address: String,
    /// Geocoded position, `None` until the geocoder has resolved the address.
    pub coordinate: Option<Coordinate>,
    /// Privacy flag for this record.
    pub visibility: Visibility,
}

impl GeoContact {
    /// The coordinate, if geocoded and visible to the given viewer.
    #[must_use]
    pub fn usable_coordinate(&self, viewer_is_admin: bool) -> Option<Coordinate> {
        if self.visibility.visible_to(viewer_is_admin) {
            self.coordinate
        } else {
            None
        }
    }
}

/// A person entity as stored in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Identifier of the person.
    pub id: PersonId,
    /// Display name.
    pub name: String,
    /// When the record was created (drives deterministic tie-breaks).
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag; deleted persons never appear in results.
    pub deleted: bool,
}

/// A group entity as stored in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Identifier of the group.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// When the record was created (drives deterministic tie-breaks).
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag; deleted groups never appear in results.
    pub deleted: bool,
}

/// Common surface of the candidate entity records.
///
/// The aggregator keys on `id` and breaks distance ties with `created_at`,
/// so both candidate kinds expose them uniformly.
pub trait DirectoryEntity {
    /// Identifier of the entity.
    fn id(&self) -> i64;
    /// When the entity was created.
    fn created_at(&self) -> DateTime<Utc>;
}

impl DirectoryEntity for PersonRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl DirectoryEntity for GroupRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Public projection of a person, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    /// Identifier of the person.
    pub id: PersonId,
    /// Display name.
    pub name: String,
}

impl From<&PersonRecord> for PersonSummary {
    fn from(record: &PersonRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
        }
    }
}

/// Public projection of a group, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    /// Identifier of the group.
    pub id: GroupId,
    /// Display name.
    pub name: String,
}

impl From<&GroupRecord> for GroupSummary {
    fn from(record: &GroupRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
        }
    }
}

/// One ranked search hit: an entity and its minimum distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityResult<T> {
    /// The public projection of the matched entity.
    pub entity: T,
    /// Minimum great-circle distance in miles across all reference points.
    pub distance_miles: f64,
}

/// The full response of a proximity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityResponse {
    /// Nearby persons, ascending by distance.
    pub persons: Vec<ProximityResult<PersonSummary>>,
    /// Nearby groups, ascending by distance.
    pub groups: Vec<ProximityResult<GroupSummary>>,
    /// How many reference locations drove the search.
    ///
    /// Zero is a distinguished state: the caller has no usable reference
    /// location, which the UI must not conflate with "no results in radius".
    pub reference_point_count: usize,
}

impl ProximityResponse {
    /// The response for a caller with no usable reference location.
    #[must_use]
    pub fn zero_references() -> Self {
        Self {
            persons: Vec::new(),
            groups: Vec::new(),
            reference_point_count: 0,
        }
    }
}

/// The resolved identity of the caller, supplied by the session layer.
///
/// Passed explicitly into the service call rather than read from ambient
/// request state, so the engine is testable without a live session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentActor {
    /// The caller's active person, if one is selected.
    pub person_id: Option<PersonId>,
    /// Whether the caller is a system admin.
    pub is_system_admin: bool,
}

impl CurrentActor {
    /// An actor with an active person profile.
    #[must_use]
    pub fn person(person_id: PersonId) -> Self {
        Self {
            person_id: Some(person_id),
            is_system_admin: false,
        }
    }

    /// An admin actor with an active person profile.
    #[must_use]
    pub fn admin(person_id: PersonId) -> Self {
        Self {
            person_id: Some(person_id),
            is_system_admin: true,
        }
    }

    /// An authenticated actor with no active person selected.
    #[must_use]
    pub fn no_active_profile() -> Self {
        Self {
            person_id: None,
            is_system_admin: false,
        }
    }
}
