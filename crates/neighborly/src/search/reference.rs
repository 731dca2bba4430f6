//! Reference set builder.
//!
//! Derives the caller's set of reference locations: their own visible
//! geocoded addresses plus the addresses of every group they belong to.
//! Reference locations drive the scan and are never returned to clients.

use std::collections::HashSet;

use tracing::debug;

use crate::directory::DirectoryStore;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::model::{CurrentActor, GroupId, OwnerKind};

/// Where a reference location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// One of the caller's own addresses.
    OwnAddress,
    /// An address of a group the caller belongs to.
    GroupAddress {
        /// The group the address belongs to.
        group_id: GroupId,
    },
}

/// A coordinate tagged with its provenance, used as a query origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLocation {
    /// The query origin.
    pub coordinate: Coordinate,
    /// Where the coordinate came from.
    pub source: ReferenceSource,
}

/// Build the caller's ordered, deduplicated reference set.
///
/// Includes (a) the caller's own geocoded address contacts visible under
/// the privacy rule, and (b) the address contacts of every group the
/// caller is a member of, under the same rule. Ungeocoded addresses are
/// silently skipped. Coordinates are deduplicated by exact value, keeping
/// the first occurrence.
///
/// A caller with no active person yields an empty set; that is a valid
/// state, not an error.
///
/// # Errors
///
/// Returns an error if the directory store cannot be read.
pub async fn build_reference_set(
    store: &dyn DirectoryStore,
    actor: CurrentActor,
) -> Result<Vec<ReferenceLocation>> {
    let Some(person_id) = actor.person_id else {
        return Ok(Vec::new());
    };

    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    let mut references = Vec::new();

    let own_contacts = store
        .address_contacts(OwnerKind::Person, person_id)
        .await?;
    for contact in &own_contacts {
        if let Some(coordinate) = contact.usable_coordinate(actor.is_system_admin) {
            if seen.insert(coordinate.dedup_key()) {
                references.push(ReferenceLocation {
                    coordinate,
                    source: ReferenceSource::OwnAddress,
                });
            }
        }
    }

    // Membership, not group admin status, is what qualifies a group's
    // addresses as reference locations.
    let group_ids = store.group_memberships(person_id).await?;
    for group_id in group_ids {
        let contacts = store.address_contacts(OwnerKind::Group, group_id).await?;
        for contact in &contacts {
            if let Some(coordinate) = contact.usable_coordinate(actor.is_system_admin) {
                if seen.insert(coordinate.dedup_key()) {
                    references.push(ReferenceLocation {
                        coordinate,
                        source: ReferenceSource::GroupAddress { group_id },
                    });
                }
            }
        }
    }

    debug!(
        person_id,
        count = references.len(),
        "built reference set"
    );
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::model::Visibility;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).expect("valid test coordinate")
    }

    #[tokio::test]
    async fn test_no_active_profile_yields_empty_set() {
        let dir = MemoryDirectory::new();
        dir.add_person("Ada");

        let references = build_reference_set(&dir, CurrentActor::no_active_profile())
            .await
            .unwrap();
        assert!(references.is_empty());
    }

    #[tokio::test]
    async fn test_own_addresses_included() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        dir.add_address(
            OwnerKind::Person,
            ada,
            "1 Main St",
            Some(coord(40.0, -74.0)),
            Visibility::Public,
        );

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].coordinate, coord(40.0, -74.0));
        assert_eq!(references[0].source, ReferenceSource::OwnAddress);
    }

    #[tokio::test]
    async fn test_group_addresses_included_for_members() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        let club = dir.add_group("Garden Club");
        dir.add_membership(ada, club);
        dir.add_address(
            OwnerKind::Group,
            club,
            "2 Elm St",
            Some(coord(41.0, -74.0)),
            Visibility::Public,
        );

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(
            references[0].source,
            ReferenceSource::GroupAddress { group_id: club }
        );
    }

    #[tokio::test]
    async fn test_non_member_group_addresses_excluded() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        let club = dir.add_group("Garden Club");
        dir.add_address(
            OwnerKind::Group,
            club,
            "2 Elm St",
            Some(coord(41.0, -74.0)),
            Visibility::Public,
        );

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert!(references.is_empty());
    }

    #[tokio::test]
    async fn test_ungeocoded_addresses_skipped() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        dir.add_address(OwnerKind::Person, ada, "1 Main St", None, Visibility::Public);

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert!(references.is_empty());
    }

    #[tokio::test]
    async fn test_private_address_skipped_for_non_admin() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        dir.add_address(
            OwnerKind::Person,
            ada,
            "1 Main St",
            Some(coord(40.0, -74.0)),
            Visibility::Private,
        );

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert!(references.is_empty());

        let references = build_reference_set(&dir, CurrentActor::admin(ada))
            .await
            .unwrap();
        assert_eq!(references.len(), 1);
    }

    #[tokio::test]
    async fn test_exact_duplicates_removed() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        let club = dir.add_group("Garden Club");
        dir.add_membership(ada, club);
        dir.add_address(
            OwnerKind::Person,
            ada,
            "1 Main St",
            Some(coord(40.0, -74.0)),
            Visibility::Public,
        );
        // Same building, listed as the group's address too.
        dir.add_address(
            OwnerKind::Group,
            club,
            "1 Main St",
            Some(coord(40.0, -74.0)),
            Visibility::Public,
        );

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert_eq!(references.len(), 1);
        // First occurrence wins, so provenance is the caller's own address.
        assert_eq!(references[0].source, ReferenceSource::OwnAddress);
    }

    #[tokio::test]
    async fn test_order_is_own_addresses_then_groups() {
        let dir = MemoryDirectory::new();
        let ada = dir.add_person("Ada");
        let club = dir.add_group("Garden Club");
        dir.add_membership(ada, club);
        dir.add_address(
            OwnerKind::Group,
            club,
            "2 Elm St",
            Some(coord(41.0, -74.0)),
            Visibility::Public,
        );
        dir.add_address(
            OwnerKind::Person,
            ada,
            "1 Main St",
            Some(coord(40.0, -74.0)),
            Visibility::Public,
        );

        let references = build_reference_set(&dir, CurrentActor::person(ada))
            .await
            .unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].source, ReferenceSource::OwnAddress);
    }
}
