//! Candidate scanner.
//!
//! Scans one entity kind against one reference point, returning every
//! eligible entity whose nearest visible address falls within the radius.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::directory::DirectoryStore;
use crate::error::Result;
use crate::geo::{distance_miles, Coordinate};
use crate::model::{GroupId, GroupRecord, OwnerKind, PersonId, PersonRecord};

/// Scans candidates against reference points.
///
/// Holds the per-request exclusion context: the caller's person id, the
/// set of groups the caller already belongs to (fetched once, reused by
/// every scan), the radius, and the viewer's admin flag. One scanner is
/// shared by all fan-out tasks of a request.
pub struct CandidateScanner {
    store: Arc<dyn DirectoryStore>,
    radius_miles: f64,
    exclude_person_id: PersonId,
    excluded_group_ids: HashSet<GroupId>,
    viewer_is_admin: bool,
}

impl std::fmt::Debug for CandidateScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateScanner")
            .field("radius_miles", &self.radius_miles)
            .field("exclude_person_id", &self.exclude_person_id)
            .field("excluded_group_ids", &self.excluded_group_ids)
            .field("viewer_is_admin", &self.viewer_is_admin)
            .finish_non_exhaustive()
    }
}

impl CandidateScanner {
    /// Create a scanner for one request.
    ///
    /// Fetches the caller's group memberships up front; groups the caller
    /// already belongs to are excluded from every scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the membership lookup fails.
    pub async fn new(
        store: Arc<dyn DirectoryStore>,
        radius_miles: f64,
        exclude_person_id: PersonId,
        viewer_is_admin: bool,
    ) -> Result<Self> {
        let excluded_group_ids = store
            .group_memberships(exclude_person_id)
            .await?
            .into_iter()
            .collect();
        Ok(Self {
            store,
            radius_miles,
            exclude_person_id,
            excluded_group_ids,
            viewer_is_admin,
        })
    }

    /// The radius this scanner includes candidates within.
    #[must_use]
    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    /// Scan all persons against one reference point.
    ///
    /// Returns each eligible person with the minimum distance from the
    /// reference point to any of their visible geocoded addresses, for
    /// those within the radius (boundary inclusive). The caller's own
    /// person record is excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the person listing cannot be read. A failure
    /// reading one person's contacts is logged and that person skipped.
    pub async fn scan_persons(&self, ref_point: Coordinate) -> Result<Vec<(PersonRecord, f64)>> {
        let persons = self.store.persons().await?;
        let mut hits = Vec::new();

        for person in persons {
            if person.id == self.exclude_person_id {
                continue;
            }
            if let Some(distance) = self
                .min_distance(OwnerKind::Person, person.id, ref_point)
                .await
            {
                hits.push((person, distance));
            }
        }

        Ok(hits)
    }

    /// Scan all groups against one reference point.
    ///
    /// Same contract as [`scan_persons`](Self::scan_persons), except the
    /// exclusion rule: any group the caller is already a member of (any
    /// role) is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the group listing cannot be read. A failure
    /// reading one group's contacts is logged and that group skipped.
    pub async fn scan_groups(&self, ref_point: Coordinate) -> Result<Vec<(GroupRecord, f64)>> {
        let groups = self.store.groups().await?;
        let mut hits = Vec::new();

        for group in groups {
            if self.excluded_group_ids.contains(&group.id) {
                continue;
            }
            if let Some(distance) = self
                .min_distance(OwnerKind::Group, group.id, ref_point)
                .await
            {
                hits.push((group, distance));
            }
        }

        Ok(hits)
    }

    /// Minimum distance from the reference point to any of the entity's
    /// visible geocoded addresses, if within the radius.
    ///
    /// An entity is "near" if any one of its addresses is near. Entities
    /// with no usable address never qualify. Contact read failures are
    /// absorbed here: partial results beat total failure for a best-effort
    /// discovery feature.
    async fn min_distance(
        &self,
        owner_kind: OwnerKind,
        owner_id: i64,
        ref_point: Coordinate,
    ) -> Option<f64> {
        let contacts = match self.store.address_contacts(owner_kind, owner_id).await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(%owner_kind, owner_id, error = %e, "skipping entity: contact lookup failed");
                return None;
            }
        };

        let min = contacts
            .iter()
            .filter_map(|c| c.usable_coordinate(self.viewer_is_admin))
            .map(|coordinate| distance_miles(ref_point, coordinate))
            .fold(None, |acc: Option<f64>, d| match acc {
                Some(best) if best <= d => Some(best),
                _ => Some(d),
            });

        min.filter(|d| *d <= self.radius_miles)
    }
}
