//! Proximity service façade.
//!
//! Orchestrates a whole search: builds the reference set, fans out one
//! scan per (reference point × entity kind) under a concurrency cap,
//! aggregates, ranks, and returns a bounded response.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::directory::DirectoryStore;
use crate::error::{Error, Result};
use crate::model::{
    CurrentActor, GroupRecord, GroupSummary, PersonRecord, PersonSummary, ProximityResponse,
    ProximityResult,
};

use super::aggregate::{aggregate_minimum, rank};
use super::reference::build_reference_set;
use super::scan::CandidateScanner;

/// One completed fan-out task.
enum ScanOutput {
    Persons(Vec<(PersonRecord, f64)>),
    Groups(Vec<(GroupRecord, f64)>),
}

/// The proximity search engine.
///
/// One instance serves all requests; every invocation is independent and
/// touches only the read-only directory store.
pub struct ProximityService {
    store: Arc<dyn DirectoryStore>,
    config: SearchConfig,
}

impl std::fmt::Debug for ProximityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximityService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProximityService {
    /// Create a service over the given directory store.
    #[must_use]
    pub fn new(store: Arc<dyn DirectoryStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    /// The radius to search, given an optional requested value.
    ///
    /// Non-finite or non-positive requests fall back to the configured
    /// default rather than erroring, matching the permissive parsing of
    /// the endpoint.
    #[must_use]
    pub fn effective_radius(&self, requested: Option<f64>) -> f64 {
        requested
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(self.config.default_radius_miles)
    }

    /// Find every person and group near the caller's reference locations.
    ///
    /// A caller with no active person, or no usable reference location,
    /// gets the zero-reference response without any scan being run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the search deadline elapses
    /// mid-fan-out (partial reference coverage would understate minimum
    /// distances, so no partial response is returned), or a store error if
    /// the caller's own reference data cannot be read.
    pub async fn find_nearby(
        &self,
        actor: CurrentActor,
        radius_miles: Option<f64>,
    ) -> Result<ProximityResponse> {
        let radius = self.effective_radius(radius_miles);

        tokio::time::timeout(self.config_timeout(), self.run_search(actor, radius))
            .await
            .map_err(|_| Error::cancelled("search deadline elapsed"))?
    }

    fn config_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.config.request_timeout_ms)
    }

    async fn run_search(&self, actor: CurrentActor, radius: f64) -> Result<ProximityResponse> {
        let Some(person_id) = actor.person_id else {
            debug!("no active profile, returning zero-reference response");
            return Ok(ProximityResponse::zero_references());
        };

        let references = build_reference_set(self.store.as_ref(), actor).await?;
        if references.is_empty() {
            debug!(person_id, "no usable reference location");
            return Ok(ProximityResponse::zero_references());
        }

        let scanner = Arc::new(
            CandidateScanner::new(
                Arc::clone(&self.store),
                radius,
                person_id,
                actor.is_system_admin,
            )
            .await?,
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_scans));
        let mut tasks: JoinSet<Result<ScanOutput>> = JoinSet::new();

        for reference in &references {
            let ref_point = reference.coordinate;

            let scan = Arc::clone(&scanner);
            let permit_source = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = permit_source
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::internal("scan semaphore closed"))?;
                scan.scan_persons(ref_point).await.map(ScanOutput::Persons)
            });

            let scan = Arc::clone(&scanner);
            let permit_source = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = permit_source
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::internal("scan semaphore closed"))?;
                scan.scan_groups(ref_point).await.map(ScanOutput::Groups)
            });
        }

        let mut person_scans = Vec::new();
        let mut group_scans = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| Error::internal(format!("scan task failed: {e}")))?;
            match outcome {
                Ok(ScanOutput::Persons(hits)) => person_scans.push(hits),
                Ok(ScanOutput::Groups(hits)) => group_scans.push(hits),
                Err(e) => {
                    // One unreachable scan degrades to an empty result set;
                    // the other reference points still contribute.
                    warn!(error = %e, "scan failed, continuing without it");
                }
            }
        }

        let persons = rank(
            aggregate_minimum(person_scans),
            self.config.max_results_per_kind,
        );
        let groups = rank(
            aggregate_minimum(group_scans),
            self.config.max_results_per_kind,
        );

        debug!(
            person_id,
            radius,
            reference_points = references.len(),
            persons = persons.len(),
            groups = groups.len(),
            "proximity search complete"
        );

        Ok(ProximityResponse {
            persons: persons
                .iter()
                .map(|(record, distance)| ProximityResult {
                    entity: PersonSummary::from(record),
                    distance_miles: *distance,
                })
                .collect(),
            groups: groups
                .iter()
                .map(|(record, distance)| ProximityResult {
                    entity: GroupSummary::from(record),
                    distance_miles: *distance,
                })
                .collect(),
            reference_point_count: references.len(),
        })
    }
}
