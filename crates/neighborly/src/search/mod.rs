//! Proximity search engine.
//!
//! Finds every person and group within a radius of the caller's reference
//! locations, respecting per-record privacy, deduplicating across multiple
//! reference points, and ranking by distance.

pub mod aggregate;
pub mod reference;
pub mod scan;
pub mod service;

pub use reference::{build_reference_set, ReferenceLocation, ReferenceSource};
pub use scan::CandidateScanner;
pub use service::ProximityService;
