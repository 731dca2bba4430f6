//! Geographic primitives for neighborly.
//!
//! This module defines the coordinate value type and the great-circle
//! distance function that the proximity search is built on.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in statute miles, used by the haversine formula.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A geographic coordinate in decimal degrees.
///
/// Immutable value type. Latitude is constrained to `[-90, 90]` and
/// longitude to `[-180, 180]`; use [`Coordinate::new`] to enforce the
/// ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, validating the latitude/longitude ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CoordinateOutOfRange`] if either component is
    /// non-finite or outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(Error::CoordinateOutOfRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// A key suitable for exact-value deduplication.
    ///
    /// Two coordinates produce the same key iff their components are
    /// bit-identical, which is the dedup rule the reference set builder uses.
    #[must_use]
    pub fn dedup_key(&self) -> (u64, u64) {
        (self.latitude.to_bits(), self.longitude.to_bits())
    }
}

/// Great-circle distance between two coordinates in statute miles.
///
/// Uses the haversine formula with [`EARTH_RADIUS_MILES`]. The `asin`
/// argument is clamped to `[-1, 1]` so floating-point overshoot near
/// antipodal or coincident points never produces a domain error.
#[must_use]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    let h = s1 * s1 + lat_a.cos() * lat_b.cos() * s2 * s2;

    2.0 * EARTH_RADIUS_MILES * h.sqrt().clamp(-1.0, 1.0).asin()
}
