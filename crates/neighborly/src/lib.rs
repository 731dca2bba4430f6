//! `neighborly` - Proximity search for a community directory
//!
//! This library finds the people and groups located near a caller's own
//! addresses (and the addresses of groups they belong to), within a given
//! radius, and serves the results over a small HTTP API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod geo;
pub mod http;
pub mod logging;
pub mod model;
pub mod search;

pub use config::Config;
pub use directory::{DirectoryStore, MemoryDirectory, SqliteDirectory};
pub use error::{Error, Result};
pub use geo::{distance_miles, Coordinate};
pub use logging::init_logging;
pub use model::{CurrentActor, ProximityResponse};
pub use search::ProximityService;
