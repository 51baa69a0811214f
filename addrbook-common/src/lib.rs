//! # Address Book Common Library
//!
//! Shared code for the address book service:
//! - Address models
//! - Database bootstrap (schema creation)
//! - Configuration loading
//! - Geodesic distance calculation

pub mod config;
pub mod db;
pub mod distance;
pub mod error;

pub use distance::{haversine_km, Coordinates};
pub use error::{Error, Result};
