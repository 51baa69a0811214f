//! Proximity search over stored addresses
//!
//! A full scan: one bulk read from the store, one distance evaluation per
//! address. There is no spatial index, so cost grows linearly with the
//! number of stored addresses.
//!
//! The filter keeps an address when its distance from the query point is
//! **greater than or equal to** the threshold, i.e. addresses at least
//! `threshold` km away, even though the endpoint is documented as "within
//! a given distance". Existing callers depend on this comparison.

use addrbook_common::db::Address;
use addrbook_common::Coordinates;
use tracing::debug;

use crate::store::{AddressRepository, StoreResult};

/// Addresses whose distance (km) from `(latitude, longitude)` is at least `threshold`
///
/// Result order is the store's listing order. An empty store gives an
/// empty result, not an error.
pub async fn find_within_reach(
    repo: &dyn AddressRepository,
    threshold: f64,
    latitude: f64,
    longitude: f64,
) -> StoreResult<Vec<Address>> {
    let addresses = repo.list_all().await?;
    let scanned = addresses.len();

    let matches = filter_by_distance(addresses, threshold, Coordinates::new(latitude, longitude));

    debug!(
        "Proximity search at ({}, {}) threshold {} km: {} of {} addresses matched",
        latitude,
        longitude,
        threshold,
        matches.len(),
        scanned
    );

    Ok(matches)
}

/// Keep addresses with `distance(address, origin) >= threshold`
pub fn filter_by_distance(
    addresses: Vec<Address>,
    threshold: f64,
    origin: Coordinates,
) -> Vec<Address> {
    addresses
        .into_iter()
        .filter(|address| address.coordinates().distance_km(&origin) >= threshold)
        .collect()
}
