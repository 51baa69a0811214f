//! Geodesic distance between coordinate pairs
//!
//! Distances are haversine great-circle distances from the `geo` crate on
//! a sphere of the GRS80 mean radius, expressed in kilometres. Inputs are
//! not range-checked: latitudes outside [-90, 90] or longitudes outside
//! [-180, 180] yield whatever the formula produces, and non-finite inputs
//! propagate NaN.

use geo::{Distance, Haversine, Point};

const METRES_PER_KM: f64 = 1000.0;

/// Great-circle distance in kilometres between two points given in degrees
///
/// Symmetric in its two points and zero when both points coincide.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Coordinates::new(lat1, lon1).distance_km(&Coordinates::new(lat2, lon2))
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        Haversine.distance(Point::from(*self), Point::from(*other)) / METRES_PER_KM
    }
}

/// `geo` points are (x, y) = (longitude, latitude)
impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.longitude, coordinates.latitude)
    }
}
