use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// A WGS84 position. On the wire it is the two element array `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
  pub latitude: f64,
  pub longitude: f64,
}

impl Coordinate {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self {
      latitude,
      longitude,
    }
  }

  pub fn is_valid(&self) -> bool {
    (-90.0..=90.0).contains(&self.latitude)
      && (-180.0..=180.0).contains(&self.longitude)
  }

  /// Great-circle distance in metres (haversine).
  pub fn distance_to(&self, other: &Coordinate) -> f64 {
    Point::from(*self).haversine_distance(&Point::from(*other))
  }

  pub fn is_within(&self, center: &Coordinate, radius_meters: f64) -> bool {
    self.distance_to(center) <= radius_meters
  }
}

impl From<[f64; 2]> for Coordinate {
  fn from([latitude, longitude]: [f64; 2]) -> Self {
    Self::new(latitude, longitude)
  }
}

impl From<Coordinate> for Point {
  fn from(coordinate: Coordinate) -> Self {
    Point::new(coordinate.longitude, coordinate.latitude)
  }
}

impl From<Coordinate> for [f64; 2] {
  fn from(coordinate: Coordinate) -> Self {
    [coordinate.latitude, coordinate.longitude]
  }
}
