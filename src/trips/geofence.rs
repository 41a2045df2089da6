use serde::Serialize;

use crate::shared::coordinate::Coordinate;

/// Circular region a driver is monitored against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
  pub center: Coordinate,
  pub radius_meters: f64,
}

impl Geofence {
  pub fn new(center: Coordinate, radius_meters: f64) -> Self {
    Self {
      center,
      radius_meters,
    }
  }

  pub fn contains(&self, coordinate: &Coordinate) -> bool {
    coordinate.is_within(&self.center, self.radius_meters)
  }
}
