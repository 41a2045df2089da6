use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locations::geohash;
use crate::locations::repository::location_store::GeoLocationError;
use crate::shared::coordinate::Coordinate;

/// Last known position of a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverLocation {
  pub uid: String,
  pub coordinate: Coordinate,
  pub updated_at: DateTime<Utc>,
}

/// Stored shape of `driver-locations/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverLocationRecord {
  /// Geohash of `l`.
  pub g: String,
  pub l: Coordinate,
  #[serde(rename = "updatedAt")]
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<&DriverLocation> for DriverLocationRecord {
  type Error = GeoLocationError;

  fn try_from(location: &DriverLocation) -> Result<Self, Self::Error> {
    let g = geohash::encode(&location.coordinate, geohash::DEFAULT_PRECISION)
      .ok_or(GeoLocationError::InvalidCoordinate(location.coordinate))?;
    Ok(Self {
      g,
      l: location.coordinate,
      updated_at: location.updated_at,
    })
  }
}

impl DriverLocationRecord {
  pub fn into_location(self, uid: &str) -> DriverLocation {
    DriverLocation {
      uid: String::from(uid),
      coordinate: self.l,
      updated_at: self.updated_at,
    }
  }
}

/// Change notifications of a radius query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GeoEvent {
  Entered {
    uid: String,
    coordinate: Coordinate,
    at: DateTime<Utc>,
  },
  Moved {
    uid: String,
    coordinate: Coordinate,
    at: DateTime<Utc>,
  },
  Exited {
    uid: String,
    at: DateTime<Utc>,
  },
}

impl GeoEvent {
  pub fn uid(&self) -> &str {
    match self {
      GeoEvent::Entered { uid, .. }
      | GeoEvent::Moved { uid, .. }
      | GeoEvent::Exited { uid, .. } => uid,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_record_carries_geohash() {
    let location = DriverLocation {
      uid: String::from("d1"),
      coordinate: Coordinate::new(42.6, -5.6),
      updated_at: Utc::now(),
    };
    let record = DriverLocationRecord::try_from(&location).unwrap();

    assert!(record.g.starts_with("ezs42"));
    assert_eq!(record.g.len(), geohash::DEFAULT_PRECISION);
    assert_eq!(record.into_location("d1"), location);
  }
}
