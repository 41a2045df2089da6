use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{Duration, Utc};
use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::locations::geohash;
use crate::locations::model::{DriverLocation, DriverLocationRecord, GeoEvent};
use crate::shared::coordinate::Coordinate;
use crate::shared::subscription::{self, Publisher, Subscription};

#[derive(Debug, Error)]
pub enum GeoLocationError {
  #[error("Invalid coordinate: {0:?}")]
  InvalidCoordinate(Coordinate),

  #[error("Invalid radius: {0}")]
  InvalidRadius(f64),

  #[error("Serialization error: {0}")]
  SerializationError(#[from] serde_json::Error),

  #[error("Other error: {0}")]
  Other(String),
}

/// Geo-indexed `driver uid -> coordinate` store.
pub trait GeoLocationStore {
  /// Upserts the driver's position.
  async fn set_location(
    &self,
    uid: &str,
    coordinate: Coordinate,
  ) -> Result<DriverLocation, GeoLocationError>;

  async fn remove_location(&self, uid: &str) -> Result<(), GeoLocationError>;

  async fn location(&self, uid: &str) -> Option<DriverLocation>;

  /// Opens a live radius query. Drivers already inside are delivered as
  /// `Entered` before any later change.
  fn query_nearby(
    &self,
    center: Coordinate,
    radius_meters: f64,
  ) -> Result<Subscription<GeoEvent>, GeoLocationError>;
}

struct NearbyQuery {
  center: Coordinate,
  radius_meters: f64,
  inside: HashSet<String>,
  publisher: Publisher<GeoEvent>,
}

impl NearbyQuery {
  fn apply(&mut self, location: &DriverLocation) {
    let is_inside = location.coordinate.is_within(&self.center, self.radius_meters);
    let was_inside = self.inside.contains(&location.uid);
    let event = match (was_inside, is_inside) {
      (false, true) => {
        self.inside.insert(location.uid.clone());
        GeoEvent::Entered {
          uid: location.uid.clone(),
          coordinate: location.coordinate,
          at: location.updated_at,
        }
      }
      (true, true) => GeoEvent::Moved {
        uid: location.uid.clone(),
        coordinate: location.coordinate,
        at: location.updated_at,
      },
      (true, false) => {
        self.inside.remove(&location.uid);
        GeoEvent::Exited {
          uid: location.uid.clone(),
          at: location.updated_at,
        }
      }
      (false, false) => return,
    };
    self.publisher.publish(event);
  }
}

#[derive(Default)]
struct GeoState {
  records: HashMap<String, Value>,
  queries: Vec<NearbyQuery>,
}

impl GeoState {
  fn decode(&self, uid: &str) -> Option<DriverLocation> {
    let record = self.records.get(uid)?;
    match serde_json::from_value::<DriverLocationRecord>(record.clone()) {
      Ok(record) if geohash::decode(&record.g).is_none() => {
        debug!("Ignoring location record {} with bad geohash {}", uid, record.g);
        None
      }
      Ok(record) => Some(record.into_location(uid)),
      Err(error) => {
        debug!("Ignoring malformed location record {}: {}", uid, error);
        None
      }
    }
  }

  fn drop_cancelled_queries(&mut self) {
    self.queries.retain(|query| !query.publisher.is_cancelled());
  }
}

pub struct InMemoryGeoLocationStore {
  state: Mutex<GeoState>,
}

impl InMemoryGeoLocationStore {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(GeoState::default()),
    }
  }

  /// Open radius queries that have not been cancelled yet.
  pub fn open_queries(&self) -> usize {
    self
      .state
      .lock()
      .map(|mut state| {
        state.drop_cancelled_queries();
        state.queries.len()
      })
      .unwrap_or(0)
  }
}

impl Default for InMemoryGeoLocationStore {
  fn default() -> Self {
    Self::new()
  }
}

impl GeoLocationStore for InMemoryGeoLocationStore {
  async fn set_location(
    &self,
    uid: &str,
    coordinate: Coordinate,
  ) -> Result<DriverLocation, GeoLocationError> {
    if !coordinate.is_valid() {
      return Err(GeoLocationError::InvalidCoordinate(coordinate));
    }
    let mut state = self.state.lock().map_err(poisoned)?;

    // Timestamps per driver are strictly increasing so consumers can drop
    // anything older than what they already applied.
    let mut updated_at = Utc::now();
    if let Some(previous) = state.decode(uid) {
      if previous.updated_at >= updated_at {
        updated_at = previous.updated_at + Duration::microseconds(1);
      }
    }
    let location = DriverLocation {
      uid: String::from(uid),
      coordinate,
      updated_at,
    };
    let record = serde_json::to_value(DriverLocationRecord::try_from(&location)?)?;
    state.records.insert(String::from(uid), record);

    state.drop_cancelled_queries();
    for query in state.queries.iter_mut() {
      query.apply(&location);
    }
    Ok(location)
  }

  async fn remove_location(&self, uid: &str) -> Result<(), GeoLocationError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    if state.records.remove(uid).is_none() {
      return Ok(());
    }
    let at = Utc::now();
    state.drop_cancelled_queries();
    for query in state.queries.iter_mut() {
      if query.inside.remove(uid) {
        query.publisher.publish(GeoEvent::Exited {
          uid: String::from(uid),
          at,
        });
      }
    }
    Ok(())
  }

  async fn location(&self, uid: &str) -> Option<DriverLocation> {
    self.state.lock().ok()?.decode(uid)
  }

  fn query_nearby(
    &self,
    center: Coordinate,
    radius_meters: f64,
  ) -> Result<Subscription<GeoEvent>, GeoLocationError> {
    if !center.is_valid() {
      return Err(GeoLocationError::InvalidCoordinate(center));
    }
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
      return Err(GeoLocationError::InvalidRadius(radius_meters));
    }
    let mut state = self.state.lock().map_err(poisoned)?;
    let (publisher, subscription) = subscription::channel();
    let mut query = NearbyQuery {
      center,
      radius_meters,
      inside: HashSet::new(),
      publisher,
    };
    let uids: Vec<String> = state.records.keys().cloned().collect();
    for uid in uids {
      if let Some(location) = state.decode(&uid) {
        query.apply(&location);
      }
    }
    state.drop_cancelled_queries();
    state.queries.push(query);
    Ok(subscription)
  }
}

fn poisoned<T>(_: T) -> GeoLocationError {
  GeoLocationError::Other(String::from("location store lock poisoned"))
}
