use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::shared::subscription::{self, Publisher, Subscription};
use crate::trips::model::trip_state::TripState;
use crate::trips::model::{Trip, TripRecord};

#[derive(Debug, Error)]
pub enum TripRepositoryError {
  #[error("Trip not found: {0}")]
  NotFound(String),

  #[error("Passenger {0} already has an active trip")]
  AlreadyExists(String),

  #[error("Trip state changed concurrently: expected {expected}, found {actual}")]
  StateMismatch {
    expected: TripState,
    actual: TripState,
  },

  #[error("State {0} cannot be stored")]
  NotPersistable(TripState),

  #[error("Serialization error: {0}")]
  SerializationError(#[from] serde_json::Error),

  #[error("Backend unavailable: {0}")]
  Unavailable(String),

  #[error("Other error: {0}")]
  Other(String),
}

impl TripRepositoryError {
  /// Errors worth retrying with the same write.
  pub fn is_transient(&self) -> bool {
    matches!(self, TripRepositoryError::Unavailable(_))
  }
}

/// Notifications delivered to trip observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TripEvent {
  Changed { trip: TripSnapshot },
  #[serde(rename_all = "camelCase")]
  Removed { passenger_uid: String },
}

impl TripEvent {
  pub fn changed(trip: Trip) -> Self {
    TripEvent::Changed {
      trip: TripSnapshot(trip),
    }
  }

  pub fn passenger_uid(&self) -> &str {
    match self {
      TripEvent::Changed { trip } => &trip.0.passenger_uid,
      TripEvent::Removed { passenger_uid } => passenger_uid,
    }
  }
}

/// A trip as carried inside events; serializes with the passenger uid next to
/// the stored record fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSnapshot(pub Trip);

impl Serialize for TripSnapshot {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let trip = &self.0;
    let mut state = serializer.serialize_struct("Trip", 5)?;
    state.serialize_field("passengerUid", &trip.passenger_uid)?;
    state.serialize_field("pickUpCoordinates", &trip.pickup)?;
    state.serialize_field("destinationCoordinates", &trip.destination)?;
    state.serialize_field("state", &trip.state)?;
    state.serialize_field("driverUid", &trip.driver_uid)?;
    state.end()
  }
}

/// Fields a transition may write.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPatch {
  pub state: TripState,
  pub driver_uid: Option<String>,
}

impl TripPatch {
  pub fn state(state: TripState) -> Self {
    Self {
      state,
      driver_uid: None,
    }
  }
}

/// The `trips/{passengerUid}` record store.
pub trait TripRepository {
  async fn find_one(&self, passenger_uid: &str) -> Option<Trip>;

  /// Fails with `AlreadyExists` while the passenger has a non-terminal trip.
  async fn create(&self, trip: Trip) -> Result<Trip, TripRepositoryError>;

  /// Applies `patch` only if the stored state is still `expected`.
  async fn update_if(
    &self,
    passenger_uid: &str,
    expected: TripState,
    patch: TripPatch,
  ) -> Result<Trip, TripRepositoryError>;

  /// Removes the record, returning what was stored.
  async fn delete(
    &self,
    passenger_uid: &str,
  ) -> Result<Option<Trip>, TripRepositoryError>;

  /// Live view of one trip: the current value first, then every change.
  fn observe(
    &self,
    passenger_uid: &str,
  ) -> Result<Subscription<TripEvent>, TripRepositoryError>;

  /// Every trip created from now on, plus removals.
  fn observe_requests(&self) -> Result<Subscription<TripEvent>, TripRepositoryError>;

  /// Ends every open `observe` subscription on the trip.
  fn detach_observers(&self, passenger_uid: &str);
}

#[derive(Default)]
struct TripStoreState {
  records: HashMap<String, Value>,
  observers: HashMap<String, Vec<Publisher<TripEvent>>>,
  request_observers: Vec<Publisher<TripEvent>>,
}

impl TripStoreState {
  fn decode(&self, passenger_uid: &str) -> Option<Trip> {
    let record = self.records.get(passenger_uid)?;
    let trip = serde_json::from_value::<TripRecord>(record.clone())
      .ok()
      .and_then(|record| record.into_trip(passenger_uid));
    if trip.is_none() {
      debug!("Ignoring malformed trip record {}", passenger_uid);
    }
    trip
  }

  fn write(&mut self, trip: &Trip) -> Result<(), TripRepositoryError> {
    let record = TripRecord::from_trip(trip)
      .ok_or(TripRepositoryError::NotPersistable(trip.state))?;
    self
      .records
      .insert(trip.passenger_uid.clone(), serde_json::to_value(record)?);
    Ok(())
  }

  fn notify(&mut self, event: TripEvent) {
    if let Some(observers) = self.observers.get_mut(event.passenger_uid()) {
      observers.retain(|observer| observer.publish(event.clone()));
    }
  }

  fn notify_requests(&mut self, event: TripEvent) {
    self
      .request_observers
      .retain(|observer| observer.publish(event.clone()));
  }
}

pub struct InMemoryTripRepository {
  state: Mutex<TripStoreState>,
}

impl InMemoryTripRepository {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(TripStoreState::default()),
    }
  }

  /// Writes a raw record, bypassing validation. Used to seed the store.
  #[cfg(test)]
  pub fn put_raw(&self, passenger_uid: &str, record: Value) -> Result<(), TripRepositoryError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    state.records.insert(String::from(passenger_uid), record);
    Ok(())
  }

  /// Open `observe` subscriptions on one trip.
  #[cfg(test)]
  pub fn observer_count(&self, passenger_uid: &str) -> usize {
    self
      .state
      .lock()
      .map(|state| {
        state
          .observers
          .get(passenger_uid)
          .map(|observers| {
            observers
              .iter()
              .filter(|observer| !observer.is_cancelled())
              .count()
          })
          .unwrap_or(0)
      })
      .unwrap_or(0)
  }
}

impl Default for InMemoryTripRepository {
  fn default() -> Self {
    Self::new()
  }
}

impl TripRepository for InMemoryTripRepository {
  async fn find_one(&self, passenger_uid: &str) -> Option<Trip> {
    self.state.lock().ok()?.decode(passenger_uid)
  }

  async fn create(&self, trip: Trip) -> Result<Trip, TripRepositoryError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    if let Some(existing) = state.decode(&trip.passenger_uid) {
      if !existing.state.is_terminal() {
        return Err(TripRepositoryError::AlreadyExists(trip.passenger_uid));
      }
    }
    state.write(&trip)?;
    state.notify(TripEvent::changed(trip.clone()));
    state.notify_requests(TripEvent::changed(trip.clone()));
    Ok(trip)
  }

  async fn update_if(
    &self,
    passenger_uid: &str,
    expected: TripState,
    patch: TripPatch,
  ) -> Result<Trip, TripRepositoryError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    let mut trip = state
      .decode(passenger_uid)
      .ok_or_else(|| TripRepositoryError::NotFound(String::from(passenger_uid)))?;
    if trip.state != expected {
      return Err(TripRepositoryError::StateMismatch {
        expected,
        actual: trip.state,
      });
    }
    trip.state = patch.state;
    if patch.driver_uid.is_some() {
      trip.driver_uid = patch.driver_uid;
    }
    state.write(&trip)?;
    state.notify(TripEvent::changed(trip.clone()));
    Ok(trip)
  }

  async fn delete(
    &self,
    passenger_uid: &str,
  ) -> Result<Option<Trip>, TripRepositoryError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    let existing = state.decode(passenger_uid);
    if state.records.remove(passenger_uid).is_none() {
      return Ok(None);
    }
    let event = TripEvent::Removed {
      passenger_uid: String::from(passenger_uid),
    };
    state.notify(event.clone());
    state.notify_requests(event);
    Ok(existing)
  }

  fn observe(
    &self,
    passenger_uid: &str,
  ) -> Result<Subscription<TripEvent>, TripRepositoryError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    let (publisher, subscription) = subscription::channel();
    if let Some(trip) = state.decode(passenger_uid) {
      publisher.publish(TripEvent::changed(trip));
    }
    state
      .observers
      .entry(String::from(passenger_uid))
      .or_default()
      .push(publisher);
    Ok(subscription)
  }

  fn observe_requests(&self) -> Result<Subscription<TripEvent>, TripRepositoryError> {
    let mut state = self.state.lock().map_err(poisoned)?;
    let (publisher, subscription) = subscription::channel();
    state.request_observers.push(publisher);
    Ok(subscription)
  }

  fn detach_observers(&self, passenger_uid: &str) {
    if let Ok(mut state) = self.state.lock() {
      if let Some(observers) = state.observers.remove(passenger_uid) {
        for observer in observers {
          observer.close();
        }
      }
    }
  }
}

fn poisoned<T>(_: T) -> TripRepositoryError {
  TripRepositoryError::Other(String::from("trip store lock poisoned"))
}
