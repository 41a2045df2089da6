use std::sync::Arc;

use log::{error, info, warn};

use crate::locations::model::DriverLocation;
use crate::locations::repository::location_store::GeoLocationStore;
use crate::shared::account_type::AccountType;
use crate::shared::backend::Backend;
use crate::shared::config::Config;
use crate::shared::coordinate::Coordinate;
use crate::shared::retry::RetryPolicy;
use crate::shared::subscription::Subscription;
use crate::trips::error::TripError;
use crate::trips::geofence::Geofence;
use crate::trips::model::trip_state::{TripAction, TripState};
use crate::trips::model::Trip;
use crate::trips::repository::trip_repository::{
  TripEvent, TripPatch, TripRepository, TripRepositoryError,
};
use crate::users::model::access_token_claims::AccessTokenClaims;

/// The client a controller acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub uid: String,
  pub account_type: AccountType,
}

impl Actor {
  pub fn passenger(uid: &str) -> Self {
    Self {
      uid: String::from(uid),
      account_type: AccountType::Passenger,
    }
  }

  pub fn driver(uid: &str) -> Self {
    Self {
      uid: String::from(uid),
      account_type: AccountType::Driver,
    }
  }
}

impl From<&AccessTokenClaims> for Actor {
  fn from(claims: &AccessTokenClaims) -> Self {
    Self {
      uid: claims.uid.clone(),
      account_type: claims.account_type,
    }
  }
}

/// Result of a driver location report.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
  pub location: DriverLocation,
  /// Set when the report put the driver inside the pickup geofence.
  pub arrived: Option<Trip>,
}

/// Drives a trip through its lifecycle on behalf of one passenger or driver.
///
/// Every write is a compare-and-set against the state that was read, so two
/// drivers accepting the same request resolve to a single assignment. An
/// action whose target state is already in place for the same actor is
/// reported as success without writing again, which makes retries safe.
pub struct TripLifecycleController<B: Backend> {
  backend: Arc<B>,
  actor: Actor,
  retry: RetryPolicy,
  pickup_geofence_meters: f64,
}

impl<B: Backend> TripLifecycleController<B> {
  pub fn new(backend: Arc<B>, actor: Actor) -> Self {
    Self {
      backend,
      actor,
      retry: RetryPolicy::default(),
      pickup_geofence_meters: 100.0,
    }
  }

  pub fn from_config(backend: Arc<B>, actor: Actor, config: &Config) -> Self {
    Self::new(backend, actor)
      .with_retry(config.retry.clone())
      .with_pickup_geofence(config.pickup_geofence_meters)
  }

  pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn with_pickup_geofence(mut self, meters: f64) -> Self {
    self.pickup_geofence_meters = meters;
    self
  }

  pub fn actor(&self) -> &Actor {
    &self.actor
  }

  pub fn pickup_geofence(&self, trip: &Trip) -> Geofence {
    Geofence::new(trip.pickup, self.pickup_geofence_meters)
  }

  pub async fn request_trip(
    &self,
    pickup: Coordinate,
    destination: Coordinate,
  ) -> Result<Trip, TripError> {
    self.require_account_type("request", AccountType::Passenger)?;
    if !pickup.is_valid() || !destination.is_valid() {
      return Err(TripError::Invalid(String::from("coordinates out of range")));
    }
    let trip = Trip::requested(&self.actor.uid, pickup, destination);
    match self.backend.trips().create(trip).await {
      Ok(trip) => {
        info!("Passenger {} requested a trip", self.actor.uid);
        Ok(trip)
      }
      Err(error) => {
        error!("Failed to upload trip for {}: {}", self.actor.uid, error);
        Err(error.into())
      }
    }
  }

  pub async fn accept(&self, passenger_uid: &str) -> Result<Trip, TripError> {
    self.apply(passenger_uid, TripAction::Accept).await
  }

  pub async fn deny(&self, passenger_uid: &str) -> Result<Trip, TripError> {
    self.apply(passenger_uid, TripAction::Deny).await
  }

  /// Called when the driver enters the pickup geofence.
  pub async fn driver_arrived(&self, passenger_uid: &str) -> Result<Trip, TripError> {
    self.apply(passenger_uid, TripAction::EnterPickupGeofence).await
  }

  pub async fn start_trip(&self, passenger_uid: &str) -> Result<Trip, TripError> {
    self.apply(passenger_uid, TripAction::Start).await
  }

  pub async fn arrive_at_destination(
    &self,
    passenger_uid: &str,
  ) -> Result<Trip, TripError> {
    self.apply(passenger_uid, TripAction::ArriveAtDestination).await
  }

  /// Marks the trip completed, removes the record and detaches observers.
  pub async fn complete(&self, passenger_uid: &str) -> Result<Trip, TripError> {
    self.apply(passenger_uid, TripAction::Complete).await
  }

  /// Deletes the passenger's own trip.
  pub async fn cancel(&self) -> Result<Trip, TripError> {
    let passenger_uid = self.actor.uid.clone();
    self.apply(&passenger_uid, TripAction::Cancel).await
  }

  pub async fn apply(
    &self,
    passenger_uid: &str,
    action: TripAction,
  ) -> Result<Trip, TripError> {
    let label = format!("{} trip {}", action, passenger_uid);
    self.require_account_type(action_name(action), action.actor())?;
    let result = self
      .retry
      .run(&label, TripError::is_transient, || {
        self.try_apply(passenger_uid, action)
      })
      .await;
    match &result {
      Ok(trip) => info!("{} by {}: now {}", label, self.actor.uid, trip.state),
      Err(error) => error!("{} by {} failed: {}", label, self.actor.uid, error),
    }
    result
  }

  /// Upserts the driver's location and, while en route to `active_trip`,
  /// advances it to `DriverArrived` once inside the pickup geofence.
  pub async fn report_location(
    &self,
    coordinate: Coordinate,
    active_trip: Option<&str>,
  ) -> Result<LocationReport, TripError> {
    self.require_account_type("report the location of", AccountType::Driver)?;
    let location = self
      .backend
      .locations()
      .set_location(&self.actor.uid, coordinate)
      .await?;

    let mut arrived = None;
    if let Some(passenger_uid) = active_trip {
      if let Some(trip) = self.backend.trips().find_one(passenger_uid).await {
        let en_route =
          trip.state == TripState::Accepted && trip.is_assigned_to(&self.actor.uid);
        if en_route && self.pickup_geofence(&trip).contains(&coordinate) {
          arrived = Some(self.driver_arrived(passenger_uid).await?);
        }
      }
    }
    Ok(LocationReport { location, arrived })
  }

  /// Live events for one trip. Passengers may only watch their own; drivers
  /// may watch an open request or a trip assigned to them.
  pub async fn observe_trip(
    &self,
    passenger_uid: &str,
  ) -> Result<Subscription<TripEvent>, TripError> {
    let trips = self.backend.trips();
    match self.actor.account_type {
      AccountType::Passenger if self.actor.uid != passenger_uid => {
        return Err(TripError::NotTripOwner);
      }
      AccountType::Passenger => {}
      AccountType::Driver => {
        let trip = trips.find_one(passenger_uid).await.ok_or(TripError::NotFound)?;
        if trip.state != TripState::Requested && !trip.is_assigned_to(&self.actor.uid) {
          return Err(TripError::NotTripParticipant);
        }
      }
    }
    Ok(trips.observe(passenger_uid)?)
  }

  /// New trip requests, for drivers.
  pub fn observe_requests(&self) -> Result<Subscription<TripEvent>, TripError> {
    self.require_account_type("watch requests for", AccountType::Driver)?;
    Ok(self.backend.trips().observe_requests()?)
  }

  async fn try_apply(
    &self,
    passenger_uid: &str,
    action: TripAction,
  ) -> Result<Trip, TripError> {
    let trips = self.backend.trips();
    let trip = trips
      .find_one(passenger_uid)
      .await
      .ok_or(TripError::NotFound)?;

    if action == TripAction::Cancel && trip.passenger_uid != self.actor.uid {
      return Err(TripError::NotTripOwner);
    }
    if action.requires_assigned_driver() && !trip.is_assigned_to(&self.actor.uid) {
      return Err(TripError::NotAssignedDriver(action));
    }

    let target = match trip.state.next(action) {
      Some(target) => target,
      None if self.already_applied(&trip, action) => {
        if trip.state == TripState::Completed {
          // A previous attempt stored the final state but did not get to
          // remove the record.
          return self.finish(trip).await;
        }
        return Ok(trip);
      }
      None if action == TripAction::Accept && trip.driver_uid.is_some() => {
        return Err(TripError::AlreadyAssigned);
      }
      None => {
        return Err(TripError::IllegalTransition {
          state: trip.state,
          action,
        })
      }
    };

    match target {
      TripState::Cancelled => {
        self.remove(passenger_uid).await?;
        Ok(Trip {
          state: TripState::Cancelled,
          ..trip
        })
      }
      TripState::Completed => {
        let completed = self
          .write(&trip, TripPatch::state(TripState::Completed), action)
          .await?;
        self.finish(completed).await
      }
      state => {
        let patch = TripPatch {
          state,
          driver_uid: (action == TripAction::Accept).then(|| self.actor.uid.clone()),
        };
        self.write(&trip, patch, action).await
      }
    }
  }

  async fn write(
    &self,
    trip: &Trip,
    patch: TripPatch,
    action: TripAction,
  ) -> Result<Trip, TripError> {
    self
      .backend
      .trips()
      .update_if(&trip.passenger_uid, trip.state, patch)
      .await
      .map_err(|error| match error {
        TripRepositoryError::StateMismatch { .. } if action == TripAction::Accept => {
          TripError::AlreadyAssigned
        }
        TripRepositoryError::StateMismatch { actual, .. } => {
          TripError::IllegalTransition {
            state: actual,
            action,
          }
        }
        other => TripError::Repository(other),
      })
  }

  async fn finish(&self, completed: Trip) -> Result<Trip, TripError> {
    self.remove(&completed.passenger_uid).await?;
    Ok(completed)
  }

  /// Deletes the record and ends every observation of it. A delete that
  /// reports a failure but left no record behind still counts as done.
  async fn remove(&self, passenger_uid: &str) -> Result<(), TripError> {
    let trips = self.backend.trips();
    if let Err(error) = trips.delete(passenger_uid).await {
      if trips.find_one(passenger_uid).await.is_some() {
        return Err(error.into());
      }
      warn!("Removal of trip {} reported {}, record is gone", passenger_uid, error);
    }
    trips.detach_observers(passenger_uid);
    Ok(())
  }

  fn already_applied(&self, trip: &Trip, action: TripAction) -> bool {
    trip.state == action.target_state()
      && (action != TripAction::Accept || trip.is_assigned_to(&self.actor.uid))
  }

  fn require_account_type(
    &self,
    action: &'static str,
    required: AccountType,
  ) -> Result<(), TripError> {
    if self.actor.account_type != required {
      return Err(TripError::WrongAccountType { action, required });
    }
    Ok(())
  }
}

fn action_name(action: TripAction) -> &'static str {
  match action {
    TripAction::Accept => "accept",
    TripAction::Deny => "deny",
    TripAction::EnterPickupGeofence => "arrive at the pickup of",
    TripAction::Start => "start",
    TripAction::ArriveAtDestination => "finish the route of",
    TripAction::Complete => "complete",
    TripAction::Cancel => "cancel",
  }
}
