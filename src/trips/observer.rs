use serde::Serialize;

use crate::shared::account_type::AccountType;
use crate::shared::coordinate::Coordinate;
use crate::trips::geofence::Geofence;
use crate::trips::model::trip_state::TripState;
use crate::trips::model::Trip;
use crate::trips::repository::trip_repository::TripEvent;
use crate::trips::ride_action::RideActionConfig;

/// Work a client has to do after observing a trip change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TripEffect {
  #[serde(rename_all = "camelCase")]
  PresentTripRequest { passenger_uid: String },
  #[serde(rename_all = "camelCase")]
  DismissTripRequest { passenger_uid: String },
  #[serde(rename_all = "camelCase")]
  TrackDriver { driver_uid: String },
  ComputeRoute { to: Coordinate },
  MonitorPickupGeofence { geofence: Geofence },
  ShowRideAction { config: RideActionConfig },
  DetachListeners,
  ResetToIdle { outcome: TripState },
}

/// Folds trip events into effects for one client.
///
/// Effects depend on the state value, not on the delivery: a repeated or
/// stale notification leaves the observer unchanged and yields nothing.
#[derive(Debug, Clone)]
pub struct TripObserver {
  viewer_uid: String,
  viewer: AccountType,
  pickup_geofence_meters: f64,
  current: Option<Trip>,
  outcome: Option<TripState>,
}

impl TripObserver {
  pub fn new(viewer_uid: &str, viewer: AccountType, pickup_geofence_meters: f64) -> Self {
    Self {
      viewer_uid: String::from(viewer_uid),
      viewer,
      pickup_geofence_meters,
      current: None,
      outcome: None,
    }
  }

  pub fn passenger(uid: &str) -> Self {
    Self::new(uid, AccountType::Passenger, 100.0)
  }

  pub fn driver(uid: &str) -> Self {
    Self::new(uid, AccountType::Driver, 100.0)
  }

  pub fn trip(&self) -> Option<&Trip> {
    self.current.as_ref()
  }

  /// Last state seen, including the `Cancelled`/`Completed` outcome once the
  /// record is gone.
  pub fn state(&self) -> Option<TripState> {
    self.current.as_ref().map(|trip| trip.state).or(self.outcome)
  }

  pub fn has_active_trip(&self) -> bool {
    self
      .current
      .as_ref()
      .is_some_and(|trip| !trip.state.is_terminal())
  }

  pub fn apply(&mut self, event: &TripEvent) -> Vec<TripEffect> {
    match event {
      TripEvent::Changed { trip } => self.changed(&trip.0),
      TripEvent::Removed { passenger_uid } => self.removed(passenger_uid),
    }
  }

  fn changed(&mut self, trip: &Trip) -> Vec<TripEffect> {
    if let Some(current) = &self.current {
      if current.passenger_uid != trip.passenger_uid {
        return Vec::new();
      }
      let same = current.state == trip.state && current.driver_uid == trip.driver_uid;
      let stale = !current.state.is_terminal()
        && trip.state.progress() < current.state.progress();
      if same || stale {
        return Vec::new();
      }
    }
    if self.assigned_elsewhere(trip) {
      // Another driver took the request
      return match self.current.take() {
        Some(_) => vec![TripEffect::DismissTripRequest {
          passenger_uid: trip.passenger_uid.clone(),
        }],
        None => Vec::new(),
      };
    }
    self.current = Some(trip.clone());
    self.outcome = None;
    self.effects_for(trip)
  }

  fn removed(&mut self, passenger_uid: &str) -> Vec<TripEffect> {
    let tracked = self
      .current
      .as_ref()
      .is_some_and(|trip| trip.passenger_uid == passenger_uid);
    if !tracked {
      return Vec::new();
    }
    let Some(current) = self.current.take() else {
      return Vec::new();
    };
    let outcome = if current.state == TripState::Completed {
      TripState::Completed
    } else {
      TripState::Cancelled
    };
    self.outcome = Some(outcome);

    let pending_request = self.viewer == AccountType::Driver
      && current.state == TripState::Requested;
    if pending_request {
      vec![TripEffect::DismissTripRequest {
        passenger_uid: current.passenger_uid,
      }]
    } else {
      self.idle_effects(outcome)
    }
  }

  fn assigned_elsewhere(&self, trip: &Trip) -> bool {
    self.viewer == AccountType::Driver
      && trip
        .driver_uid
        .as_deref()
        .is_some_and(|driver_uid| driver_uid != self.viewer_uid)
  }

  /// A passenger back at idle can request again.
  fn idle_effects(&self, outcome: TripState) -> Vec<TripEffect> {
    let mut effects = vec![TripEffect::ResetToIdle { outcome }];
    if self.viewer == AccountType::Passenger {
      effects.push(TripEffect::ShowRideAction {
        config: RideActionConfig::request_ride(),
      });
    }
    effects
  }

  fn effects_for(&self, trip: &Trip) -> Vec<TripEffect> {
    use AccountType::*;
    let mut effects = Vec::new();
    match (trip.state, self.viewer) {
      (TripState::Requested, Driver) => {
        effects.push(TripEffect::PresentTripRequest {
          passenger_uid: trip.passenger_uid.clone(),
        });
      }
      (TripState::Accepted, Passenger) => {
        if let Some(driver_uid) = &trip.driver_uid {
          effects.push(TripEffect::TrackDriver {
            driver_uid: driver_uid.clone(),
          });
        }
        effects.push(TripEffect::ComputeRoute { to: trip.pickup });
      }
      (TripState::Accepted, Driver) => {
        effects.push(TripEffect::ComputeRoute { to: trip.pickup });
        effects.push(TripEffect::MonitorPickupGeofence {
          geofence: Geofence::new(trip.pickup, self.pickup_geofence_meters),
        });
      }
      (TripState::InProgress, Driver) => {
        effects.push(TripEffect::ComputeRoute {
          to: trip.destination,
        });
      }
      (TripState::Denied, _) => {
        effects.extend(self.idle_effects(TripState::Denied));
      }
      (TripState::Completed, _) => {
        effects.push(TripEffect::DetachListeners);
      }
      _ => {}
    }
    if let Some(config) = RideActionConfig::for_state(trip.state, self.viewer) {
      effects.push(TripEffect::ShowRideAction { config });
    }
    effects
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::trips::repository::trip_repository::tests::requested_trip;

  fn with_state(state: TripState) -> TripEvent {
    let mut trip = requested_trip("p1");
    trip.state = state;
    if state != TripState::Requested {
      trip.driver_uid = Some(String::from("d1"));
    }
    TripEvent::changed(trip)
  }

  fn removed() -> TripEvent {
    TripEvent::Removed {
      passenger_uid: String::from("p1"),
    }
  }

  fn count_routes(effects: &[TripEffect]) -> usize {
    effects
      .iter()
      .filter(|effect| matches!(effect, TripEffect::ComputeRoute { .. }))
      .count()
  }

  #[test]
  fn test_duplicate_state_yields_no_effects() {
    let mut observer = TripObserver::passenger("p1");
    observer.apply(&with_state(TripState::Requested));

    let first = observer.apply(&with_state(TripState::Accepted));
    let second = observer.apply(&with_state(TripState::Accepted));

    assert_eq!(count_routes(&first), 1);
    assert!(first.contains(&TripEffect::TrackDriver {
      driver_uid: String::from("d1")
    }));
    assert!(second.is_empty());
  }

  #[test]
  fn test_stale_state_is_ignored() {
    let mut observer = TripObserver::driver("d1");
    observer.apply(&with_state(TripState::InProgress));

    assert!(observer.apply(&with_state(TripState::Accepted)).is_empty());
    assert_eq!(observer.state(), Some(TripState::InProgress));
  }

  #[test]
  fn test_driver_monitors_pickup_after_accept() {
    let mut observer = TripObserver::driver("d1");
    let effects = observer.apply(&with_state(TripState::Accepted));

    assert!(effects.iter().any(|effect| matches!(
      effect,
      TripEffect::MonitorPickupGeofence { geofence } if geofence.radius_meters == 100.0
    )));
  }

  #[test]
  fn test_start_routes_driver_to_destination() {
    let mut observer = TripObserver::driver("d1");
    observer.apply(&with_state(TripState::DriverArrived));
    let effects = observer.apply(&with_state(TripState::InProgress));

    assert!(effects.contains(&TripEffect::ComputeRoute {
      to: Coordinate::new(20.0, 20.0)
    }));
  }

  #[test]
  fn test_cancel_while_accepted_resets_driver() {
    let mut observer = TripObserver::driver("d1");
    observer.apply(&with_state(TripState::Accepted));

    let effects = observer.apply(&removed());

    assert_eq!(
      effects,
      vec![TripEffect::ResetToIdle {
        outcome: TripState::Cancelled
      }]
    );
    assert!(!observer.has_active_trip());
    assert_eq!(observer.state(), Some(TripState::Cancelled));
    // Repeated removal is a no-op
    assert!(observer.apply(&removed()).is_empty());
  }

  #[test]
  fn test_completion_then_removal() {
    let mut observer = TripObserver::passenger("p1");
    observer.apply(&with_state(TripState::InProgress));

    let completed = observer.apply(&with_state(TripState::Completed));
    let gone = observer.apply(&removed());

    assert!(completed.contains(&TripEffect::DetachListeners));
    assert_eq!(
      gone,
      vec![
        TripEffect::ResetToIdle {
          outcome: TripState::Completed
        },
        TripEffect::ShowRideAction {
          config: RideActionConfig::request_ride()
        },
      ]
    );
    assert!(!observer.has_active_trip());
  }

  #[test]
  fn test_withdrawn_request_is_dismissed_for_driver() {
    let mut observer = TripObserver::driver("d1");
    let presented = observer.apply(&with_state(TripState::Requested));
    assert!(presented.contains(&TripEffect::PresentTripRequest {
      passenger_uid: String::from("p1")
    }));

    let effects = observer.apply(&removed());
    assert_eq!(
      effects,
      vec![TripEffect::DismissTripRequest {
        passenger_uid: String::from("p1")
      }]
    );
  }

  #[test]
  fn test_driver_who_lost_the_request_only_dismisses_it() {
    let mut observer = TripObserver::driver("d2");
    observer.apply(&with_state(TripState::Requested));

    // d1 accepted
    let effects = observer.apply(&with_state(TripState::Accepted));

    assert_eq!(
      effects,
      vec![TripEffect::DismissTripRequest {
        passenger_uid: String::from("p1")
      }]
    );
    assert!(!observer.has_active_trip());
    assert!(observer.apply(&with_state(TripState::DriverArrived)).is_empty());
    assert!(observer.apply(&removed()).is_empty());
  }

  #[test]
  fn test_foreign_assignment_without_request_is_silent() {
    let mut observer = TripObserver::driver("d2");

    assert!(observer.apply(&with_state(TripState::Accepted)).is_empty());
    assert_eq!(observer.state(), None);
  }

  #[test]
  fn test_denied_passenger_can_request_again() {
    let mut observer = TripObserver::passenger("p1");
    observer.apply(&with_state(TripState::Requested));

    let effects = observer.apply(&with_state(TripState::Denied));

    assert!(effects.contains(&TripEffect::ResetToIdle {
      outcome: TripState::Denied
    }));
    assert!(effects.contains(&TripEffect::ShowRideAction {
      config: RideActionConfig::request_ride()
    }));
  }
}
