use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::account_type::AccountType;

/// Lifecycle of a trip.
///
/// `Requested` through `Completed` keep the integer values stored in
/// `trips/{passengerUid}.state`. `Cancelled` never reaches the record: a
/// cancellation deletes it, and observers surface the deletion as this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TripState {
  Requested,
  Denied,
  Accepted,
  DriverArrived,
  InProgress,
  ArrivedAtDestination,
  Completed,
  Cancelled,
}

impl TripState {
  pub fn wire_value(self) -> Option<u8> {
    match self {
      TripState::Requested => Some(0),
      TripState::Denied => Some(1),
      TripState::Accepted => Some(2),
      TripState::DriverArrived => Some(3),
      TripState::InProgress => Some(4),
      TripState::ArrivedAtDestination => Some(5),
      TripState::Completed => Some(6),
      TripState::Cancelled => None,
    }
  }

  pub fn from_wire(value: u8) -> Option<Self> {
    match value {
      0 => Some(TripState::Requested),
      1 => Some(TripState::Denied),
      2 => Some(TripState::Accepted),
      3 => Some(TripState::DriverArrived),
      4 => Some(TripState::InProgress),
      5 => Some(TripState::ArrivedAtDestination),
      6 => Some(TripState::Completed),
      _ => None,
    }
  }

  /// Position along the ride. Never decreases for a given trip.
  pub fn progress(self) -> u8 {
    match self {
      TripState::Requested => 0,
      TripState::Accepted | TripState::Denied => 1,
      TripState::DriverArrived => 2,
      TripState::InProgress => 3,
      TripState::ArrivedAtDestination => 4,
      TripState::Completed | TripState::Cancelled => 5,
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      TripState::Denied | TripState::Completed | TripState::Cancelled
    )
  }

  /// Next state for `action`, or `None` when the action is not legal here.
  pub fn next(self, action: TripAction) -> Option<TripState> {
    use TripAction::*;
    use TripState::*;
    match (self, action) {
      (Requested, Accept) => Some(Accepted),
      (Requested, Deny) => Some(Denied),
      (Accepted, EnterPickupGeofence) => Some(DriverArrived),
      (DriverArrived, Start) => Some(InProgress),
      (InProgress, ArriveAtDestination) => Some(ArrivedAtDestination),
      (InProgress | ArrivedAtDestination, Complete) => Some(Completed),
      (state, Cancel) if !state.is_terminal() => Some(Cancelled),
      _ => None,
    }
  }
}

impl fmt::Display for TripState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TripState::Requested => "requested",
      TripState::Denied => "denied",
      TripState::Accepted => "accepted",
      TripState::DriverArrived => "driverArrived",
      TripState::InProgress => "inProgress",
      TripState::ArrivedAtDestination => "arrivedAtDestination",
      TripState::Completed => "completed",
      TripState::Cancelled => "cancelled",
    };
    f.write_str(name)
  }
}

/// Everything a client can do to an existing trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TripAction {
  Accept,
  Deny,
  EnterPickupGeofence,
  Start,
  ArriveAtDestination,
  Complete,
  Cancel,
}

impl TripAction {
  /// Account type allowed to perform the action.
  pub fn actor(self) -> AccountType {
    match self {
      TripAction::Cancel => AccountType::Passenger,
      _ => AccountType::Driver,
    }
  }

  /// State the trip is in once the action has been applied.
  pub fn target_state(self) -> TripState {
    match self {
      TripAction::Accept => TripState::Accepted,
      TripAction::Deny => TripState::Denied,
      TripAction::EnterPickupGeofence => TripState::DriverArrived,
      TripAction::Start => TripState::InProgress,
      TripAction::ArriveAtDestination => TripState::ArrivedAtDestination,
      TripAction::Complete => TripState::Completed,
      TripAction::Cancel => TripState::Cancelled,
    }
  }

  /// Whether only the driver already assigned to the trip may act.
  pub fn requires_assigned_driver(self) -> bool {
    !matches!(self, TripAction::Accept | TripAction::Deny | TripAction::Cancel)
  }
}

impl fmt::Display for TripAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TripAction::Accept => "accept",
      TripAction::Deny => "deny",
      TripAction::EnterPickupGeofence => "enterPickupGeofence",
      TripAction::Start => "start",
      TripAction::ArriveAtDestination => "arriveAtDestination",
      TripAction::Complete => "complete",
      TripAction::Cancel => "cancel",
    };
    f.write_str(name)
  }
}
