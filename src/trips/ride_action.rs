use std::fmt;

use serde::Serialize;

use crate::shared::account_type::AccountType;
use crate::trips::model::trip_state::TripState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonAction {
  RequestRide,
  AcceptTrip,
  Cancel,
  GetDirections,
  Pickup,
  DropOff,
}

impl fmt::Display for ButtonAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      ButtonAction::RequestRide => "CONFIRM RIDE",
      ButtonAction::AcceptTrip => "ACCEPT TRIP",
      ButtonAction::Cancel => "CANCEL RIDE",
      ButtonAction::GetDirections => "GET DIRECTIONS",
      ButtonAction::Pickup => "PICKUP PASSENGER",
      ButtonAction::DropOff => "DROP OFF PASSENGER",
    };
    f.write_str(label)
  }
}

/// What the ride action panel shows for a trip state, from one side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideActionConfig {
  pub title: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<&'static str>,
  pub label: String,
  /// `None` while the button is informational only.
  pub action: Option<ButtonAction>,
}

impl RideActionConfig {
  fn button(title: &'static str, action: ButtonAction) -> Self {
    Self {
      title,
      subtitle: None,
      label: action.to_string(),
      action: Some(action),
    }
  }

  fn status(title: &'static str, label: &str) -> Self {
    Self {
      title,
      subtitle: None,
      label: String::from(label),
      action: None,
    }
  }

  fn with_subtitle(mut self, subtitle: &'static str) -> Self {
    self.subtitle = Some(subtitle);
    self
  }

  /// Panel shown to a passenger with no trip in flight.
  pub fn request_ride() -> Self {
    Self::button("Confirm your ride", ButtonAction::RequestRide)
  }

  /// `None` once the trip is over and the panel should be hidden.
  pub fn for_state(state: TripState, viewer: AccountType) -> Option<Self> {
    use AccountType::*;
    let config = match (state, viewer) {
      (TripState::Requested, Passenger) => {
        Self::button("Finding a Driver", ButtonAction::Cancel)
      }
      (TripState::Requested, Driver) => {
        Self::button("Trip Request", ButtonAction::AcceptTrip)
      }
      (TripState::Accepted, Passenger) => {
        Self::button("Driver En Route", ButtonAction::Cancel)
      }
      (TripState::Accepted, Driver) => {
        Self::button("En Route to Passenger", ButtonAction::GetDirections)
      }
      (TripState::DriverArrived, Passenger) => {
        Self::button("Driver Has Arrived", ButtonAction::Cancel)
          .with_subtitle("Please meet driver at pickup location")
      }
      (TripState::DriverArrived, Driver) => {
        Self::button("Arrived At Passenger Location", ButtonAction::Pickup)
      }
      (TripState::InProgress, Passenger) => {
        Self::status("En Route To Destination", "TRIP IN PROGRESS")
      }
      (TripState::InProgress, Driver) => {
        Self::button("En Route To Destination", ButtonAction::GetDirections)
      }
      (TripState::ArrivedAtDestination, Passenger) => {
        Self::status("Arrived at Destination", "ARRIVED AT DESTINATION")
      }
      (TripState::ArrivedAtDestination, Driver) => {
        Self::button("Arrived at Destination", ButtonAction::DropOff)
      }
      (TripState::Denied | TripState::Completed | TripState::Cancelled, _) => {
        return None
      }
    };
    Some(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_button_labels() {
    assert_eq!(ButtonAction::Cancel.to_string(), "CANCEL RIDE");
    assert_eq!(ButtonAction::Pickup.to_string(), "PICKUP PASSENGER");
    assert_eq!(RideActionConfig::request_ride().label, "CONFIRM RIDE");
  }

  #[test]
  fn test_accepted_differs_per_side() {
    let passenger =
      RideActionConfig::for_state(TripState::Accepted, AccountType::Passenger).unwrap();
    let driver =
      RideActionConfig::for_state(TripState::Accepted, AccountType::Driver).unwrap();

    assert_eq!(passenger.title, "Driver En Route");
    assert_eq!(passenger.action, Some(ButtonAction::Cancel));
    assert_eq!(driver.title, "En Route to Passenger");
    assert_eq!(driver.action, Some(ButtonAction::GetDirections));
  }

  #[test]
  fn test_in_progress_disables_passenger_button() {
    let config =
      RideActionConfig::for_state(TripState::InProgress, AccountType::Passenger).unwrap();
    assert_eq!(config.action, None);
    assert_eq!(config.label, "TRIP IN PROGRESS");
  }

  #[test]
  fn test_finished_trips_hide_panel() {
    for state in [TripState::Completed, TripState::Cancelled, TripState::Denied] {
      assert!(RideActionConfig::for_state(state, AccountType::Driver).is_none());
      assert!(RideActionConfig::for_state(state, AccountType::Passenger).is_none());
    }
  }
}
