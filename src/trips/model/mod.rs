pub mod trip_state;

use serde::{Deserialize, Serialize};

use crate::shared::coordinate::Coordinate;
use trip_state::TripState;

/// One requested ride. Keyed by the passenger, so a passenger has at most one
/// trip record at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
  pub passenger_uid: String,
  pub pickup: Coordinate,
  pub destination: Coordinate,
  pub state: TripState,
  pub driver_uid: Option<String>,
}

impl Trip {
  pub fn requested(
    passenger_uid: &str,
    pickup: Coordinate,
    destination: Coordinate,
  ) -> Self {
    Self {
      passenger_uid: String::from(passenger_uid),
      pickup,
      destination,
      state: TripState::Requested,
      driver_uid: None,
    }
  }

  pub fn is_assigned_to(&self, driver_uid: &str) -> bool {
    self.driver_uid.as_deref() == Some(driver_uid)
  }
}

/// Stored shape of `trips/{passengerUid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
  pub pick_up_coordinates: Coordinate,
  pub destination_coordinates: Coordinate,
  pub state: u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub driver_uid: Option<String>,
}

impl TripRecord {
  /// `None` when the stored state is not a known ordinal.
  pub fn into_trip(self, passenger_uid: &str) -> Option<Trip> {
    Some(Trip {
      passenger_uid: String::from(passenger_uid),
      pickup: self.pick_up_coordinates,
      destination: self.destination_coordinates,
      state: TripState::from_wire(self.state)?,
      driver_uid: self.driver_uid,
    })
  }

  /// `None` for states that are never persisted.
  pub fn from_trip(trip: &Trip) -> Option<Self> {
    Some(Self {
      pick_up_coordinates: trip.pickup,
      destination_coordinates: trip.destination,
      state: trip.state.wire_value()?,
      driver_uid: trip.driver_uid.clone(),
    })
  }
}
