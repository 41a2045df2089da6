use serde::{Deserialize, Serialize};

use crate::shared::coordinate::Coordinate;
use crate::trips::model::trip_state::TripState;
use crate::trips::model::Trip;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTripRto {
  pub passenger_uid: String,
  pub pick_up_coordinates: Coordinate,
  pub destination_coordinates: Coordinate,
  pub state: TripState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub driver_uid: Option<String>,
}

// Transform Trip domain to RTO
impl From<Trip> for GetTripRto {
  fn from(trip: Trip) -> Self {
    Self {
      passenger_uid: trip.passenger_uid,
      pick_up_coordinates: trip.pickup,
      destination_coordinates: trip.destination,
      state: trip.state,
      driver_uid: trip.driver_uid,
    }
  }
}
