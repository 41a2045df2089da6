use serde::Deserialize;

use crate::trips::model::trip_state::TripAction;

#[derive(Debug, Deserialize)]
pub struct TripActionDto {
  pub action: TripAction,
}
