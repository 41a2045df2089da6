use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::coordinate::Coordinate;
use crate::trips::dto::create_trip_dto::validate_coordinate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationDto {
  #[validate(custom(function = "validate_coordinate"))]
  pub coordinate: Coordinate,
  /// Trip the driver is currently heading to, if any.
  #[validate(length(min = 1))]
  pub passenger_uid: Option<String>,
}
