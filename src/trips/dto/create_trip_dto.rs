use serde::Deserialize;
use validator::ValidationError;
use validator_derive::Validate;

use crate::shared::coordinate::Coordinate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripDto {
  #[validate(custom(function = "validate_coordinate"))]
  pub pick_up_coordinates: Coordinate,
  #[validate(custom(function = "validate_coordinate"))]
  pub destination_coordinates: Coordinate,
}

pub fn validate_coordinate(coordinate: &Coordinate) -> Result<(), ValidationError> {
  if coordinate.is_valid() {
    Ok(())
  } else {
    Err(ValidationError::new("coordinate_out_of_range"))
  }
}
