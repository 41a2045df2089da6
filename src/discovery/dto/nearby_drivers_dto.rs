use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct NearbyDriversDto {
  #[validate(range(min = -90.0, max = 90.0))]
  pub latitude: f64,
  #[validate(range(min = -180.0, max = 180.0))]
  pub longitude: f64,
  /// Metres. Falls back to the configured discovery radius.
  #[validate(range(exclusive_min = 0.0))]
  pub radius: Option<f64>,
}
