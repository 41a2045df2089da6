use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GetTripDto {
  #[serde(rename = "passengerUid")]
  #[validate(length(min = 1))]
  pub passenger_uid: String,
}
