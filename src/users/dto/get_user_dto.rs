use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GetUserDto {
  #[validate(length(min = 1))]
  pub uid: String,
}
