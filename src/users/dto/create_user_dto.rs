use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::account_type::AccountType;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserDto {
  #[validate(length(min = 1, max = 120))]
  pub fullname: String,
  #[validate(email)]
  pub email: String,
  #[serde(rename = "accountType")]
  pub account_type: AccountType,
}
