use serde::{Deserialize, Serialize};

use crate::shared::account_type::AccountType;
use crate::shared::coordinate::Coordinate;

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUserRto {
  pub uid: String,
  pub fullname: String,
  pub email: String,
  #[serde(rename = "accountType")]
  pub account_type: AccountType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<Coordinate>,
}
