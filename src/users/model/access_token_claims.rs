use serde::{Deserialize, Serialize};

use crate::shared::account_type::AccountType;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
  pub uid: String,
  #[serde(rename = "accountType")]
  pub account_type: AccountType,
  pub exp: usize,
  pub iat: usize,
}

impl AccessTokenClaims {
  pub fn is_driver(&self) -> bool {
    self.account_type == AccountType::Driver
  }
}
