use serde::{Deserialize, Serialize};

use crate::shared::account_type::AccountType;
use crate::shared::coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
  pub uid: String,
  pub fullname: String,
  pub email: String,
  pub account_type: AccountType,
  /// Last reported position, looked up for drivers when a profile is read.
  pub location: Option<Coordinate>,
}

impl User {
  pub fn is_driver(&self) -> bool {
    self.account_type == AccountType::Driver
  }
}

/// Stored shape of `users/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  pub email: String,
  pub fullname: String,
  pub account_type: AccountType,
}

impl UserRecord {
  pub fn into_user(self, uid: &str) -> User {
    User {
      uid: String::from(uid),
      fullname: self.fullname,
      email: self.email,
      account_type: self.account_type,
      location: None,
    }
  }
}

impl From<&User> for UserRecord {
  fn from(user: &User) -> Self {
    Self {
      email: user.email.clone(),
      fullname: user.fullname.clone(),
      account_type: user.account_type,
    }
  }
}
