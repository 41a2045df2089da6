use std::fmt;

use serde::{Deserialize, Serialize};

/// Role flag stored on every user record. Serialized as the integer used by
/// `users/{uid}.accountType`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccountType {
  Passenger,
  Driver,
}

impl TryFrom<u8> for AccountType {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(AccountType::Passenger),
      1 => Ok(AccountType::Driver),
      other => Err(format!("unknown account type {}", other)),
    }
  }
}

impl From<AccountType> for u8 {
  fn from(account_type: AccountType) -> Self {
    match account_type {
      AccountType::Passenger => 0,
      AccountType::Driver => 1,
    }
  }
}

impl fmt::Display for AccountType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AccountType::Passenger => write!(f, "passenger"),
      AccountType::Driver => write!(f, "driver"),
    }
  }
}
