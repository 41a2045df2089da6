use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::shared::account_type::AccountType;
use crate::users::model::user::{User, UserRecord};

#[derive(Debug, Error)]
pub enum UserRepositoryError {
  #[error("User already exists: {0}")]
  AlreadyExists(String),

  #[error("Serialization error: {0}")]
  SerializationError(#[from] serde_json::Error),

  #[error("Other error: {0}")]
  Other(String),
}

pub trait UserRepository {
  async fn find_one(&self, uid: &str) -> Option<User>;
  async fn create(
    &self,
    create_user: CreateUser,
  ) -> Result<User, UserRepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
  pub uid: String,
  pub fullname: String,
  pub email: String,
  pub account_type: AccountType,
}

/// `users/{uid}` records held as raw JSON, the way the realtime database
/// hands them out.
pub struct InMemoryUserRepository {
  users: RwLock<HashMap<String, Value>>,
}

impl InMemoryUserRepository {
  pub fn new() -> Self {
    Self {
      users: RwLock::new(HashMap::new()),
    }
  }

  /// Writes a raw record, bypassing validation. Used to seed the store.
  #[cfg(test)]
  pub fn put_raw(&self, uid: &str, record: Value) -> Result<(), UserRepositoryError> {
    let mut users = self.users.write().map_err(poisoned)?;
    users.insert(String::from(uid), record);
    Ok(())
  }
}

impl Default for InMemoryUserRepository {
  fn default() -> Self {
    Self::new()
  }
}

impl UserRepository for InMemoryUserRepository {
  async fn find_one(&self, uid: &str) -> Option<User> {
    let users = self.users.read().ok()?;
    let record = users.get(uid)?;
    match serde_json::from_value::<UserRecord>(record.clone()) {
      Ok(record) => Some(record.into_user(uid)),
      Err(error) => {
        debug!("Ignoring malformed user record {}: {}", uid, error);
        None
      }
    }
  }

  async fn create(
    &self,
    create_user: CreateUser,
  ) -> Result<User, UserRepositoryError> {
    let mut users = self.users.write().map_err(poisoned)?;
    if users.contains_key(&create_user.uid) {
      return Err(UserRepositoryError::AlreadyExists(create_user.uid));
    }
    let user = User::from(create_user);
    let record = serde_json::to_value(UserRecord::from(&user))?;
    users.insert(user.uid.clone(), record);
    Ok(user)
  }
}

impl From<CreateUser> for User {
  fn from(create_user: CreateUser) -> Self {
    Self {
      uid: create_user.uid,
      fullname: create_user.fullname,
      email: create_user.email,
      account_type: create_user.account_type,
      location: None,
    }
  }
}

fn poisoned<T>(_: T) -> UserRepositoryError {
  UserRepositoryError::Other(String::from("user store lock poisoned"))
}
