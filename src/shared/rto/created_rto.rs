use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRto {
  pub uid: String,
}

impl From<&str> for CreatedRto {
  fn from(uid: &str) -> Self {
    Self {
      uid: String::from(uid),
    }
  }
}
