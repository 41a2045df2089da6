use actix_web::{dev::ServiceRequest, error, web, Error};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use log::warn;
use subtle::ConstantTimeEq;

use crate::shared::config::Config;

/// Validator that:
/// - accepts Bearer auth carrying the master key;
/// - returns a custom response for requests without a valid Bearer Authorization header;
pub async fn master_key_validator(
  req: ServiceRequest,
  credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
  let Some(credentials) = credentials else {
    return Err((error::ErrorUnauthorized("Missing bearer token"), req));
  };

  let Some(config) = req.app_data::<web::Data<Config>>() else {
    return Err((error::ErrorInternalServerError("Missing configuration"), req));
  };

  if !constant_time_compare(credentials.token(), &config.master_key) {
    warn!("Rejected request with invalid master key");
    return Err((error::ErrorUnauthorized("Invalid master key"), req));
  }

  Ok(req)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
  a.as_bytes().ct_eq(b.as_bytes()).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_constant_time_compare() {
    assert!(constant_time_compare("master", "master"));
    assert!(!constant_time_compare("master", "masteR"));
    assert!(!constant_time_compare("master", "master-key"));
  }
}
