use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::retry::RetryPolicy;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
  pub master_key: String,
  pub jwt_secret: String,
  pub server_address: String,
  /// Default radius for nearby-driver discovery.
  pub discovery_radius_meters: f64,
  /// Distance from the pickup at which an en-route driver counts as arrived.
  pub pickup_geofence_meters: f64,
  /// Discovered drivers not refreshed within this window are pruned.
  pub driver_ttl_seconds: i64,
  pub retry: RetryPolicy,
  /// Requests replenished per second and per peer address.
  pub rate_limit_per_second: u64,
  pub rate_limit_burst: u32,
}

impl Default for Config {
  fn default() -> Self {
    let master_key =
      env::var("MASTER_KEY").unwrap_or_else(|_| "DEV_MASTER_KEY".to_string());
    let jwt_secret =
      env::var("JWT_SECRET").unwrap_or_else(|_| "DEV_JWT_SECRET".to_string());
    let server_address = env::var("SERVER_ADDRESS")
      .unwrap_or_else(|_| "127.0.0.1:3001".to_string());
    let retry = RetryPolicy {
      max_attempts: env_or("RETRY_MAX_ATTEMPTS", 3),
      initial_delay_ms: env_or("RETRY_INITIAL_DELAY_MS", 100),
      ..RetryPolicy::default()
    };
    Self {
      master_key,
      jwt_secret,
      server_address,
      discovery_radius_meters: env_or("DISCOVERY_RADIUS_METERS", 200_000.0),
      pickup_geofence_meters: env_or("PICKUP_GEOFENCE_METERS", 100.0),
      driver_ttl_seconds: env_or("DRIVER_TTL_SECONDS", 300),
      retry,
      rate_limit_per_second: env_or("RATE_LIMIT_PER_SECOND", 2),
      rate_limit_burst: env_or("RATE_LIMIT_BURST", 5),
    }
  }
}

fn env_or<T: FromStr>(key: &str, fallback: T) -> T {
  env::var(key)
    .ok()
    .and_then(|value| value.parse().ok())
    .unwrap_or(fallback)
}
