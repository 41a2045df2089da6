use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;

use crate::locations::model::GeoEvent;
use crate::shared::coordinate::Coordinate;
use crate::users::model::user::User;

/// Live marker for one nearby driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverAnnotation {
  pub uid: String,
  pub fullname: String,
  pub coordinate: Coordinate,
  pub updated_at: DateTime<Utc>,
}

impl DriverAnnotation {
  fn new(driver: User, coordinate: Coordinate, at: DateTime<Utc>) -> Self {
    Self {
      uid: driver.uid,
      fullname: driver.fullname,
      coordinate,
      updated_at: at,
    }
  }

  fn update_position(&mut self, coordinate: Coordinate, at: DateTime<Utc>) {
    self.coordinate = coordinate;
    self.updated_at = at;
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiscoveryChange {
  Appeared { driver: DriverAnnotation },
  Moved { driver: DriverAnnotation },
  Departed { uid: String },
}

/// Nearby drivers keyed by uid. A uid is annotated at most once; later
/// positions update the existing annotation.
#[derive(Debug, Default)]
pub struct DriverAnnotations {
  annotations: HashMap<String, DriverAnnotation>,
}

impl DriverAnnotations {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, uid: &str) -> Option<&DriverAnnotation> {
    self.annotations.get(uid)
  }

  pub fn len(&self) -> usize {
    self.annotations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.annotations.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &DriverAnnotation> {
    self.annotations.values()
  }

  /// Whether applying `event` needs the driver's profile first.
  pub fn needs_profile(&self, event: &GeoEvent) -> bool {
    !matches!(event, GeoEvent::Exited { .. }) && !self.annotations.contains_key(event.uid())
  }

  /// Applies one geo event. `profile` is only consulted for drivers not yet
  /// annotated; without a driver profile the event is dropped.
  pub fn apply(
    &mut self,
    event: &GeoEvent,
    profile: Option<User>,
  ) -> Option<DiscoveryChange> {
    match event {
      GeoEvent::Entered {
        uid,
        coordinate,
        at,
      }
      | GeoEvent::Moved {
        uid,
        coordinate,
        at,
      } => {
        if let Some(existing) = self.annotations.get_mut(uid) {
          if *at <= existing.updated_at {
            return None;
          }
          existing.update_position(*coordinate, *at);
          return Some(DiscoveryChange::Moved {
            driver: existing.clone(),
          });
        }
        let driver = profile.filter(User::is_driver);
        let Some(driver) = driver else {
          debug!("No driver profile for {}, skipping", uid);
          return None;
        };
        let annotation = DriverAnnotation::new(driver, *coordinate, *at);
        self.annotations.insert(uid.clone(), annotation.clone());
        Some(DiscoveryChange::Appeared { driver: annotation })
      }
      GeoEvent::Exited { uid, at } => {
        let existing = self.annotations.get(uid)?;
        if *at < existing.updated_at {
          return None;
        }
        self.annotations.remove(uid);
        Some(DiscoveryChange::Departed { uid: uid.clone() })
      }
    }
  }

  /// Removes annotations not refreshed within `ttl` of `now`.
  pub fn prune_stale(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<DiscoveryChange> {
    let stale: Vec<String> = self
      .annotations
      .values()
      .filter(|annotation| now - annotation.updated_at > ttl)
      .map(|annotation| annotation.uid.clone())
      .collect();
    stale
      .into_iter()
      .map(|uid| {
        self.annotations.remove(&uid);
        DiscoveryChange::Departed { uid }
      })
      .collect()
  }
}
