pub mod annotations;
pub mod dto;

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use actix_web::{web, Either, HttpResponse, Responder};
use actix_web_lab::sse::Sse;
use annotations::{DiscoveryChange, DriverAnnotations};
use chrono::{Duration, Utc};
use dto::nearby_drivers_dto::NearbyDriversDto;
use futures::future::{self, Either as Next};
use futures::{stream, Stream, StreamExt};
use log::{debug, warn};
use validator::Validate;

use crate::locations::model::GeoEvent;
use crate::locations::repository::location_store::{GeoLocationError, GeoLocationStore};
use crate::shared::backend::Backend;
use crate::shared::coordinate::Coordinate;
use crate::shared::http_error::HttpError;
use crate::shared::sse::json_event;
use crate::shared::subscription::Subscription;
use crate::users::model::access_token_claims::AccessTokenClaims;
use crate::users::repository::user_repository::UserRepository;
use crate::AppState;

/// Turns a radius query into a deduplicated, live set of nearby drivers.
pub struct DriverDiscovery<B: Backend> {
  backend: Arc<B>,
  subscription: Subscription<GeoEvent>,
  annotations: DriverAnnotations,
  ttl: Duration,
}

impl<B: Backend> DriverDiscovery<B> {
  pub fn start(
    backend: Arc<B>,
    center: Coordinate,
    radius_meters: f64,
    ttl: Duration,
  ) -> Result<Self, GeoLocationError> {
    let subscription = backend.locations().query_nearby(center, radius_meters)?;
    Ok(Self {
      backend,
      subscription,
      annotations: DriverAnnotations::new(),
      ttl,
    })
  }

  pub fn annotations(&self) -> &DriverAnnotations {
    &self.annotations
  }

  /// Waits for the next visible change. `None` once the query is closed.
  pub async fn next_change(&mut self) -> Option<DiscoveryChange> {
    loop {
      let event = self.subscription.next().await?;
      if let Some(change) = self.handle(event).await {
        return Some(change);
      }
    }
  }

  pub fn prune_stale(&mut self) -> Vec<DiscoveryChange> {
    self.annotations.prune_stale(Utc::now(), self.ttl)
  }

  pub fn cancel(&mut self) {
    self.subscription.cancel();
  }

  /// Stream of changes that also prunes stale drivers every `prune_every`.
  pub fn into_changes(
    self,
    prune_every: StdDuration,
  ) -> impl Stream<Item = DiscoveryChange> {
    let interval = actix_rt::time::interval(prune_every);
    stream::unfold((self, interval), |(mut discovery, mut interval)| async move {
      loop {
        let input = {
          let tick = pin!(interval.tick());
          match future::select(discovery.subscription.next(), tick).await {
            Next::Left((event, _)) => Some(event),
            Next::Right(_) => None,
          }
        };
        let changes: Vec<DiscoveryChange> = match input {
          Some(Some(event)) => discovery.handle(event).await.into_iter().collect(),
          Some(None) => return None,
          None => discovery.prune_stale(),
        };
        if !changes.is_empty() {
          return Some((stream::iter(changes), (discovery, interval)));
        }
      }
    })
    .flatten()
  }

  async fn handle(&mut self, event: GeoEvent) -> Option<DiscoveryChange> {
    let profile = if self.annotations.needs_profile(&event) {
      let profile = self.backend.users().find_one(event.uid()).await;
      if profile.is_none() {
        debug!("Driver {} has no profile", event.uid());
      }
      profile
    } else {
      None
    };
    self.annotations.apply(&event, profile)
  }
}

pub async fn nearby_drivers<B: Backend>(
  data: web::Data<AppState<B>>,
  query: web::Query<NearbyDriversDto>,
  _auth: AccessTokenClaims,
) -> Either<HttpResponse, impl Responder> {
  // Perform validation
  if let Err(validation_errors) = query.validate() {
    // If validation fails, return a 400 error with details
    return Either::Left(HttpResponse::BadRequest().json(validation_errors));
  }
  let center = Coordinate::new(query.latitude, query.longitude);
  let radius = query.radius.unwrap_or(data.config.discovery_radius_meters);
  let ttl = Duration::seconds(data.config.driver_ttl_seconds);

  let discovery = match DriverDiscovery::start(data.backend.clone(), center, radius, ttl) {
    Ok(discovery) => discovery,
    Err(error) => {
      warn!("Failed to start driver discovery: {}", error);
      return Either::Left(
        HttpResponse::BadRequest()
          .content_type("application/json")
          .json(HttpError::from(error.to_string())),
      );
    }
  };

  let prune_every = StdDuration::from_secs(data.config.driver_ttl_seconds.max(1) as u64);
  let events = discovery.into_changes(prune_every).map(|change| {
    let name = match &change {
      DiscoveryChange::Appeared { .. } => "appeared",
      DiscoveryChange::Moved { .. } => "moved",
      DiscoveryChange::Departed { .. } => "departed",
    };
    json_event(name, &change)
  });
  Either::Right(Sse::from_stream(events).with_keep_alive(StdDuration::from_secs(15)))
}
