mod discovery;
mod locations;
mod shared;
mod trips;
mod users;

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use discovery::nearby_drivers;
use locations::update_location;
use log::info;
use nanoid::nanoid;
use shared::backend::{Backend, RealtimeBackend};
use shared::config::Config;
use shared::middleware::master_key_middleware::master_key_validator;
use trips::{
  cancel_trip, create_trip, get_trip, trip_action, trip_events, trip_requests,
};
use users::{create_user, get_user};

// This struct represents state
struct AppState<B: Backend> {
  backend: Arc<B>,
  config: Config,
}

/// Uid for new profiles, the same length as the realtime database's own.
pub fn custom_nanoid() -> String {
  nanoid!(28)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    .init();

  let app_config = Config::default();
  let server_address = app_config.server_address.clone();
  info!("Listening on http://{}", server_address);

  let backend = Arc::new(RealtimeBackend::in_memory());

  HttpServer::new(move || {
    let backend = backend.clone();
    let app_config = app_config.clone();
    App::new().configure(move |cfg| config(cfg, backend, app_config))
  })
  .bind(server_address)?
  .run()
  .await
}

// Function to initialize the App
fn config<B: Backend>(
  cfg: &mut web::ServiceConfig,
  backend: Arc<B>,
  app_config: Config,
) {
  // Rate limit
  // Allow bursts of `rate_limit_burst` requests per IP address
  // and replenish `rate_limit_per_second` elements per second
  let governor_config = GovernorConfigBuilder::default()
    .requests_per_second(app_config.rate_limit_per_second.max(1))
    .burst_size(app_config.rate_limit_burst.max(1))
    .finish()
    .expect("rate limits are at least one");

  cfg
    .app_data(web::Data::new(app_config.clone()))
    .app_data(web::Data::new(AppState {
      backend,
      config: app_config,
    }))
    .service(
      web::scope("/v1")
        .service(
          web::scope("/users")
            .wrap(Governor::new(&governor_config))
            .service(
              web::resource("")
                .wrap(HttpAuthentication::with_fn(master_key_validator))
                .route(web::post().to(create_user::<B>)),
            )
            .route("/{uid}", web::get().to(get_user::<B>)),
        )
        .service(
          web::scope("/trips")
            .wrap(Governor::new(&governor_config))
            .route("", web::post().to(create_trip::<B>))
            .route("/requests", web::get().to(trip_requests::<B>))
            .route("/{passengerUid}", web::get().to(get_trip::<B>))
            .route("/{passengerUid}", web::delete().to(cancel_trip::<B>))
            .route("/{passengerUid}/actions", web::post().to(trip_action::<B>))
            .route("/{passengerUid}/events", web::get().to(trip_events::<B>)),
        )
        .service(
          web::scope("/driver-locations")
            .wrap(Governor::new(&governor_config))
            .route("", web::put().to(update_location::<B>))
            .route("/nearby", web::get().to(nearby_drivers::<B>)),
        ),
    );
}
