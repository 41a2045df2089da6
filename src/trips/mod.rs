pub mod controller;
pub mod dto;
pub mod error;
pub mod geofence;
pub mod model;
pub mod observer;
pub mod repository;
pub mod ride_action;
pub mod rto;

use std::time::Duration;

use actix_web::{http::header, web, Either, HttpResponse, Responder};
use actix_web_lab::sse::Sse;
use controller::{Actor, TripLifecycleController};
use dto::create_trip_dto::CreateTripDto;
use dto::get_trip_dto::GetTripDto;
use dto::trip_action_dto::TripActionDto;
use error::TripError;
use futures::{stream, StreamExt};
use model::trip_state::{TripAction, TripState};
use model::Trip;
use observer::TripObserver;
use repository::trip_repository::{TripRepository, TripRepositoryError};
use rto::get_trip_rto::GetTripRto;
use validator::Validate;

use crate::locations::repository::location_store::GeoLocationError;
use crate::shared::backend::Backend;
use crate::shared::http_error::HttpError;
use crate::shared::sse::json_event;
use crate::users::model::access_token_claims::AccessTokenClaims;
use crate::AppState;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

pub async fn create_trip<B: Backend>(
  data: web::Data<AppState<B>>,
  dto: web::Json<CreateTripDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  // Perform validation
  if let Err(validation_errors) = dto.validate() {
    // If validation fails, return a 400 error with details
    return HttpResponse::BadRequest().json(validation_errors);
  }
  let dto = dto.into_inner();
  controller_for(&data, &auth)
    .request_trip(dto.pick_up_coordinates, dto.destination_coordinates)
    .await
    .map(trip_created)
    .unwrap_or_else(trip_error_response)
}

pub async fn get_trip<B: Backend>(
  data: web::Data<AppState<B>>,
  path: web::Path<GetTripDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  // Perform validation
  if let Err(validation_errors) = path.validate() {
    // If validation fails, return a 400 error with details
    return HttpResponse::BadRequest().json(validation_errors);
  }
  data
    .backend
    .trips()
    .find_one(&path.passenger_uid)
    .await
    .filter(|trip| can_view(trip, &auth))
    .map(trip_found)
    .unwrap_or_else(trip_not_found)
}

pub async fn trip_action<B: Backend>(
  data: web::Data<AppState<B>>,
  path: web::Path<GetTripDto>,
  dto: web::Json<TripActionDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }
  controller_for(&data, &auth)
    .apply(&path.passenger_uid, dto.action)
    .await
    .map(trip_found)
    .unwrap_or_else(trip_error_response)
}

pub async fn cancel_trip<B: Backend>(
  data: web::Data<AppState<B>>,
  path: web::Path<GetTripDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }
  controller_for(&data, &auth)
    .apply(&path.passenger_uid, TripAction::Cancel)
    .await
    .map(trip_found)
    .unwrap_or_else(trip_error_response)
}

/// Streams `trip` events for one trip, each followed by the `effect` events
/// the caller's client has to carry out.
pub async fn trip_events<B: Backend>(
  data: web::Data<AppState<B>>,
  path: web::Path<GetTripDto>,
  auth: AccessTokenClaims,
) -> Either<HttpResponse, impl Responder> {
  if let Err(validation_errors) = path.validate() {
    return Either::Left(HttpResponse::BadRequest().json(validation_errors));
  }
  let subscription = match controller_for(&data, &auth)
    .observe_trip(&path.passenger_uid)
    .await
  {
    Ok(subscription) => subscription,
    Err(error) => return Either::Left(trip_error_response(error)),
  };
  let mut observer = TripObserver::new(
    &auth.uid,
    auth.account_type,
    data.config.pickup_geofence_meters,
  );
  let events = subscription.flat_map(move |event| {
    let mut events = vec![json_event("trip", &event)];
    events.extend(
      observer
        .apply(&event)
        .iter()
        .map(|effect| json_event("effect", effect)),
    );
    stream::iter(events)
  });
  Either::Right(Sse::from_stream(events).with_keep_alive(KEEP_ALIVE))
}

pub async fn trip_requests<B: Backend>(
  data: web::Data<AppState<B>>,
  auth: AccessTokenClaims,
) -> Either<HttpResponse, impl Responder> {
  let subscription = match controller_for(&data, &auth).observe_requests() {
    Ok(subscription) => subscription,
    Err(error) => return Either::Left(trip_error_response(error)),
  };
  let events = subscription.map(|event| json_event("trip", &event));
  Either::Right(Sse::from_stream(events).with_keep_alive(KEEP_ALIVE))
}

/// Maps a failed trip operation to its HTTP response.
pub fn trip_error_response(error: TripError) -> HttpResponse {
  let mut response = match &error {
    TripError::NotFound | TripError::Repository(TripRepositoryError::NotFound(_)) => {
      HttpResponse::NotFound()
    }
    TripError::WrongAccountType { .. }
    | TripError::NotTripOwner
    | TripError::NotTripParticipant
    | TripError::NotAssignedDriver(_) => HttpResponse::Forbidden(),
    TripError::AlreadyAssigned
    | TripError::IllegalTransition { .. }
    | TripError::Repository(TripRepositoryError::AlreadyExists(_))
    | TripError::Repository(TripRepositoryError::StateMismatch { .. }) => {
      HttpResponse::Conflict()
    }
    TripError::Invalid(_)
    | TripError::Location(GeoLocationError::InvalidCoordinate(_))
    | TripError::Location(GeoLocationError::InvalidRadius(_)) => HttpResponse::BadRequest(),
    TripError::Repository(TripRepositoryError::Unavailable(_)) => {
      HttpResponse::ServiceUnavailable()
    }
    _ => HttpResponse::InternalServerError(),
  };
  response
    .content_type("application/json")
    .json(HttpError::from(error.to_string()))
}

fn controller_for<B: Backend>(
  data: &AppState<B>,
  auth: &AccessTokenClaims,
) -> TripLifecycleController<B> {
  TripLifecycleController::from_config(data.backend.clone(), Actor::from(auth), &data.config)
}

// Open requests are visible to every driver so they can decide to accept.
fn can_view(trip: &Trip, auth: &AccessTokenClaims) -> bool {
  trip.passenger_uid == auth.uid
    || trip.is_assigned_to(&auth.uid)
    || (auth.is_driver() && trip.state == TripState::Requested)
}

fn trip_found(trip: Trip) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/json")
    .json(GetTripRto::from(trip))
}

fn trip_created(trip: Trip) -> HttpResponse {
  HttpResponse::Created()
    .content_type("application/json")
    .append_header((header::LOCATION, format!("/v1/trips/{}", trip.passenger_uid)))
    .json(GetTripRto::from(trip))
}

fn trip_not_found() -> HttpResponse {
  HttpResponse::NotFound()
    .content_type("application/json")
    .json(HttpError::from("Trip not found"))
}
