pub mod dto;
pub mod geohash;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse, Responder};
use dto::update_location_dto::UpdateLocationDto;
use rto::location_rto::LocationRto;
use validator::Validate;

use crate::shared::backend::Backend;
use crate::trips::controller::{Actor, TripLifecycleController};
use crate::trips::trip_error_response;
use crate::users::model::access_token_claims::AccessTokenClaims;
use crate::AppState;

/// Stores the calling driver's position. When `passengerUid` names the trip
/// the driver is heading to, entering its pickup geofence marks the driver
/// as arrived.
pub async fn update_location<B: Backend>(
  data: web::Data<AppState<B>>,
  payload: web::Json<UpdateLocationDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  // Perform validation
  if let Err(validation_errors) = payload.validate() {
    // If validation fails, return a 400 error with details
    return HttpResponse::BadRequest().json(validation_errors);
  }
  let controller = TripLifecycleController::from_config(
    data.backend.clone(),
    Actor::from(&auth),
    &data.config,
  );
  controller
    .report_location(payload.coordinate, payload.passenger_uid.as_deref())
    .await
    .map(|report| {
      HttpResponse::Ok()
        .content_type("application/json")
        .json(LocationRto::from(report))
    })
    .unwrap_or_else(trip_error_response)
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::HttpRequest;

  use super::*;
  use crate::helpers::tests::{
    create_fake_access_token_claims, http_request, in_memory_app_state,
    parse_http_response,
  };
  use crate::locations::repository::location_store::GeoLocationStore;
  use crate::shared::account_type::AccountType;
  use crate::shared::coordinate::Coordinate;
  use crate::shared::http_error::HttpError;
  use crate::trips::model::trip_state::{TripAction, TripState};
  use crate::trips::repository::trip_repository::tests::requested_trip;
  use crate::trips::repository::trip_repository::TripRepository;

  fn update(latitude: f64, passenger_uid: Option<&str>) -> web::Json<UpdateLocationDto> {
    web::Json(UpdateLocationDto {
      coordinate: Coordinate::new(latitude, 10.0),
      passenger_uid: passenger_uid.map(String::from),
    })
  }

  #[actix_web::test]
  async fn test_driver_location_is_stored() {
    let app_state = in_memory_app_state();
    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = update_location(
      app_state.clone(),
      update(12.5, None),
      create_fake_access_token_claims("d1", AccountType::Driver),
    )
    .await;

    let rto: LocationRto =
      parse_http_response(responder, &request, StatusCode::OK).await;
    assert_eq!(rto.uid, "d1");
    assert!(rto.arrived.is_none());
    let stored = app_state.backend.locations().location("d1").await.unwrap();
    assert_eq!(stored.coordinate, Coordinate::new(12.5, 10.0));
  }

  #[actix_web::test]
  async fn test_entering_pickup_geofence_marks_arrival() {
    let app_state = in_memory_app_state();
    let request: HttpRequest = http_request(&app_state.config.jwt_secret);
    let trips = app_state.backend.trips();
    trips.create(requested_trip("p1")).await.unwrap();
    let driver = TripLifecycleController::new(app_state.backend.clone(), Actor::driver("d1"));
    driver.apply("p1", TripAction::Accept).await.unwrap();

    // Still far from the pickup
    let responder = update_location(
      app_state.clone(),
      update(11.0, Some("p1")),
      create_fake_access_token_claims("d1", AccountType::Driver),
    )
    .await;
    let rto: LocationRto =
      parse_http_response(responder, &request, StatusCode::OK).await;
    assert!(rto.arrived.is_none());

    let responder = update_location(
      app_state.clone(),
      update(10.0, Some("p1")),
      create_fake_access_token_claims("d1", AccountType::Driver),
    )
    .await;
    let rto: LocationRto =
      parse_http_response(responder, &request, StatusCode::OK).await;
    assert_eq!(rto.arrived.map(|trip| trip.state), Some(TripState::DriverArrived));
    assert_eq!(
      trips.find_one("p1").await.map(|trip| trip.state),
      Some(TripState::DriverArrived)
    );
  }

  #[actix_web::test]
  async fn test_passenger_cannot_report_location() {
    let app_state = in_memory_app_state();
    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = update_location(
      app_state,
      update(10.0, None),
      create_fake_access_token_claims("p1", AccountType::Passenger),
    )
    .await;

    let _: HttpError =
      parse_http_response(responder, &request, StatusCode::FORBIDDEN).await;
  }

  #[actix_web::test]
  async fn test_out_of_range_coordinate_rejected() {
    let app_state = in_memory_app_state();
    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = update_location(
      app_state,
      update(120.0, None),
      create_fake_access_token_claims("d1", AccountType::Driver),
    )
    .await;

    let errors: serde_json::Value =
      parse_http_response(responder, &request, StatusCode::BAD_REQUEST).await;
    assert!(errors.get("coordinate").is_some());
  }
}
