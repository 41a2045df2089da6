pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use dto::create_user_dto::CreateUserDto;
use dto::get_user_dto::GetUserDto;
use log::error;
use model::access_token_claims::AccessTokenClaims;
use model::user::User;
use repository::user_repository::{CreateUser, UserRepository, UserRepositoryError};
use rto::get_user_rto::GetUserRto;
use validator::Validate;

use crate::custom_nanoid;
use crate::locations::repository::location_store::GeoLocationStore;
use crate::shared::backend::Backend;
use crate::shared::http_error::HttpError;
use crate::shared::rto::created_rto::CreatedRto;
use crate::AppState;

pub async fn get_user<B: Backend>(
  data: web::Data<AppState<B>>,
  path: web::Path<GetUserDto>,
  _auth: AccessTokenClaims,
) -> impl Responder {
  // Perform validation
  if let Err(validation_errors) = path.validate() {
    // If validation fails, return a 400 error with details
    return HttpResponse::BadRequest().json(validation_errors);
  }
  let Some(mut user) = data.backend.users().find_one(&path.uid).await else {
    return user_not_found();
  };
  if user.is_driver() {
    user.location = data
      .backend
      .locations()
      .location(&user.uid)
      .await
      .map(|location| location.coordinate);
  }
  user_found(user)
}

/// Registers a passenger or driver profile. Guarded by the master key.
pub async fn create_user<B: Backend>(
  data: web::Data<AppState<B>>,
  payload: web::Json<CreateUserDto>,
) -> impl Responder {
  if let Err(validation_errors) = payload.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }
  data
    .backend
    .users()
    .create(CreateUser::from(payload.into_inner()))
    .await
    .map(user_created)
    .unwrap_or_else(failed_create_user)
}

fn user_found(user: User) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/json")
    .json(GetUserRto::from(user))
}

fn user_created(user: User) -> HttpResponse {
  HttpResponse::Created()
    .content_type("application/json")
    .append_header((header::LOCATION, format!("/v1/users/{}", user.uid)))
    .json(CreatedRto::from(user.uid.as_str()))
}

fn user_not_found() -> HttpResponse {
  HttpResponse::NotFound()
    .content_type("application/json")
    .json(HttpError::from("User not found"))
}

fn failed_create_user(error: UserRepositoryError) -> HttpResponse {
  match error {
    UserRepositoryError::AlreadyExists(_) => HttpResponse::Conflict()
      .content_type("application/json")
      .json(HttpError::from(error.to_string())),
    error => {
      error!("Failed to create user: {}", error);
      HttpResponse::InternalServerError().finish()
    }
  }
}

impl From<CreateUserDto> for CreateUser {
  fn from(dto: CreateUserDto) -> Self {
    Self {
      uid: custom_nanoid(),
      fullname: dto.fullname,
      email: dto.email,
      account_type: dto.account_type,
    }
  }
}

// Transform User domain to RTO
impl From<User> for GetUserRto {
  fn from(user: User) -> Self {
    Self {
      uid: user.uid,
      fullname: user.fullname,
      email: user.email,
      account_type: user.account_type,
      location: user.location,
    }
  }
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::HttpRequest;
  use nanoid::nanoid;

  use super::*;
  use crate::helpers::tests::{
    create_fake_access_token_claims, fake_create_user, http_request,
    in_memory_app_state, parse_http_response,
  };
  use crate::shared::account_type::AccountType;
  use crate::shared::coordinate::Coordinate;

  #[actix_web::test]
  async fn test_get_user_successful() {
    let app_state = in_memory_app_state();
    let create_user = fake_create_user(AccountType::Driver);
    app_state.backend.users().create(create_user.clone()).await.unwrap();

    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = get_user(
      app_state,
      web::Path::from(GetUserDto {
        uid: create_user.uid.clone(),
      }),
      create_fake_access_token_claims("p1", AccountType::Passenger),
    )
    .await;

    let rto: GetUserRto =
      parse_http_response(responder, &request, StatusCode::OK).await;

    // Assertions
    assert_eq!(rto.uid, create_user.uid);
    assert_eq!(rto.fullname, create_user.fullname);
    assert_eq!(rto.account_type, AccountType::Driver);
  }

  #[actix_web::test]
  async fn test_get_user_reports_driver_location() {
    let app_state = in_memory_app_state();
    let create_user = fake_create_user(AccountType::Driver);
    app_state.backend.users().create(create_user.clone()).await.unwrap();
    let coordinate = Coordinate::new(-6.2, 106.8);
    app_state
      .backend
      .locations()
      .set_location(&create_user.uid, coordinate)
      .await
      .unwrap();

    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = get_user(
      app_state,
      web::Path::from(GetUserDto {
        uid: create_user.uid.clone(),
      }),
      create_fake_access_token_claims("p1", AccountType::Passenger),
    )
    .await;

    let rto: GetUserRto =
      parse_http_response(responder, &request, StatusCode::OK).await;

    let location = rto.location.unwrap();
    assert!(location.distance_to(&coordinate) < 1.0);
  }

  #[actix_web::test]
  async fn test_get_user_passenger_has_no_location() {
    let app_state = in_memory_app_state();
    let create_user = fake_create_user(AccountType::Passenger);
    app_state.backend.users().create(create_user.clone()).await.unwrap();

    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = get_user(
      app_state,
      web::Path::from(GetUserDto {
        uid: create_user.uid.clone(),
      }),
      create_fake_access_token_claims("p1", AccountType::Passenger),
    )
    .await;

    let rto: serde_json::Value =
      parse_http_response(responder, &request, StatusCode::OK).await;

    assert!(rto.get("location").is_none());
  }

  #[actix_web::test]
  async fn test_get_user_uid_not_found() {
    let app_state = in_memory_app_state();
    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = get_user(
      app_state,
      web::Path::from(GetUserDto { uid: nanoid!() }),
      create_fake_access_token_claims("p1", AccountType::Passenger),
    )
    .await;

    let rto: HttpError =
      parse_http_response(responder, &request, StatusCode::NOT_FOUND).await;

    // Assertions
    assert_eq!(rto.message, "User not found");
  }

  #[actix_web::test]
  async fn test_create_user_rejects_invalid_email() {
    let app_state = in_memory_app_state();
    let request: HttpRequest = http_request(&app_state.config.jwt_secret);

    let responder = create_user(
      app_state,
      web::Json(CreateUserDto {
        fullname: String::from("Jane Doe"),
        email: String::from("not-an-email"),
        account_type: AccountType::Passenger,
      }),
    )
    .await;

    let errors: serde_json::Value =
      parse_http_response(responder, &request, StatusCode::BAD_REQUEST).await;
    assert!(errors.get("email").is_some());
  }

  #[test]
  fn test_create_user_dto_to_create_user() {
    let dto = CreateUserDto {
      fullname: String::from("Jane Doe"),
      email: String::from("jane@example.com"),
      account_type: AccountType::Driver,
    };

    let create_user: CreateUser = dto.clone().into();

    assert_eq!(create_user.fullname, dto.fullname);
    assert_eq!(create_user.account_type, dto.account_type);
    assert!(!create_user.uid.is_empty()); // Ensure uid is generated
  }

  #[test]
  fn test_user_to_get_user_rto() {
    let user = User {
      uid: String::from("test_uid"),
      fullname: String::from("Jane Doe"),
      email: String::from("jane@example.com"),
      account_type: AccountType::Passenger,
      location: None,
    };

    let rto: GetUserRto = user.clone().into();

    assert_eq!(rto.uid, user.uid);
    assert_eq!(rto.email, user.email);
    assert_eq!(rto.account_type, user.account_type);
  }
}
