use crate::{
  shared::config::Config, users::model::access_token_claims::AccessTokenClaims,
};
use actix_web::web::Data;
use actix_web::Error;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use log::debug;

impl FromRequest for AccessTokenClaims {
  type Error = Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(config) = req.app_data::<Data<Config>>() else {
      return ready(Err(actix_web::error::ErrorInternalServerError(
        "Missing configuration",
      )));
    };
    ready(
      req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .and_then(|token| {
          find_auth_user(config, token)
            .map_err(|error| debug!("Rejected access token: {}", error))
            .ok()
        })
        .ok_or_else(|| {
          actix_web::error::ErrorUnauthorized("Invalid Authorization header")
        }),
    )
  }
}

fn find_auth_user(
  config: &Config,
  token: &str,
) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
  decode::<AccessTokenClaims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::default(),
  )
  .map(|token| token.claims)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::helpers::tests::create_fake_access_token;
  use crate::shared::account_type::AccountType;
  use actix_web::test::TestRequest;

  fn config(jwt_secret: &str) -> Config {
    Config {
      jwt_secret: String::from(jwt_secret),
      ..Config::default()
    }
  }

  #[actix_web::test]
  async fn test_valid_token_extracts_claims() {
    let token = create_fake_access_token("secret", "d1", AccountType::Driver);
    let (req, mut payload) = TestRequest::default()
      .app_data(Data::new(config("secret")))
      .insert_header(("Authorization", format!("Bearer {}", token)))
      .to_http_parts();

    let claims = AccessTokenClaims::from_request(&req, &mut payload)
      .await
      .unwrap();

    assert_eq!(claims.uid, "d1");
    assert!(claims.is_driver());
  }

  #[actix_web::test]
  async fn test_token_signed_with_other_secret_rejected() {
    let token = create_fake_access_token("other", "d1", AccountType::Driver);
    let (req, mut payload) = TestRequest::default()
      .app_data(Data::new(config("secret")))
      .insert_header(("Authorization", format!("Bearer {}", token)))
      .to_http_parts();

    assert!(AccessTokenClaims::from_request(&req, &mut payload)
      .await
      .is_err());
  }
}
