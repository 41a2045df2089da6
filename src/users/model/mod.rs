pub mod access_token_claims;
pub mod user;
