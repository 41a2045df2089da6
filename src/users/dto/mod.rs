pub mod create_user_dto;
pub mod get_user_dto;
