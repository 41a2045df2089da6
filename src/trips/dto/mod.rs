pub mod create_trip_dto;
pub mod get_trip_dto;
pub mod trip_action_dto;
