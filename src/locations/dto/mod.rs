pub mod update_location_dto;
