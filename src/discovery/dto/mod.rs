pub mod nearby_drivers_dto;
