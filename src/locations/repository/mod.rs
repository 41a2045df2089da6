pub mod location_store;
