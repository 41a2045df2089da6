pub mod location_rto;
