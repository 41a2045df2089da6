use thiserror::Error;

use crate::locations::repository::location_store::GeoLocationError;
use crate::shared::account_type::AccountType;
use crate::trips::model::trip_state::{TripAction, TripState};
use crate::trips::repository::trip_repository::TripRepositoryError;

#[derive(Debug, Error)]
pub enum TripError {
  #[error("Trip not found")]
  NotFound,

  #[error("Only a {required} can {action} a trip")]
  WrongAccountType {
    action: &'static str,
    required: AccountType,
  },

  #[error("Only the passenger who requested the trip can cancel it")]
  NotTripOwner,

  #[error("Only the driver assigned to the trip can {0} it")]
  NotAssignedDriver(TripAction),

  #[error("Only the passenger or the assigned driver can watch this trip")]
  NotTripParticipant,

  #[error("Trip was already accepted by another driver")]
  AlreadyAssigned,

  #[error("Cannot {action} a trip that is {state}")]
  IllegalTransition { state: TripState, action: TripAction },

  #[error("Invalid trip: {0}")]
  Invalid(String),

  #[error(transparent)]
  Repository(#[from] TripRepositoryError),

  #[error(transparent)]
  Location(#[from] GeoLocationError),
}

impl TripError {
  pub fn is_transient(&self) -> bool {
    matches!(self, TripError::Repository(error) if error.is_transient())
  }
}
