use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::coordinate::Coordinate;
use crate::trips::controller::LocationReport;
use crate::trips::rto::get_trip_rto::GetTripRto;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRto {
  pub uid: String,
  pub coordinate: Coordinate,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub arrived: Option<GetTripRto>,
}

impl From<LocationReport> for LocationRto {
  fn from(report: LocationReport) -> Self {
    Self {
      uid: report.location.uid,
      coordinate: report.location.coordinate,
      updated_at: report.location.updated_at,
      arrived: report.arrived.map(GetTripRto::from),
    }
  }
}
