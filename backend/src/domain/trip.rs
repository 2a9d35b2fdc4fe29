//! Trip read model used by the proposal converter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::TripId;

/// Status a trip moves to once a proposal has been converted.
pub const TRIP_STATUS_PLANNING: &str = "planning";

/// The slice of a trip the proposal core reads.
///
/// Trips are owned by the trip CRUD layer; `status` is kept as stored text
/// so statuses this crate does not know about survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub start_date: Option<NaiveDate>,
    pub status: String,
}
