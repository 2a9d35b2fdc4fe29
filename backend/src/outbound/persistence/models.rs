//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into domain types lives next to
//! each repository so parse failures map into that repository's error type.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    activity_participants, canvas_cards, canvas_connections, itinerary_activities,
    proposal_activities, proposals, transport_legs, trips,
};

// ---------------------------------------------------------------------------
// Trips and canvas
// ---------------------------------------------------------------------------

/// Row struct for the columns of `trips` the proposal core reads.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trips)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TripRow {
    pub id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub status: String,
}

/// Row struct for reading canvas cards.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = canvas_cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CardRow {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub position_x: f64,
    pub position_y: f64,
    pub title: String,
    pub activity_type: String,
    pub location: Option<String>,
    pub custom_location: Option<serde_json::Value>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub cost: Option<f64>,
    pub budget_category: Option<String>,
    pub memo: Option<String>,
    pub participants: Vec<Uuid>,
    pub is_completed: bool,
    pub is_collapsed: bool,
}

/// Row struct for reading canvas connections.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = canvas_connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConnectionRow {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub source_card_id: Uuid,
    pub target_card_id: Uuid,
    pub transport_mode: Option<String>,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub cost: Option<f64>,
    pub route: Option<serde_json::Value>,
    pub proposal_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

/// Row struct for reading proposals.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = proposals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProposalRow {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub color: String,
    pub origin: String,
    pub start_card_id: Option<Uuid>,
    pub is_official: bool,
    pub proposal_date: Option<NaiveDate>,
    pub total_budget: f64,
    pub activity_count: i32,
    pub total_distance: f64,
}

/// Insertable struct for new proposals.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = proposals)]
pub(crate) struct NewProposalRow<'a> {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: &'a str,
    pub color: &'a str,
    pub origin: &'a str,
    pub start_card_id: Option<Uuid>,
    pub activity_count: i32,
}

/// Changeset for partial proposal updates.
///
/// `None` leaves a column untouched; `proposal_date: Some(None)` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = proposals)]
pub(crate) struct ProposalChangeset<'a> {
    pub name: Option<&'a str>,
    pub color: Option<&'a str>,
    pub proposal_date: Option<Option<NaiveDate>>,
}

/// Row struct for reading memberships.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = proposal_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProposalActivityRow {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub card_id: Uuid,
    pub day_number: Option<i32>,
    pub order_in_day: Option<i32>,
    pub position: i32,
}

/// Insertable struct for new memberships.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = proposal_activities)]
pub(crate) struct NewProposalActivityRow {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub card_id: Uuid,
    pub day_number: Option<i32>,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Itinerary
// ---------------------------------------------------------------------------

/// Insertable struct for canonical itinerary activities.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = itinerary_activities)]
pub(crate) struct NewItineraryActivityRow<'a> {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub day_number: i32,
    pub order_in_day: i32,
    pub title: &'a str,
    pub category: &'a str,
    pub location: Option<&'a str>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub cost: Option<f64>,
    pub budget_category: Option<&'a str>,
    pub memo: Option<&'a str>,
    pub is_completed: bool,
    pub source_card_id: Option<Uuid>,
    pub from_canvas: bool,
}

/// Insertable struct for activity participants.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = activity_participants)]
pub(crate) struct NewActivityParticipantRow {
    pub activity_id: Uuid,
    pub participant_id: Uuid,
}

/// Insertable struct for transport legs.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transport_legs)]
pub(crate) struct NewTransportLegRow<'a> {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub source_connection_id: Option<Uuid>,
    pub mode: &'a str,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub cost: Option<f64>,
    pub route: Option<&'a serde_json::Value>,
    pub is_auto_derived: bool,
}
