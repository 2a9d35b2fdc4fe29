//! Planning the promotion of a proposal into the canonical itinerary.
//!
//! [`plan_conversion`] is pure: it validates preconditions, computes the
//! trip-relative day and builds every record the itinerary store must write.
//! The persistence adapter then applies the plan inside one transaction.

use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::canvas::{ActivityType, CanvasSnapshot, Card, TransportMode};
use crate::domain::trip::Trip;
use crate::domain::{CardId, ConnectionId, ItineraryActivityId, ProposalId, TripId};

use super::{Proposal, ProposalActivity};

/// Preconditions that stop a conversion before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("proposal has no assigned date")]
    MissingProposalDate,
    #[error("trip has no start date")]
    MissingTripStartDate,
    #[error("proposal date {date} is before the trip start date {trip_start}")]
    DateBeforeTripStart {
        date: NaiveDate,
        trip_start: NaiveDate,
    },
    #[error("day {day_number} is outside the supported range")]
    DayOutOfRange { day_number: i64 },
    #[error("card {card_id} is no longer on the canvas")]
    MissingCard { card_id: CardId },
}

/// Trip-relative day number of `date`; the trip's start date is day 1.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use trip_canvas::domain::proposals::day_number_for;
///
/// let start = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
/// let date = NaiveDate::from_ymd_opt(2024, 5, 3).expect("valid date");
/// assert_eq!(day_number_for(start, date), 3);
/// assert_eq!(day_number_for(start, start.pred_opt().expect("valid date")), 0);
/// ```
pub fn day_number_for(trip_start: NaiveDate, date: NaiveDate) -> i64 {
    (date - trip_start).num_days() + 1
}

/// A canonical itinerary activity to create from a canvas card.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryActivityDraft {
    pub id: ItineraryActivityId,
    pub trip_id: TripId,
    pub day_number: i32,
    pub order_in_day: i32,
    pub title: String,
    pub category: ActivityType,
    pub location: Option<String>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub cost: Option<f64>,
    pub budget_category: Option<String>,
    pub memo: Option<String>,
    pub is_completed: bool,
    pub source_card_id: CardId,
    pub from_canvas: bool,
}

/// A participant attached to a new itinerary activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityParticipantDraft {
    pub activity_id: ItineraryActivityId,
    pub participant_id: Uuid,
}

/// A transport leg derived from a canvas connection.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportLegDraft {
    pub id: Uuid,
    /// The new activity created for the connection's target card.
    pub activity_id: ItineraryActivityId,
    pub source_connection_id: ConnectionId,
    pub mode: TransportMode,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub cost: Option<f64>,
    pub route: Option<Value>,
    pub is_auto_derived: bool,
}

/// Everything one conversion writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryConversion {
    pub trip_id: TripId,
    pub proposal_id: ProposalId,
    /// Proposal date; other official proposals on this date are demoted.
    pub date: NaiveDate,
    /// Day whose existing itinerary activities are replaced.
    pub day_number: i32,
    pub activities: Vec<ItineraryActivityDraft>,
    pub participants: Vec<ActivityParticipantDraft>,
    pub transport_legs: Vec<TransportLegDraft>,
}

/// Build the conversion plan for `proposal`.
///
/// Memberships are materialised in `(day, order, position)` order, where a
/// membership without a day uses the computed day and one without an order
/// uses 0. Card times are anchored to the calendar date of the activity's
/// own day.
pub fn plan_conversion(
    trip: &Trip,
    proposal: &Proposal,
    canvas: &CanvasSnapshot,
) -> Result<ItineraryConversion, ConversionError> {
    let date = proposal.date.ok_or(ConversionError::MissingProposalDate)?;
    let trip_start = trip
        .start_date
        .ok_or(ConversionError::MissingTripStartDate)?;
    let raw_day = day_number_for(trip_start, date);
    if raw_day < 1 {
        return Err(ConversionError::DateBeforeTripStart { date, trip_start });
    }
    let day_number = i32::try_from(raw_day)
        .map_err(|_| ConversionError::DayOutOfRange { day_number: raw_day })?;

    let mut memberships: Vec<&ProposalActivity> = proposal.activities.iter().collect();
    memberships.sort_by_key(|m| {
        (
            m.day_number.unwrap_or(day_number),
            m.order_in_day.unwrap_or(0),
            m.position,
        )
    });

    let mut activities = Vec::with_capacity(memberships.len());
    let mut participants = Vec::new();
    let mut activity_for_card: HashMap<CardId, ItineraryActivityId> = HashMap::new();

    for membership in memberships {
        let card = canvas
            .card(&membership.card_id)
            .ok_or(ConversionError::MissingCard {
                card_id: membership.card_id,
            })?;
        let effective_day = membership.day_number.unwrap_or(day_number);
        let calendar_date = calendar_date_of(trip_start, effective_day)?;
        let draft = activity_draft(
            trip.id,
            card,
            effective_day,
            membership.order_in_day.unwrap_or(0),
            calendar_date,
        );
        participants.extend(participant_drafts(draft.id, card));
        activity_for_card.insert(card.id, draft.id);
        activities.push(draft);
    }

    let transport_legs = canvas
        .connections
        .iter()
        .filter_map(|conn| {
            let activity_id = *activity_for_card.get(&conn.target_card_id)?;
            Some(TransportLegDraft {
                id: Uuid::new_v4(),
                activity_id,
                source_connection_id: conn.id,
                mode: conn.transport_mode.unwrap_or_default(),
                duration_minutes: conn.duration_minutes,
                distance_km: conn.distance_km,
                cost: conn.cost,
                route: conn.route.clone(),
                is_auto_derived: true,
            })
        })
        .collect();

    Ok(ItineraryConversion {
        trip_id: trip.id,
        proposal_id: proposal.id,
        date,
        day_number,
        activities,
        participants,
        transport_legs,
    })
}

fn calendar_date_of(trip_start: NaiveDate, day: i32) -> Result<NaiveDate, ConversionError> {
    let out_of_range = || ConversionError::DayOutOfRange {
        day_number: i64::from(day),
    };
    let offset = u64::try_from(i64::from(day) - 1).map_err(|_| out_of_range())?;
    trip_start
        .checked_add_days(Days::new(offset))
        .ok_or_else(out_of_range)
}

fn activity_draft(
    trip_id: TripId,
    card: &Card,
    day_number: i32,
    order_in_day: i32,
    calendar_date: NaiveDate,
) -> ItineraryActivityDraft {
    let anchor = |time: Option<NaiveTime>| time.map(|t| calendar_date.and_time(t));
    ItineraryActivityDraft {
        id: ItineraryActivityId::random(),
        trip_id,
        day_number,
        order_in_day,
        title: card.title.clone(),
        category: card.activity_type,
        location: card.display_location().map(str::to_owned),
        start_at: anchor(card.start_time),
        end_at: anchor(card.end_time),
        cost: card.cost,
        budget_category: card.budget_category.clone(),
        memo: card.memo.clone(),
        is_completed: card.is_completed,
        source_card_id: card.id,
        from_canvas: true,
    }
}

fn participant_drafts(
    activity_id: ItineraryActivityId,
    card: &Card,
) -> impl Iterator<Item = ActivityParticipantDraft> + '_ {
    let mut seen = HashSet::new();
    card.participants
        .iter()
        .filter(move |id| seen.insert(**id))
        .map(move |&participant_id| ActivityParticipantDraft {
            activity_id,
            participant_id,
        })
}

#[cfg(test)]
#[path = "conversion_tests.rs"]
mod tests;
