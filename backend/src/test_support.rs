//! Test utilities for the crate.
//!
//! Builders for canvas cards, connections and proposals shared by the domain,
//! persistence and HTTP unit tests. Only compiled when running tests.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::domain::canvas::{ActivityType, CanvasPosition, Card, Connection};
use crate::domain::proposals::{
    Proposal, ProposalActivity, ProposalColor, ProposalMetrics, ProposalName, ProposalOrigin,
};
use crate::domain::{CardId, ConnectionId, ProposalActivityId, ProposalId, TripId};

/// A card with only the fields detection cares about filled in.
pub fn card(trip_id: TripId, title: &str) -> Card {
    Card {
        id: CardId::random(),
        trip_id,
        position: CanvasPosition { x: 0.0, y: 0.0 },
        title: title.to_owned(),
        activity_type: ActivityType::Sightseeing,
        location: None,
        custom_location: None,
        start_time: None,
        end_time: None,
        cost: None,
        budget_category: None,
        memo: None,
        participants: Vec::new(),
        is_completed: false,
        is_collapsed: false,
    }
}

/// A card with a time window and cost, as the converter sees it.
pub fn timed_card(trip_id: TripId, title: &str, start: (u32, u32), cost: f64) -> Card {
    Card {
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0),
        end_time: NaiveTime::from_hms_opt(start.0 + 1, start.1, 0),
        cost: Some(cost),
        ..card(trip_id, title)
    }
}

/// A bare connection from `source` to `target`.
pub fn connection(trip_id: TripId, source: &Card, target: &Card) -> Connection {
    Connection {
        id: ConnectionId::random(),
        trip_id,
        source_card_id: source.id,
        target_card_id: target.id,
        transport_mode: None,
        duration_minutes: None,
        distance_km: None,
        cost: None,
        route: None,
        proposal_id: None,
    }
}

/// A detected proposal holding `cards` in order, unscheduled.
pub fn proposal(trip_id: TripId, cards: &[&Card], date: Option<NaiveDate>) -> Proposal {
    let id = ProposalId::random();
    let activities = cards
        .iter()
        .zip(0_i32..)
        .map(|(card, position)| ProposalActivity {
            id: ProposalActivityId::random(),
            proposal_id: id,
            card_id: card.id,
            day_number: None,
            order_in_day: None,
            position,
        })
        .collect::<Vec<_>>();
    Proposal {
        id,
        trip_id,
        name: ProposalName::new("Proposal A").unwrap_or_else(|err| panic!("{err}")),
        color: ProposalColor::default_manual(),
        origin: ProposalOrigin::Detected,
        start_card_id: cards.first().map(|card| card.id),
        is_official: false,
        date,
        metrics: ProposalMetrics {
            activity_count: activities.len(),
            ..ProposalMetrics::default()
        },
        activities,
    }
}

/// A calendar date, panicking on invalid input.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}

/// A fresh participant identifier.
pub fn participant() -> Uuid {
    Uuid::new_v4()
}
