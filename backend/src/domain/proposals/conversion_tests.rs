//! Tests for conversion planning.

use chrono::NaiveTime;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::trip::Trip;
use crate::test_support::{card, connection, date, participant, proposal, timed_card};

fn trip_starting(start: Option<NaiveDate>) -> Trip {
    Trip {
        id: TripId::random(),
        start_date: start,
        status: "draft".to_owned(),
    }
}

struct Scenario {
    trip: Trip,
    cards: Vec<Card>,
    canvas: CanvasSnapshot,
}

/// Trip starting 2024-05-01 with the chain c1 -> c2 -> c3 on its canvas.
#[fixture]
fn scenario() -> Scenario {
    let trip = trip_starting(Some(date(2024, 5, 1)));
    let c1 = timed_card(trip.id, "c1", (9, 0), 10.0);
    let c2 = timed_card(trip.id, "c2", (12, 30), 20.0);
    let c3 = card(trip.id, "c3");
    let canvas = CanvasSnapshot {
        connections: vec![
            connection(trip.id, &c1, &c2),
            connection(trip.id, &c2, &c3),
        ],
        cards: vec![c1.clone(), c2.clone(), c3.clone()],
    };
    Scenario {
        trip,
        cards: vec![c1, c2, c3],
        canvas,
    }
}

#[rstest]
#[case(date(2024, 5, 1), 1)]
#[case(date(2024, 5, 2), 2)]
#[case(date(2024, 4, 30), 0)]
#[case(date(2024, 6, 1), 32)]
fn day_arithmetic(#[case] on: NaiveDate, #[case] expected: i64) {
    assert_eq!(day_number_for(date(2024, 5, 1), on), expected);
}

#[rstest]
fn example_scenario_converts_to_day_three_in_card_order(scenario: Scenario) {
    let refs: Vec<&Card> = scenario.cards.iter().collect();
    let subject = proposal(scenario.trip.id, &refs, Some(date(2024, 5, 3)));

    let plan = plan_conversion(&scenario.trip, &subject, &scenario.canvas).expect("plan");

    assert_eq!(plan.day_number, 3);
    assert_eq!(plan.date, date(2024, 5, 3));
    assert_eq!(plan.activities.len(), subject.activities.len());
    let titles: Vec<_> = plan.activities.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["c1", "c2", "c3"]);
    assert!(plan.activities.iter().all(|a| a.day_number == 3));
    assert!(plan.activities.iter().all(|a| a.order_in_day == 0));
    assert!(plan.activities.iter().all(|a| a.from_canvas));
}

#[rstest]
fn times_anchor_to_the_itinerary_day(scenario: Scenario) {
    let refs: Vec<&Card> = scenario.cards.iter().collect();
    let subject = proposal(scenario.trip.id, &refs, Some(date(2024, 5, 3)));

    let plan = plan_conversion(&scenario.trip, &subject, &scenario.canvas).expect("plan");

    let first = &plan.activities[0];
    let nine = NaiveTime::from_hms_opt(9, 0, 0).expect("valid time");
    assert_eq!(first.start_at, Some(date(2024, 5, 3).and_time(nine)));
    assert_eq!(
        first.end_at.map(|at| at.time()),
        NaiveTime::from_hms_opt(10, 0, 0)
    );
    assert_eq!(plan.activities[2].start_at, None);
}

#[rstest]
fn explicit_schedule_overrides_membership_order(scenario: Scenario) {
    let refs: Vec<&Card> = scenario.cards.iter().collect();
    let mut subject = proposal(scenario.trip.id, &refs, Some(date(2024, 5, 1)));
    subject.activities[0].order_in_day = Some(5);
    subject.activities[1].order_in_day = Some(1);
    subject.activities[2].day_number = Some(2);

    let plan = plan_conversion(&scenario.trip, &subject, &scenario.canvas).expect("plan");

    let slots: Vec<_> = plan
        .activities
        .iter()
        .map(|a| (a.title.as_str(), a.day_number, a.order_in_day))
        .collect();
    assert_eq!(slots, [("c2", 1, 1), ("c1", 1, 5), ("c3", 2, 0)]);
    assert_eq!(
        plan.activities[2].start_at.map(|at| at.date()),
        None,
        "c3 carries no times"
    );
}

#[rstest]
fn later_scheduled_day_shifts_anchor_date(scenario: Scenario) {
    let c1 = &scenario.cards[0];
    let mut subject = proposal(scenario.trip.id, &[c1], Some(date(2024, 5, 1)));
    subject.activities[0].day_number = Some(4);

    let plan = plan_conversion(&scenario.trip, &subject, &scenario.canvas).expect("plan");

    assert_eq!(plan.day_number, 1);
    assert_eq!(
        plan.activities[0].start_at.map(|at| at.date()),
        Some(date(2024, 5, 4))
    );
}

#[rstest]
fn transport_legs_follow_converted_targets(scenario: Scenario) {
    let refs: Vec<&Card> = scenario.cards.iter().collect();
    let subject = proposal(scenario.trip.id, &refs, Some(date(2024, 5, 3)));

    let plan = plan_conversion(&scenario.trip, &subject, &scenario.canvas).expect("plan");

    assert_eq!(plan.transport_legs.len(), 2);
    let c2_activity = plan.activities[1].id;
    let leg = &plan.transport_legs[0];
    assert_eq!(leg.activity_id, c2_activity);
    assert_eq!(leg.source_connection_id, scenario.canvas.connections[0].id);
    assert_eq!(leg.mode, TransportMode::Other);
    assert!(leg.is_auto_derived);
}

#[rstest]
fn connections_into_unconverted_cards_are_skipped(scenario: Scenario) {
    let subject = proposal(
        scenario.trip.id,
        &[&scenario.cards[0]],
        Some(date(2024, 5, 3)),
    );

    let plan = plan_conversion(&scenario.trip, &subject, &scenario.canvas).expect("plan");

    assert!(plan.transport_legs.is_empty());
}

#[rstest]
fn participants_are_deduplicated_per_activity() {
    let trip = trip_starting(Some(date(2024, 5, 1)));
    let (alice, bob) = (participant(), participant());
    let mut shared = card(trip.id, "shared");
    shared.participants = vec![alice, bob, alice];
    let canvas = CanvasSnapshot {
        cards: vec![shared.clone()],
        connections: Vec::new(),
    };
    let subject = proposal(trip.id, &[&shared], Some(date(2024, 5, 1)));

    let plan = plan_conversion(&trip, &subject, &canvas).expect("plan");

    let ids: Vec<_> = plan.participants.iter().map(|p| p.participant_id).collect();
    assert_eq!(ids, [alice, bob]);
    assert!(
        plan.participants
            .iter()
            .all(|p| p.activity_id == plan.activities[0].id)
    );
}

#[rstest]
fn missing_proposal_date_is_reported(scenario: Scenario) {
    let subject = proposal(scenario.trip.id, &[&scenario.cards[0]], None);
    assert_eq!(
        plan_conversion(&scenario.trip, &subject, &scenario.canvas),
        Err(ConversionError::MissingProposalDate)
    );
}

#[rstest]
fn missing_trip_start_is_reported(scenario: Scenario) {
    let trip = trip_starting(None);
    let subject = proposal(trip.id, &[&scenario.cards[0]], Some(date(2024, 5, 3)));
    assert_eq!(
        plan_conversion(&trip, &subject, &scenario.canvas),
        Err(ConversionError::MissingTripStartDate)
    );
}

#[rstest]
fn dates_before_the_trip_are_rejected(scenario: Scenario) {
    let subject = proposal(
        scenario.trip.id,
        &[&scenario.cards[0]],
        Some(date(2024, 4, 30)),
    );
    assert_eq!(
        plan_conversion(&scenario.trip, &subject, &scenario.canvas),
        Err(ConversionError::DateBeforeTripStart {
            date: date(2024, 4, 30),
            trip_start: date(2024, 5, 1),
        })
    );
}

#[rstest]
fn deleted_cards_abort_the_plan(scenario: Scenario) {
    let ghost = card(scenario.trip.id, "ghost");
    let subject = proposal(scenario.trip.id, &[&ghost], Some(date(2024, 5, 3)));
    assert_eq!(
        plan_conversion(&scenario.trip, &subject, &scenario.canvas),
        Err(ConversionError::MissingCard { card_id: ghost.id })
    );
}
