//! Tests for the proposal service.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::canvas::Card;
use crate::domain::ports::{MockCanvasRepository, MockItineraryRepository, MockProposalRepository};
use crate::domain::proposals::{ProposalOrigin, ScheduleEntry};
use crate::test_support::{card, connection, date, proposal, timed_card};

type TestService =
    ProposalService<MockCanvasRepository, MockProposalRepository, MockItineraryRepository>;

fn service(
    canvas: MockCanvasRepository,
    proposals: MockProposalRepository,
    itinerary: MockItineraryRepository,
) -> TestService {
    ProposalService::new(Arc::new(canvas), Arc::new(proposals), Arc::new(itinerary))
}

fn trip(start: Option<NaiveDate>) -> Trip {
    Trip {
        id: TripId::random(),
        start_date: start,
        status: "draft".to_owned(),
    }
}

fn itinerary_with(trip: &Trip) -> MockItineraryRepository {
    let found = trip.clone();
    let mut itinerary = MockItineraryRepository::new();
    itinerary
        .expect_find_trip()
        .return_once(move |_| Ok(Some(found)));
    itinerary
}

fn canvas_with(snapshot: CanvasSnapshot) -> MockCanvasRepository {
    let mut canvas = MockCanvasRepository::new();
    canvas
        .expect_load_canvas()
        .returning(move |_| Ok(snapshot.clone()));
    canvas
}

fn chain(trip_id: TripId) -> (Vec<Card>, CanvasSnapshot) {
    let cards = vec![
        timed_card(trip_id, "c1", (9, 0), 10.0),
        timed_card(trip_id, "c2", (11, 0), 15.0),
        card(trip_id, "c3"),
    ];
    let snapshot = CanvasSnapshot {
        connections: vec![
            connection(trip_id, &cards[0], &cards[1]),
            connection(trip_id, &cards[1], &cards[2]),
        ],
        cards: cards.clone(),
    };
    (cards, snapshot)
}

#[tokio::test]
async fn detect_replaces_detected_proposals_with_fresh_plan() {
    let trip = trip(None);
    let (cards, snapshot) = chain(trip.id);
    let stored = proposal(trip.id, &[&cards[0], &cards[1], &cards[2]], None);
    let stored_id = stored.id;

    let mut proposals = MockProposalRepository::new();
    let expected_cards: Vec<_> = cards.iter().map(|c| c.id).collect();
    proposals
        .expect_replace_detected()
        .times(1)
        .withf(move |_, planned| {
            planned.len() == 1
                && planned[0].name.as_ref() == "Proposal A"
                && planned[0].card_ids == expected_cards
                && planned[0].connection_ids.len() == 2
        })
        .return_once(move |_, _| Ok(vec![stored]));
    proposals
        .expect_store_metrics()
        .times(1)
        .withf(move |metrics| metrics.len() == 1 && metrics[0].0 == stored_id)
        .return_once(|_| Ok(()));

    let service = service(canvas_with(snapshot), proposals, itinerary_with(&trip));
    let detected = service.detect(trip.id).await.expect("detection succeeds");

    assert_eq!(detected.len(), 1);
    assert_eq!(detected[0].metrics.total_budget, 25.0);
    assert_eq!(detected[0].metrics.activity_count, 3);
}

#[tokio::test]
async fn detect_rejects_unknown_trip() {
    let mut itinerary = MockItineraryRepository::new();
    itinerary.expect_find_trip().return_once(|_| Ok(None));
    let mut canvas = MockCanvasRepository::new();
    canvas.expect_load_canvas().times(0);

    let service = service(canvas, MockProposalRepository::new(), itinerary);
    let err = service
        .detect(TripId::random())
        .await
        .expect_err("unknown trip");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_recomputes_and_stores_metrics() {
    let trip = trip(None);
    let (cards, mut snapshot) = chain(trip.id);
    let listed = proposal(trip.id, &[&cards[0], &cards[1]], None);
    snapshot.connections[0].proposal_id = Some(listed.id);
    snapshot.connections[0].distance_km = Some(4.5);

    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_list_for_trip()
        .return_once(move |_| Ok(vec![listed]));
    proposals
        .expect_store_metrics()
        .times(1)
        .withf(|metrics| metrics[0].1.total_distance == 4.5 && metrics[0].1.total_budget == 25.0)
        .return_once(|_| Ok(()));

    let service = service(canvas_with(snapshot), proposals, itinerary_with(&trip));
    let listed = service.list(trip.id).await.expect("list succeeds");

    assert_eq!(listed[0].metrics.total_distance, 4.5);
    assert_eq!(listed[0].metrics.activity_count, 2);
}

#[tokio::test]
async fn list_of_empty_trip_skips_canvas() {
    let trip = trip(None);
    let mut proposals = MockProposalRepository::new();
    proposals.expect_list_for_trip().return_once(|_| Ok(Vec::new()));
    proposals.expect_store_metrics().times(0);
    let mut canvas = MockCanvasRepository::new();
    canvas.expect_load_canvas().times(0);

    let service = service(canvas, proposals, itinerary_with(&trip));
    assert!(service.list(trip.id).await.expect("list succeeds").is_empty());
}

#[tokio::test]
async fn create_validates_before_storing() {
    let mut proposals = MockProposalRepository::new();
    proposals.expect_create().times(0);

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .create(CreateProposalRequest {
            trip_id: TripId::random(),
            name: "   ".to_owned(),
            color: None,
        })
        .await
        .expect_err("blank name");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_maps_missing_trip_to_not_found() {
    let trip_id = TripId::random();
    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_create()
        .withf(|new| new.name.as_ref() == "Rainy day")
        .return_once(move |_| Err(ProposalRepositoryError::trip_not_found(trip_id)));

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .create(CreateProposalRequest {
            trip_id,
            name: "Rainy day".to_owned(),
            color: Some("#EC4899".to_owned()),
        })
        .await
        .expect_err("missing trip");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let mut proposals = MockProposalRepository::new();
    proposals.expect_update().times(0);

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .update(UpdateProposalRequest {
            proposal_id: ProposalId::random(),
            name: None,
            color: None,
            date: None,
        })
        .await
        .expect_err("nothing to update");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(ProposalRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(ProposalRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[case(ProposalRepositoryError::proposal_not_found(ProposalId::random()), ErrorCode::NotFound)]
#[case(ProposalRepositoryError::card_not_found(CardId::random()), ErrorCode::NotFound)]
#[case(ProposalRepositoryError::duplicate_membership(CardId::random()), ErrorCode::Conflict)]
#[case(ProposalRepositoryError::not_a_member(CardId::random()), ErrorCode::InvalidRequest)]
#[tokio::test]
async fn add_activity_maps_repository_errors(
    #[case] failure: ProposalRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_add_activity()
        .return_once(move |_| Err(failure));

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .add_activity(AddProposalActivityRequest {
            proposal_id: ProposalId::random(),
            card_id: CardId::random(),
            day_number: Some(1),
        })
        .await
        .expect_err("repository failure");

    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn add_activity_rejects_day_zero() {
    let mut proposals = MockProposalRepository::new();
    proposals.expect_add_activity().times(0);

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .add_activity(AddProposalActivityRequest {
            proposal_id: ProposalId::random(),
            card_id: CardId::random(),
            day_number: Some(0),
        })
        .await
        .expect_err("day zero");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn removing_a_non_member_is_not_found() {
    let card_id = CardId::random();
    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_remove_activity()
        .return_once(move |_, _| Err(ProposalRepositoryError::membership_not_found(card_id)));

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .remove_activity(ProposalId::random(), card_id)
        .await
        .expect_err("no membership");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn invalid_schedule_never_reaches_storage() {
    let mut proposals = MockProposalRepository::new();
    proposals.expect_assign_schedule().times(0);
    let bad = CardId::random();

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .assign_schedule(AssignScheduleRequest {
            proposal_id: ProposalId::random(),
            entries: vec![
                ScheduleEntry {
                    card_id: CardId::random(),
                    day_number: 1,
                    order_in_day: 0,
                },
                ScheduleEntry {
                    card_id: bad,
                    day_number: 0,
                    order_in_day: 1,
                },
            ],
        })
        .await
        .expect_err("day zero");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["code"], "day_out_of_range");
    assert_eq!(details["value"], bad.to_string());
}

#[tokio::test]
async fn schedule_for_non_member_aborts_with_invalid_request() {
    let stray = CardId::random();
    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_assign_schedule()
        .times(1)
        .return_once(move |_, _| Err(ProposalRepositoryError::not_a_member(stray)));

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let err = service
        .assign_schedule(AssignScheduleRequest {
            proposal_id: ProposalId::random(),
            entries: vec![ScheduleEntry {
                card_id: stray,
                day_number: 2,
                order_in_day: 0,
            }],
        })
        .await
        .expect_err("not a member");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(err.message().contains(&stray.to_string()));
}

#[tokio::test]
async fn convert_applies_plan_for_computed_day() {
    let trip = trip(Some(date(2024, 5, 1)));
    let (cards, snapshot) = chain(trip.id);
    let subject = proposal(
        trip.id,
        &[&cards[0], &cards[1], &cards[2]],
        Some(date(2024, 5, 3)),
    );
    let subject_id = subject.id;
    let found = subject.clone();
    let mut promoted = subject;
    promoted.is_official = true;

    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    let mut itinerary = itinerary_with(&trip);
    itinerary
        .expect_apply_conversion()
        .times(1)
        .withf(move |plan| {
            plan.proposal_id == subject_id
                && plan.day_number == 3
                && plan.date == date(2024, 5, 3)
                && plan.activities.len() == 3
                && plan.transport_legs.len() == 2
        })
        .return_once(move |_| Ok(promoted));

    let service = service(canvas_with(snapshot), proposals, itinerary);
    let result = service
        .convert(ConvertProposalRequest {
            trip_id: trip.id,
            proposal_id: subject_id,
        })
        .await
        .expect("conversion succeeds");

    assert!(result.is_official);
}

#[rstest]
#[case(Some(date(2024, 5, 1)), None, "missing", "proposalDate")]
#[case(None, Some(date(2024, 5, 3)), "missing", "tripStartDate")]
#[case(Some(date(2024, 5, 1)), Some(date(2024, 4, 28)), "reason", "proposalDateBeforeTripStart")]
#[tokio::test]
async fn convert_reports_distinct_preconditions(
    #[case] trip_start: Option<NaiveDate>,
    #[case] proposal_date: Option<NaiveDate>,
    #[case] key: &str,
    #[case] value: &str,
) {
    let trip = trip(trip_start);
    let (cards, snapshot) = chain(trip.id);
    let subject = proposal(trip.id, &[&cards[0]], proposal_date);
    let subject_id = subject.id;

    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(subject)));
    let mut itinerary = itinerary_with(&trip);
    itinerary.expect_apply_conversion().times(0);

    let service = service(canvas_with(snapshot), proposals, itinerary);
    let err = service
        .convert(ConvertProposalRequest {
            trip_id: trip.id,
            proposal_id: subject_id,
        })
        .await
        .expect_err("precondition fails");

    assert_eq!(err.code(), ErrorCode::PreconditionFailed);
    assert_eq!(err.details().expect("details")[key], value);
}

#[tokio::test]
async fn convert_rejects_proposal_from_another_trip() {
    let trip = trip(Some(date(2024, 5, 1)));
    let foreign = proposal(TripId::random(), &[], Some(date(2024, 5, 1)));
    let foreign_id = foreign.id;

    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(foreign)));
    let mut canvas = MockCanvasRepository::new();
    canvas.expect_load_canvas().times(0);

    let service = service(canvas, proposals, itinerary_with(&trip));
    let err = service
        .convert(ConvertProposalRequest {
            trip_id: trip.id,
            proposal_id: foreign_id,
        })
        .await
        .expect_err("wrong trip");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn convert_surfaces_storage_outage() {
    let trip = trip(Some(date(2024, 5, 1)));
    let (cards, snapshot) = chain(trip.id);
    let subject = proposal(trip.id, &[&cards[0]], Some(date(2024, 5, 1)));
    let subject_id = subject.id;

    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(subject)));
    let mut itinerary = itinerary_with(&trip);
    itinerary
        .expect_apply_conversion()
        .return_once(|_| Err(ItineraryRepositoryError::connection("pool timed out")));

    let service = service(canvas_with(snapshot), proposals, itinerary);
    let err = service
        .convert(ConvertProposalRequest {
            trip_id: trip.id,
            proposal_id: subject_id,
        })
        .await
        .expect_err("outage");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn get_returns_stored_proposal() {
    let trip_id = TripId::random();
    let mut stored = proposal(trip_id, &[], None);
    stored.origin = ProposalOrigin::Manual;
    let id = stored.id;

    let mut proposals = MockProposalRepository::new();
    proposals
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));

    let service = service(
        MockCanvasRepository::new(),
        proposals,
        MockItineraryRepository::new(),
    );
    let fetched = service.get(id).await.expect("get succeeds");

    assert_eq!(fetched.id, id);
    assert_eq!(fetched.origin, ProposalOrigin::Manual);
}
