//! Proposal domain service.
//!
//! Implements the proposal driving ports on top of the canvas, proposal and
//! itinerary repositories. Graph detection and conversion planning are pure
//! functions in [`crate::domain::proposals`]; this service loads their inputs,
//! maps failures into [`Error`] and hands the resulting plans to storage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::canvas::CanvasSnapshot;
use crate::domain::ports::{
    AddProposalActivityRequest, AssignScheduleRequest, CanvasRepository, CanvasRepositoryError,
    ConvertProposalRequest, CreateProposalRequest, ItineraryRepository, ItineraryRepositoryError,
    ProposalCommand, ProposalQuery, ProposalRepository, ProposalRepositoryError,
    UpdateProposalRequest,
};
use crate::domain::proposals::{
    ConversionError, NewProposalActivity, Proposal, ProposalActivity, ProposalMetrics,
    ScheduleValidationError, plan_conversion, plan_detected_proposals, validate_schedule,
};
use crate::domain::trip::Trip;
use crate::domain::{CardId, Error, ProposalActivityId, ProposalId, TripId};

fn map_canvas_error(error: CanvasRepositoryError) -> Error {
    debug!(%error, "canvas repository call failed");
    match error {
        CanvasRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("canvas repository unavailable: {message}"))
        }
        CanvasRepositoryError::Query { message } => {
            Error::internal(format!("canvas repository error: {message}"))
        }
    }
}

fn map_proposal_error(error: ProposalRepositoryError) -> Error {
    debug!(%error, "proposal repository call failed");
    let message = error.to_string();
    match error {
        ProposalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("proposal repository unavailable: {message}"))
        }
        ProposalRepositoryError::Query { message } => {
            Error::internal(format!("proposal repository error: {message}"))
        }
        ProposalRepositoryError::ProposalNotFound { .. }
        | ProposalRepositoryError::TripNotFound { .. } => Error::not_found(message),
        ProposalRepositoryError::MembershipNotFound { card_id } => {
            Error::not_found(message).with_details(json!({ "cardId": card_id }))
        }
        ProposalRepositoryError::CardNotFound { card_id } => {
            Error::not_found(message).with_details(json!({ "cardId": card_id }))
        }
        ProposalRepositoryError::NotAMember { card_id } => Error::invalid_request(message)
            .with_details(json!({ "field": "cardId", "value": card_id, "code": "not_a_member" })),
        ProposalRepositoryError::DuplicateMembership { card_id } => {
            Error::conflict(message).with_details(json!({ "cardId": card_id }))
        }
    }
}

fn map_itinerary_error(error: ItineraryRepositoryError) -> Error {
    debug!(%error, "itinerary repository call failed");
    match error {
        ItineraryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("itinerary repository unavailable: {message}"))
        }
        ItineraryRepositoryError::Query { message } => {
            Error::internal(format!("itinerary repository error: {message}"))
        }
        not_found @ ItineraryRepositoryError::ProposalNotFound { .. } => {
            Error::not_found(not_found.to_string())
        }
    }
}

fn map_conversion_error(error: ConversionError) -> Error {
    let message = error.to_string();
    match error {
        ConversionError::MissingProposalDate => Error::precondition_failed(message)
            .with_details(json!({ "missing": "proposalDate" })),
        ConversionError::MissingTripStartDate => Error::precondition_failed(message)
            .with_details(json!({ "missing": "tripStartDate" })),
        ConversionError::DateBeforeTripStart { .. } => Error::precondition_failed(message)
            .with_details(json!({ "reason": "proposalDateBeforeTripStart" })),
        ConversionError::DayOutOfRange { .. } => Error::precondition_failed(message)
            .with_details(json!({ "reason": "dayOutOfRange" })),
        ConversionError::MissingCard { card_id } => {
            Error::not_found(message).with_details(json!({ "cardId": card_id }))
        }
    }
}

fn map_schedule_error(error: ScheduleValidationError) -> Error {
    let code = match &error {
        ScheduleValidationError::Empty => "empty_schedule",
        ScheduleValidationError::DuplicateCard { .. } => "duplicate_card",
        ScheduleValidationError::DayOutOfRange { .. } => "day_out_of_range",
        ScheduleValidationError::NegativeOrder { .. } => "negative_order",
    };
    let mut details = json!({ "field": "entries", "code": code });
    if let Some(card_id) = error.card_id() {
        details["value"] = json!(card_id);
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn proposal_missing(proposal_id: ProposalId) -> Error {
    Error::not_found(format!("proposal {proposal_id} not found"))
}

fn trip_missing(trip_id: TripId) -> Error {
    Error::not_found(format!("trip {trip_id} not found"))
}

/// Proposal service implementing the command and query driving ports.
#[derive(Clone)]
pub struct ProposalService<C, P, I> {
    canvas_repo: Arc<C>,
    proposal_repo: Arc<P>,
    itinerary_repo: Arc<I>,
}

impl<C, P, I> ProposalService<C, P, I> {
    /// Create a service over the three driven ports.
    pub fn new(canvas_repo: Arc<C>, proposal_repo: Arc<P>, itinerary_repo: Arc<I>) -> Self {
        Self {
            canvas_repo,
            proposal_repo,
            itinerary_repo,
        }
    }
}

impl<C, P, I> ProposalService<C, P, I>
where
    C: CanvasRepository,
    P: ProposalRepository,
    I: ItineraryRepository,
{
    async fn require_trip(&self, trip_id: TripId) -> Result<Trip, Error> {
        self.itinerary_repo
            .find_trip(&trip_id)
            .await
            .map_err(map_itinerary_error)?
            .ok_or_else(|| trip_missing(trip_id))
    }

    async fn require_proposal(&self, proposal_id: ProposalId) -> Result<Proposal, Error> {
        self.proposal_repo
            .find_by_id(&proposal_id)
            .await
            .map_err(map_proposal_error)?
            .ok_or_else(|| proposal_missing(proposal_id))
    }

    async fn load_canvas(&self, trip_id: TripId) -> Result<CanvasSnapshot, Error> {
        self.canvas_repo
            .load_canvas(&trip_id)
            .await
            .map_err(map_canvas_error)
    }

    /// Recompute metrics from the current canvas and write them back.
    async fn refresh_metrics(
        &self,
        trip_id: TripId,
        mut proposals: Vec<Proposal>,
    ) -> Result<Vec<Proposal>, Error> {
        if proposals.is_empty() {
            return Ok(proposals);
        }
        let canvas = self.load_canvas(trip_id).await?;
        let mut updates = Vec::with_capacity(proposals.len());
        for proposal in &mut proposals {
            proposal.metrics = ProposalMetrics::compute(proposal.id, &proposal.activities, &canvas);
            updates.push((proposal.id, proposal.metrics));
        }
        self.proposal_repo
            .store_metrics(&updates)
            .await
            .map_err(map_proposal_error)?;
        Ok(proposals)
    }
}

#[async_trait]
impl<C, P, I> ProposalCommand for ProposalService<C, P, I>
where
    C: CanvasRepository,
    P: ProposalRepository,
    I: ItineraryRepository,
{
    async fn detect(&self, trip_id: TripId) -> Result<Vec<Proposal>, Error> {
        self.require_trip(trip_id).await?;
        let canvas = self.load_canvas(trip_id).await?;
        let planned = plan_detected_proposals(trip_id, &canvas)
            .map_err(|err| Error::internal(format!("generated proposal is invalid: {err}")))?;
        let stored = self
            .proposal_repo
            .replace_detected(&trip_id, &planned)
            .await
            .map_err(map_proposal_error)?;
        info!(
            %trip_id,
            cards = canvas.cards.len(),
            proposals = stored.len(),
            "proposals detected"
        );
        self.refresh_metrics(trip_id, stored).await
    }

    async fn create(&self, request: CreateProposalRequest) -> Result<Proposal, Error> {
        let new = request.into_new_proposal()?;
        self.proposal_repo
            .create(&new)
            .await
            .map_err(map_proposal_error)
    }

    async fn update(&self, request: UpdateProposalRequest) -> Result<Proposal, Error> {
        let update = request.to_update()?;
        if update.is_empty() {
            return Err(Error::invalid_request("update must change at least one field")
                .with_details(json!({ "code": "empty_update" })));
        }
        self.proposal_repo
            .update(&request.proposal_id, &update)
            .await
            .map_err(map_proposal_error)
    }

    async fn delete(&self, proposal_id: ProposalId) -> Result<(), Error> {
        self.proposal_repo
            .delete(&proposal_id)
            .await
            .map_err(map_proposal_error)
    }

    async fn add_activity(
        &self,
        request: AddProposalActivityRequest,
    ) -> Result<ProposalActivity, Error> {
        if let Some(day) = request.day_number.filter(|day| *day < 1) {
            return Err(Error::invalid_request("dayNumber must be at least 1").with_details(
                json!({ "field": "dayNumber", "value": day, "code": "day_out_of_range" }),
            ));
        }
        let activity = NewProposalActivity {
            id: ProposalActivityId::random(),
            proposal_id: request.proposal_id,
            card_id: request.card_id,
            day_number: request.day_number,
        };
        self.proposal_repo
            .add_activity(&activity)
            .await
            .map_err(map_proposal_error)
    }

    async fn remove_activity(&self, proposal_id: ProposalId, card_id: CardId) -> Result<(), Error> {
        self.proposal_repo
            .remove_activity(&proposal_id, &card_id)
            .await
            .map_err(map_proposal_error)
    }

    async fn assign_schedule(&self, request: AssignScheduleRequest) -> Result<(), Error> {
        validate_schedule(&request.entries).map_err(map_schedule_error)?;
        self.proposal_repo
            .assign_schedule(&request.proposal_id, &request.entries)
            .await
            .map_err(map_proposal_error)
    }

    async fn convert(&self, request: ConvertProposalRequest) -> Result<Proposal, Error> {
        let trip = self.require_trip(request.trip_id).await?;
        let proposal = self.require_proposal(request.proposal_id).await?;
        if proposal.trip_id != trip.id {
            return Err(proposal_missing(request.proposal_id));
        }
        let canvas = self.load_canvas(trip.id).await?;
        let plan = plan_conversion(&trip, &proposal, &canvas).map_err(map_conversion_error)?;
        let promoted = self
            .itinerary_repo
            .apply_conversion(&plan)
            .await
            .map_err(map_itinerary_error)?;
        info!(
            trip_id = %plan.trip_id,
            proposal_id = %plan.proposal_id,
            day = plan.day_number,
            activities = plan.activities.len(),
            legs = plan.transport_legs.len(),
            "proposal converted into itinerary"
        );
        Ok(promoted)
    }
}

#[async_trait]
impl<C, P, I> ProposalQuery for ProposalService<C, P, I>
where
    C: CanvasRepository,
    P: ProposalRepository,
    I: ItineraryRepository,
{
    async fn list(&self, trip_id: TripId) -> Result<Vec<Proposal>, Error> {
        self.require_trip(trip_id).await?;
        let proposals = self
            .proposal_repo
            .list_for_trip(&trip_id)
            .await
            .map_err(map_proposal_error)?;
        self.refresh_metrics(trip_id, proposals).await
    }

    async fn get(&self, proposal_id: ProposalId) -> Result<Proposal, Error> {
        self.require_proposal(proposal_id).await
    }
}

#[cfg(test)]
#[path = "proposal_service_tests.rs"]
mod tests;
