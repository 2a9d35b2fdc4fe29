//! Driving port for proposal mutations.
//!
//! Inbound adapters call this port to detect, edit, schedule and convert
//! proposals without depending on persistence details.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::proposals::{
    NewProposal, Proposal, ProposalActivity, ProposalColor, ProposalName, ProposalOrigin,
    ProposalUpdate, ProposalValidationError, ScheduleEntry,
};
use crate::domain::{CardId, Error, ProposalId, TripId};

/// Request to create a manual proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub trip_id: TripId,
    pub name: String,
    pub color: Option<String>,
}

impl CreateProposalRequest {
    /// Validate the request into an insertable proposal with a fresh id.
    pub fn into_new_proposal(self) -> Result<NewProposal, Error> {
        let name = ProposalName::new(&self.name).map_err(validation_error)?;
        let color = self
            .color
            .map(ProposalColor::new)
            .transpose()
            .map_err(validation_error)?
            .unwrap_or_else(ProposalColor::default_manual);
        Ok(NewProposal {
            id: ProposalId::random(),
            trip_id: self.trip_id,
            name,
            color,
        })
    }
}

/// Partial update of a proposal. `date: Some(None)` clears the date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProposalRequest {
    pub proposal_id: ProposalId,
    pub name: Option<String>,
    pub color: Option<String>,
    pub date: Option<Option<NaiveDate>>,
}

impl UpdateProposalRequest {
    /// Validate the changed fields.
    pub fn to_update(&self) -> Result<ProposalUpdate, Error> {
        let name = self
            .name
            .as_deref()
            .map(ProposalName::new)
            .transpose()
            .map_err(validation_error)?;
        let color = self
            .color
            .as_deref()
            .map(ProposalColor::new)
            .transpose()
            .map_err(validation_error)?;
        Ok(ProposalUpdate {
            name,
            color,
            date: self.date,
        })
    }
}

/// Request to add a card to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProposalActivityRequest {
    pub proposal_id: ProposalId,
    pub card_id: CardId,
    pub day_number: Option<i32>,
}

/// Request to slot a proposal's cards into days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignScheduleRequest {
    pub proposal_id: ProposalId,
    pub entries: Vec<ScheduleEntry>,
}

/// Request to promote a proposal into the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertProposalRequest {
    pub trip_id: TripId,
    pub proposal_id: ProposalId,
}

fn validation_error(err: ProposalValidationError) -> Error {
    let (field, code) = match &err {
        ProposalValidationError::EmptyName => ("name", "empty_name"),
        ProposalValidationError::NameTooLong { .. } => ("name", "name_too_long"),
        ProposalValidationError::InvalidColor { .. } => ("color", "invalid_color"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Driving port for proposal write operations.
///
/// # Examples
///
/// ```rust,no_run
/// # use trip_canvas::domain::TripId;
/// # use trip_canvas::domain::ports::{CreateProposalRequest, FixtureProposalCommand, ProposalCommand};
/// # async fn example() -> Result<(), trip_canvas::domain::Error> {
/// let command = FixtureProposalCommand;
/// let proposal = command
///     .create(CreateProposalRequest {
///         trip_id: TripId::random(),
///         name: "Old town".to_owned(),
///         color: None,
///     })
///     .await?;
/// assert_eq!(proposal.name.as_ref(), "Old town");
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProposalCommand: Send + Sync {
    /// Re-detect the trip's proposals from its canvas, replacing earlier
    /// detected proposals.
    async fn detect(&self, trip_id: TripId) -> Result<Vec<Proposal>, Error>;

    /// Create a manual proposal.
    async fn create(&self, request: CreateProposalRequest) -> Result<Proposal, Error>;

    /// Rename, recolour or (re)date a proposal.
    async fn update(&self, request: UpdateProposalRequest) -> Result<Proposal, Error>;

    /// Delete a proposal and its memberships.
    async fn delete(&self, proposal_id: ProposalId) -> Result<(), Error>;

    /// Add a card to a proposal.
    async fn add_activity(
        &self,
        request: AddProposalActivityRequest,
    ) -> Result<ProposalActivity, Error>;

    /// Remove a card from a proposal.
    async fn remove_activity(&self, proposal_id: ProposalId, card_id: CardId)
    -> Result<(), Error>;

    /// Write a schedule batch atomically.
    async fn assign_schedule(&self, request: AssignScheduleRequest) -> Result<(), Error>;

    /// Promote a proposal into the trip's itinerary.
    async fn convert(&self, request: ConvertProposalRequest) -> Result<Proposal, Error>;
}

/// Fixture command implementation for servers running without a database.
///
/// Creation validates and echoes the proposal; every operation on an
/// existing proposal reports it as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProposalCommand;

fn fixture_missing(proposal_id: ProposalId) -> Error {
    Error::not_found(format!("proposal {proposal_id} not found"))
}

#[async_trait]
impl ProposalCommand for FixtureProposalCommand {
    async fn detect(&self, _trip_id: TripId) -> Result<Vec<Proposal>, Error> {
        Ok(Vec::new())
    }

    async fn create(&self, request: CreateProposalRequest) -> Result<Proposal, Error> {
        let new = request.into_new_proposal()?;
        Ok(Proposal {
            id: new.id,
            trip_id: new.trip_id,
            name: new.name,
            color: new.color,
            origin: ProposalOrigin::Manual,
            start_card_id: None,
            is_official: false,
            date: None,
            metrics: Default::default(),
            activities: Vec::new(),
        })
    }

    async fn update(&self, request: UpdateProposalRequest) -> Result<Proposal, Error> {
        request.to_update()?;
        Err(fixture_missing(request.proposal_id))
    }

    async fn delete(&self, proposal_id: ProposalId) -> Result<(), Error> {
        Err(fixture_missing(proposal_id))
    }

    async fn add_activity(
        &self,
        request: AddProposalActivityRequest,
    ) -> Result<ProposalActivity, Error> {
        Err(fixture_missing(request.proposal_id))
    }

    async fn remove_activity(
        &self,
        proposal_id: ProposalId,
        _card_id: CardId,
    ) -> Result<(), Error> {
        Err(fixture_missing(proposal_id))
    }

    async fn assign_schedule(&self, request: AssignScheduleRequest) -> Result<(), Error> {
        Err(fixture_missing(request.proposal_id))
    }

    async fn convert(&self, request: ConvertProposalRequest) -> Result<Proposal, Error> {
        Err(fixture_missing(request.proposal_id))
    }
}
