//! Port for proposal persistence: records, memberships and cached metrics.

use async_trait::async_trait;

use crate::domain::proposals::{
    DetectedProposal, NewProposal, NewProposalActivity, Proposal, ProposalActivity,
    ProposalMetrics, ProposalUpdate, ScheduleEntry,
};
use crate::domain::{CardId, ProposalId, TripId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by proposal repository adapters.
    pub enum ProposalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "proposal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "proposal repository query failed: {message}",
        /// The proposal does not exist.
        ProposalNotFound { proposal_id: ProposalId } =>
            "proposal {proposal_id} not found",
        /// The trip does not exist.
        TripNotFound { trip_id: TripId } =>
            "trip {trip_id} not found",
        /// The card does not exist in the proposal's trip.
        CardNotFound { card_id: CardId } =>
            "card {card_id} not found in the proposal's trip",
        /// A schedule entry names a card that is not a member of the proposal.
        NotAMember { card_id: CardId } =>
            "card {card_id} is not part of the proposal",
        /// There is no membership to remove.
        MembershipNotFound { card_id: CardId } =>
            "card {card_id} is not part of the proposal",
        /// The card is already a member of the proposal.
        DuplicateMembership { card_id: CardId } =>
            "card {card_id} is already part of the proposal",
    }
}

/// Port for reading and writing proposals.
///
/// Every mutating method is atomic: adapters either apply the whole change
/// or leave storage untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// All proposals of a trip with their memberships, oldest first.
    async fn list_for_trip(&self, trip_id: &TripId)
    -> Result<Vec<Proposal>, ProposalRepositoryError>;

    /// One proposal with its memberships.
    async fn find_by_id(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<Proposal>, ProposalRepositoryError>;

    /// Insert a manual proposal.
    async fn create(&self, proposal: &NewProposal) -> Result<Proposal, ProposalRepositoryError>;

    /// Apply a partial update and return the result.
    async fn update(
        &self,
        proposal_id: &ProposalId,
        update: &ProposalUpdate,
    ) -> Result<Proposal, ProposalRepositoryError>;

    /// Delete a proposal, its memberships, and untag its connections.
    async fn delete(&self, proposal_id: &ProposalId) -> Result<(), ProposalRepositoryError>;

    /// Replace every detected proposal of a trip with `proposals`.
    ///
    /// Manual proposals are left alone. Connections listed on each detected
    /// proposal are tagged with its id.
    async fn replace_detected(
        &self,
        trip_id: &TripId,
        proposals: &[DetectedProposal],
    ) -> Result<Vec<Proposal>, ProposalRepositoryError>;

    /// Add a card to a proposal.
    async fn add_activity(
        &self,
        activity: &NewProposalActivity,
    ) -> Result<ProposalActivity, ProposalRepositoryError>;

    /// Remove a card from a proposal.
    async fn remove_activity(
        &self,
        proposal_id: &ProposalId,
        card_id: &CardId,
    ) -> Result<(), ProposalRepositoryError>;

    /// Write day and order for each entry; a card without a membership
    /// aborts the whole batch.
    async fn assign_schedule(
        &self,
        proposal_id: &ProposalId,
        entries: &[ScheduleEntry],
    ) -> Result<(), ProposalRepositoryError>;

    /// Overwrite the cached metric columns.
    async fn store_metrics(
        &self,
        metrics: &[(ProposalId, ProposalMetrics)],
    ) -> Result<(), ProposalRepositoryError>;
}

/// Fixture implementation for tests that do not exercise proposal storage.
///
/// Reads return nothing and writes targeting an existing proposal report it
/// as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProposalRepository;

#[async_trait]
impl ProposalRepository for FixtureProposalRepository {
    async fn list_for_trip(
        &self,
        _trip_id: &TripId,
    ) -> Result<Vec<Proposal>, ProposalRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _proposal_id: &ProposalId,
    ) -> Result<Option<Proposal>, ProposalRepositoryError> {
        Ok(None)
    }

    async fn create(&self, proposal: &NewProposal) -> Result<Proposal, ProposalRepositoryError> {
        Ok(Proposal {
            id: proposal.id,
            trip_id: proposal.trip_id,
            name: proposal.name.clone(),
            color: proposal.color.clone(),
            origin: crate::domain::proposals::ProposalOrigin::Manual,
            start_card_id: None,
            is_official: false,
            date: None,
            metrics: ProposalMetrics::default(),
            activities: Vec::new(),
        })
    }

    async fn update(
        &self,
        proposal_id: &ProposalId,
        _update: &ProposalUpdate,
    ) -> Result<Proposal, ProposalRepositoryError> {
        Err(ProposalRepositoryError::proposal_not_found(*proposal_id))
    }

    async fn delete(&self, proposal_id: &ProposalId) -> Result<(), ProposalRepositoryError> {
        Err(ProposalRepositoryError::proposal_not_found(*proposal_id))
    }

    async fn replace_detected(
        &self,
        _trip_id: &TripId,
        _proposals: &[DetectedProposal],
    ) -> Result<Vec<Proposal>, ProposalRepositoryError> {
        Ok(Vec::new())
    }

    async fn add_activity(
        &self,
        activity: &NewProposalActivity,
    ) -> Result<ProposalActivity, ProposalRepositoryError> {
        Err(ProposalRepositoryError::proposal_not_found(
            activity.proposal_id,
        ))
    }

    async fn remove_activity(
        &self,
        proposal_id: &ProposalId,
        _card_id: &CardId,
    ) -> Result<(), ProposalRepositoryError> {
        Err(ProposalRepositoryError::proposal_not_found(*proposal_id))
    }

    async fn assign_schedule(
        &self,
        proposal_id: &ProposalId,
        _entries: &[ScheduleEntry],
    ) -> Result<(), ProposalRepositoryError> {
        Err(ProposalRepositoryError::proposal_not_found(*proposal_id))
    }

    async fn store_metrics(
        &self,
        _metrics: &[(ProposalId, ProposalMetrics)],
    ) -> Result<(), ProposalRepositoryError> {
        Ok(())
    }
}
