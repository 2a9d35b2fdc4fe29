//! Port for the trip read model and the canonical itinerary store.

use async_trait::async_trait;

use crate::domain::proposals::{ItineraryConversion, Proposal};
use crate::domain::trip::Trip;
use crate::domain::{ProposalId, TripId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by itinerary repository adapters.
    pub enum ItineraryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "itinerary repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "itinerary repository query failed: {message}",
        /// The proposal disappeared before it could be promoted.
        ProposalNotFound { proposal_id: ProposalId } =>
            "proposal {proposal_id} not found",
    }
}

/// Port for trip lookups and applying a proposal conversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    /// Find a trip by id.
    async fn find_trip(&self, trip_id: &TripId) -> Result<Option<Trip>, ItineraryRepositoryError>;

    /// Apply a conversion plan in one transaction and return the promoted
    /// proposal.
    ///
    /// Adapters must serialise conversions of the same trip day, demote other
    /// official proposals sharing the plan's date, promote the target, move the
    /// trip to planning, replace the day's activities and insert participants
    /// and transport legs. Any failure leaves the itinerary unchanged.
    async fn apply_conversion(
        &self,
        conversion: &ItineraryConversion,
    ) -> Result<Proposal, ItineraryRepositoryError>;
}

/// Fixture implementation with no trips.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureItineraryRepository;

#[async_trait]
impl ItineraryRepository for FixtureItineraryRepository {
    async fn find_trip(&self, _trip_id: &TripId) -> Result<Option<Trip>, ItineraryRepositoryError> {
        Ok(None)
    }

    async fn apply_conversion(
        &self,
        conversion: &ItineraryConversion,
    ) -> Result<Proposal, ItineraryRepositoryError> {
        Err(ItineraryRepositoryError::proposal_not_found(
            conversion.proposal_id,
        ))
    }
}
