//! Driving port for proposal reads.

use async_trait::async_trait;

use crate::domain::proposals::Proposal;
use crate::domain::{Error, ProposalId, TripId};

/// Driving port for proposal read operations.
///
/// # Examples
///
/// ```rust,no_run
/// # use trip_canvas::domain::TripId;
/// # use trip_canvas::domain::ports::{FixtureProposalQuery, ProposalQuery};
/// # async fn example() -> Result<(), trip_canvas::domain::Error> {
/// let proposals = FixtureProposalQuery.list(TripId::random()).await?;
/// assert!(proposals.is_empty());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProposalQuery: Send + Sync {
    /// List a trip's proposals with freshly computed metrics.
    async fn list(&self, trip_id: TripId) -> Result<Vec<Proposal>, Error>;

    /// Fetch one proposal with its memberships.
    async fn get(&self, proposal_id: ProposalId) -> Result<Proposal, Error>;
}

/// Fixture query implementation with no stored proposals.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProposalQuery;

#[async_trait]
impl ProposalQuery for FixtureProposalQuery {
    async fn list(&self, _trip_id: TripId) -> Result<Vec<Proposal>, Error> {
        Ok(Vec::new())
    }

    async fn get(&self, proposal_id: ProposalId) -> Result<Proposal, Error> {
        Err(Error::not_found(format!("proposal {proposal_id} not found")))
    }
}
