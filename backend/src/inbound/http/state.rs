//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on the driving
//! ports, so they can be exercised with fixtures or mocks.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureProposalCommand, FixtureProposalQuery, ProposalCommand, ProposalQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub proposals: Arc<dyn ProposalCommand>,
    pub proposals_query: Arc<dyn ProposalQuery>,
}

impl HttpState {
    /// Construct state from the proposal driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use trip_canvas::domain::ports::{FixtureProposalCommand, FixtureProposalQuery};
    /// use trip_canvas::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureProposalCommand), Arc::new(FixtureProposalQuery));
    /// let _query = state.proposals_query.clone();
    /// ```
    pub fn new(proposals: Arc<dyn ProposalCommand>, proposals_query: Arc<dyn ProposalQuery>) -> Self {
        Self {
            proposals,
            proposals_query,
        }
    }

    /// State backed by fixture ports, used when no database is configured.
    pub fn fixtures() -> Self {
        Self::new(Arc::new(FixtureProposalCommand), Arc::new(FixtureProposalQuery))
    }
}
