//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters; driving
//! ports (`ProposalCommand`, `ProposalQuery`) are implemented by domain
//! services and called by inbound adapters. Each port ships a `Fixture*`
//! implementation for running without a database.

mod macros;
pub(crate) use macros::define_port_error;

mod canvas_repository;
mod itinerary_repository;
mod proposal_command;
mod proposal_query;
mod proposal_repository;

#[cfg(test)]
pub use canvas_repository::MockCanvasRepository;
pub use canvas_repository::{CanvasRepository, CanvasRepositoryError, FixtureCanvasRepository};
#[cfg(test)]
pub use itinerary_repository::MockItineraryRepository;
pub use itinerary_repository::{
    FixtureItineraryRepository, ItineraryRepository, ItineraryRepositoryError,
};
#[cfg(test)]
pub use proposal_command::MockProposalCommand;
pub use proposal_command::{
    AddProposalActivityRequest, AssignScheduleRequest, ConvertProposalRequest,
    CreateProposalRequest, FixtureProposalCommand, ProposalCommand, UpdateProposalRequest,
};
#[cfg(test)]
pub use proposal_query::MockProposalQuery;
pub use proposal_query::{FixtureProposalQuery, ProposalQuery};
#[cfg(test)]
pub use proposal_repository::MockProposalRepository;
pub use proposal_repository::{
    FixtureProposalRepository, ProposalRepository, ProposalRepositoryError,
};
