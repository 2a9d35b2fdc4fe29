//! Domain model and services for trip canvas proposals.
//!
//! Purpose: hold the canvas graph model, the pure detection and conversion
//! planners, and the service that drives them through ports. Nothing here
//! depends on HTTP or SQL.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - TraceId — per-request correlation id in task-local storage.
//! - ProposalService — implements the proposal driving ports.

pub mod canvas;
pub mod error;
mod ids;
pub mod ports;
mod proposal_service;
pub mod proposals;
mod trace_id;
pub mod trip;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    CardId, ConnectionId, ItineraryActivityId, ProposalActivityId, ProposalId, TripId,
};
pub use self::proposal_service::ProposalService;
pub use self::trace_id::TraceId;
pub use self::trip::Trip;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use trip_canvas::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("no such proposal"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
