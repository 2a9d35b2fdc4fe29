//! Trip canvas proposal backend.
//!
//! Detects itinerary proposals from a trip's canvas graph, lets travellers
//! curate and schedule them, and promotes one proposal per day into the
//! trip's itinerary.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
