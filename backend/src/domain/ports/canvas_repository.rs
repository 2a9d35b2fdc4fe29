//! Port for reading a trip's canvas cards and connections.

use async_trait::async_trait;

use crate::domain::TripId;
use crate::domain::canvas::CanvasSnapshot;

use super::define_port_error;

define_port_error! {
    /// Errors raised by canvas repository adapters.
    pub enum CanvasRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "canvas repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "canvas repository query failed: {message}",
    }
}

/// Read-only access to the canvas. Card and connection lifecycles belong to
/// the canvas CRUD layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CanvasRepository: Send + Sync {
    /// Load every card and connection of a trip.
    ///
    /// Cards are returned in creation order so detection output is stable
    /// across calls. An unknown trip yields an empty snapshot.
    async fn load_canvas(&self, trip_id: &TripId) -> Result<CanvasSnapshot, CanvasRepositoryError>;
}

/// Fixture implementation serving an empty canvas.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCanvasRepository;

#[async_trait]
impl CanvasRepository for FixtureCanvasRepository {
    async fn load_canvas(
        &self,
        _trip_id: &TripId,
    ) -> Result<CanvasSnapshot, CanvasRepositoryError> {
        Ok(CanvasSnapshot::default())
    }
}
