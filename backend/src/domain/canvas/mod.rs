//! Canvas model: cards, directed connections and the graph built over them.
//!
//! These types carry no persistence logic. The canvas CRUD layer owns card
//! and connection lifecycles; proposal detection and conversion only read
//! them through [`crate::domain::ports::CanvasRepository`].

mod card;
mod connection;
mod graph;

pub use card::{
    ActivityType, CanvasPosition, Card, CustomLocation, ParseActivityTypeError, hh_mm,
    parse_time_of_day,
};
pub use connection::{Connection, ParseTransportModeError, TransportMode};
pub use graph::CanvasGraph;

/// All cards and connections of one trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasSnapshot {
    pub cards: Vec<Card>,
    pub connections: Vec<Connection>,
}

impl CanvasSnapshot {
    /// Build the adjacency view for this snapshot.
    pub fn graph(&self) -> CanvasGraph {
        CanvasGraph::new(&self.cards, &self.connections)
    }

    /// Look up a card by id.
    pub fn card(&self, id: &crate::domain::CardId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }
}
