//! In-memory adjacency view over one trip's cards and connections.

use std::collections::HashMap;

use crate::domain::CardId;

use super::{Card, Connection};

/// Directed graph of cards with forward and reverse adjacency indices.
///
/// Edges are stored as entered (source to target). Connectivity queries that
/// ignore direction consult both indices rather than rewriting the edges.
/// Connections whose endpoints are not among the supplied cards are skipped.
///
/// # Examples
/// ```
/// use trip_canvas::domain::CardId;
/// use trip_canvas::domain::canvas::CanvasGraph;
///
/// let (a, b) = (CardId::random(), CardId::random());
/// let graph = CanvasGraph::from_edges([a, b], [(a, b)]);
/// assert_eq!(graph.in_degree(&b), 1);
/// assert_eq!(graph.incoming(&b), &[a]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CanvasGraph {
    nodes: Vec<CardId>,
    outgoing: HashMap<CardId, Vec<CardId>>,
    incoming: HashMap<CardId, Vec<CardId>>,
    in_degree: HashMap<CardId, usize>,
}

impl CanvasGraph {
    /// Build the graph from full card and connection records.
    pub fn new(cards: &[Card], connections: &[Connection]) -> Self {
        Self::from_edges(
            cards.iter().map(|card| card.id),
            connections
                .iter()
                .map(|conn| (conn.source_card_id, conn.target_card_id)),
        )
    }

    /// Build the graph from bare node ids and `(source, target)` pairs.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = CardId>,
        edges: impl IntoIterator<Item = (CardId, CardId)>,
    ) -> Self {
        let mut graph = Self::default();
        for node in nodes {
            if graph.in_degree.insert(node, 0).is_none() {
                graph.nodes.push(node);
            }
        }

        for (source, target) in edges {
            if !graph.contains(&source) || !graph.contains(&target) {
                continue;
            }
            graph.outgoing.entry(source).or_default().push(target);
            graph.incoming.entry(target).or_default().push(source);
            if let Some(count) = graph.in_degree.get_mut(&target) {
                *count += 1;
            }
        }
        graph
    }

    /// Cards in the order they were supplied.
    pub fn nodes(&self) -> &[CardId] {
        &self.nodes
    }

    /// Whether `card` is part of the graph.
    pub fn contains(&self, card: &CardId) -> bool {
        self.in_degree.contains_key(card)
    }

    /// Targets of connections leaving `card`.
    pub fn outgoing(&self, card: &CardId) -> &[CardId] {
        self.outgoing.get(card).map_or(&[], Vec::as_slice)
    }

    /// Sources of connections entering `card`.
    pub fn incoming(&self, card: &CardId) -> &[CardId] {
        self.incoming.get(card).map_or(&[], Vec::as_slice)
    }

    /// Number of connections entering `card`; zero for unknown cards.
    pub fn in_degree(&self, card: &CardId) -> usize {
        self.in_degree.get(card).copied().unwrap_or(0)
    }
}
