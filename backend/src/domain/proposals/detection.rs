//! Connected-component detection over the canvas graph.
//!
//! Components are found with an iterative walk that follows connections in
//! both directions, so `A -> B <- C` forms one component even though it is
//! not a directed path. Isolated cards are dropped. Each component's start
//! card is the member with the fewest incoming connections; ties go to the
//! member discovered first.

use std::collections::HashSet;

use crate::domain::canvas::{CanvasGraph, CanvasSnapshot};
use crate::domain::{CardId, ProposalId, TripId};

use super::naming::{proposal_color, proposal_name};
use super::{DetectedProposal, ProposalColor, ProposalName, ProposalValidationError};

/// A connected group of at least two cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedComponent {
    /// Members in traversal-discovery order.
    pub card_ids: Vec<CardId>,
    pub start_card_id: CardId,
}

/// Partition `graph` into connected components of two or more cards.
///
/// Components are returned in the order their first card appears in
/// [`CanvasGraph::nodes`].
///
/// # Examples
/// ```
/// use trip_canvas::domain::CardId;
/// use trip_canvas::domain::canvas::CanvasGraph;
/// use trip_canvas::domain::proposals::detect_components;
///
/// let (a, b, c, lonely) = (CardId::random(), CardId::random(), CardId::random(), CardId::random());
/// let graph = CanvasGraph::from_edges([a, b, c, lonely], [(a, b), (c, b)]);
///
/// let components = detect_components(&graph);
/// assert_eq!(components.len(), 1);
/// assert_eq!(components[0].card_ids.len(), 3);
/// ```
pub fn detect_components(graph: &CanvasGraph) -> Vec<DetectedComponent> {
    let mut visited: HashSet<CardId> = HashSet::with_capacity(graph.nodes().len());
    let mut components = Vec::new();

    for &seed in graph.nodes() {
        if visited.contains(&seed) {
            continue;
        }
        let members = walk_undirected(graph, seed, &mut visited);
        if members.len() < 2 {
            continue;
        }
        if let Some(start_card_id) = pick_start(graph, &members) {
            components.push(DetectedComponent {
                card_ids: members,
                start_card_id,
            });
        }
    }
    components
}

fn walk_undirected(
    graph: &CanvasGraph,
    seed: CardId,
    visited: &mut HashSet<CardId>,
) -> Vec<CardId> {
    let mut members = Vec::new();
    let mut stack = vec![seed];

    while let Some(card) = stack.pop() {
        if !visited.insert(card) {
            continue;
        }
        members.push(card);
        let neighbours = graph
            .outgoing(&card)
            .iter()
            .chain(graph.incoming(&card).iter());
        stack.extend(neighbours.filter(|next| !visited.contains(*next)).copied());
    }
    members
}

fn pick_start(graph: &CanvasGraph, members: &[CardId]) -> Option<CardId> {
    let (&first, rest) = members.split_first()?;
    let start = rest.iter().fold(first, |best, &candidate| {
        if graph.in_degree(&candidate) < graph.in_degree(&best) {
            candidate
        } else {
            best
        }
    });
    Some(start)
}

/// Detect components in `snapshot` and turn them into named, coloured
/// proposals ready for insertion.
///
/// The `i`-th component (0-based, discovery order) is named
/// `"Proposal <letters(i)>"` and coloured from the palette, so re-running
/// detection on an unchanged canvas yields the same names, colours and
/// memberships.
pub fn plan_detected_proposals(
    trip_id: TripId,
    snapshot: &CanvasSnapshot,
) -> Result<Vec<DetectedProposal>, ProposalValidationError> {
    let graph = snapshot.graph();
    detect_components(&graph)
        .into_iter()
        .enumerate()
        .map(|(index, component)| {
            let members: HashSet<CardId> = component.card_ids.iter().copied().collect();
            let connection_ids = snapshot
                .connections
                .iter()
                .filter(|conn| {
                    members.contains(&conn.source_card_id) && members.contains(&conn.target_card_id)
                })
                .map(|conn| conn.id)
                .collect();
            Ok(DetectedProposal {
                id: ProposalId::random(),
                trip_id,
                name: ProposalName::new(proposal_name(index))?,
                color: ProposalColor::new(proposal_color(index))?,
                start_card_id: component.start_card_id,
                card_ids: component.card_ids,
                connection_ids,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "detection_tests.rs"]
mod tests;
