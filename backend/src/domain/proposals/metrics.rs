//! Derived proposal metrics, recomputed from current canvas state on read.

use serde::{Deserialize, Serialize};

use crate::domain::ProposalId;
use crate::domain::canvas::CanvasSnapshot;

use super::ProposalActivity;

/// Summary figures shown alongside a proposal.
///
/// Cost and distance are opaque user-entered values; missing values count
/// as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMetrics {
    pub total_budget: f64,
    pub activity_count: usize,
    pub total_distance: f64,
}

impl ProposalMetrics {
    /// Recompute metrics for one proposal.
    ///
    /// Budget sums the cost of each member card. Distance sums the distance
    /// of connections tagged with `proposal_id`. The count is the number of
    /// memberships, including any whose card has since been deleted.
    pub fn compute(
        proposal_id: ProposalId,
        activities: &[ProposalActivity],
        canvas: &CanvasSnapshot,
    ) -> Self {
        let total_budget = activities
            .iter()
            .filter_map(|activity| canvas.card(&activity.card_id))
            .filter_map(|card| card.cost)
            .fold(0.0, |acc, cost| acc + cost);
        let total_distance = canvas
            .connections
            .iter()
            .filter(|conn| conn.proposal_id == Some(proposal_id))
            .filter_map(|conn| conn.distance_km)
            .fold(0.0, |acc, distance| acc + distance);
        Self {
            total_budget,
            activity_count: activities.len(),
            total_distance,
        }
    }
}
