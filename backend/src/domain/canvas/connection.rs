//! Directed transport edges between canvas cards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{CardId, ConnectionId, ProposalId, TripId};

/// Closed set of transport modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walk,
    Car,
    Train,
    Bus,
    Plane,
    #[default]
    Other,
}

impl TransportMode {
    /// Stable lowercase name used in storage and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Car => "car",
            Self::Train => "train",
            Self::Bus => "bus",
            Self::Plane => "plane",
            Self::Other => "other",
        }
    }
}

/// Error returned when parsing a [`TransportMode`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transport mode: {0}")]
pub struct ParseTransportModeError(pub String);

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ParseTransportModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "walk" => Ok(Self::Walk),
            "car" => Ok(Self::Car),
            "train" => Ok(Self::Train),
            "bus" => Ok(Self::Bus),
            "plane" => Ok(Self::Plane),
            "other" => Ok(Self::Other),
            _ => Err(ParseTransportModeError(value.to_owned())),
        }
    }
}

/// A directed connection from one card to another.
///
/// Duration is in minutes and distance in kilometres; both are opaque values
/// entered by the user, never computed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub trip_id: TripId,
    pub source_card_id: CardId,
    pub target_card_id: CardId,
    pub transport_mode: Option<TransportMode>,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub cost: Option<f64>,
    pub route: Option<Value>,
    pub proposal_id: Option<ProposalId>,
}

impl Connection {
    /// Whether both endpoints are the same card.
    pub fn is_self_loop(&self) -> bool {
        self.source_card_id == self.target_card_id
    }
}
