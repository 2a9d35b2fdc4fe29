//! Proposals: named, coloured groupings of connected canvas cards.
//!
//! A proposal is either detected from the canvas graph or created by hand.
//! Its memberships ([`ProposalActivity`]) are later slotted into days by the
//! schedule assigner and finally promoted into the canonical itinerary by
//! the converter.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CardId, ConnectionId, ProposalActivityId, ProposalId, TripId};

pub mod conversion;
pub mod detection;
mod metrics;
pub mod naming;
pub mod schedule;

pub use conversion::{
    ActivityParticipantDraft, ConversionError, ItineraryActivityDraft, ItineraryConversion,
    TransportLegDraft, day_number_for, plan_conversion,
};
pub use detection::{DetectedComponent, detect_components, plan_detected_proposals};
pub use metrics::ProposalMetrics;
pub use naming::{PROPOSAL_PALETTE, proposal_color, proposal_name};
pub use schedule::{ScheduleEntry, ScheduleValidationError, validate_schedule};

/// Maximum length of a proposal name, in characters.
pub const MAX_PROPOSAL_NAME_CHARS: usize = 100;

/// How a proposal came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOrigin {
    /// Produced by graph detection; replaced wholesale on re-detection.
    Detected,
    /// Created by a user; never touched by detection.
    Manual,
}

impl ProposalOrigin {
    /// Stable lowercase name used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Manual => "manual",
        }
    }

    /// Parse the storage name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "detected" => Some(Self::Detected),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Validation errors for proposal names and colours.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProposalValidationError {
    #[error("proposal name must not be blank")]
    EmptyName,
    #[error("proposal name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("proposal color must be a #RRGGBB hex string (got {value})")]
    InvalidColor { value: String },
}

/// Trimmed, non-empty proposal name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalName(String);

impl ProposalName {
    /// Validate and normalise a name.
    ///
    /// # Examples
    /// ```
    /// use trip_canvas::domain::proposals::ProposalName;
    ///
    /// let name = ProposalName::new("  Kyoto day  ").expect("valid name");
    /// assert_eq!(name.as_ref(), "Kyoto day");
    /// assert!(ProposalName::new("   ").is_err());
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, ProposalValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProposalValidationError::EmptyName);
        }
        if trimmed.chars().count() > MAX_PROPOSAL_NAME_CHARS {
            return Err(ProposalValidationError::NameTooLong {
                max: MAX_PROPOSAL_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProposalName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProposalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProposalName {
    type Error = ProposalValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProposalName> for String {
    fn from(value: ProposalName) -> Self {
        value.0
    }
}

/// Display colour as a `#RRGGBB` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalColor(String);

impl ProposalColor {
    /// Validate a colour string.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ProposalValidationError> {
        let raw = value.as_ref().trim();
        let valid = raw.len() == 7
            && raw.starts_with('#')
            && raw.chars().skip(1).all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ProposalValidationError::InvalidColor {
                value: raw.to_owned(),
            });
        }
        Ok(Self(raw.to_owned()))
    }

    /// The first palette colour, used when a manual proposal omits one.
    pub fn default_manual() -> Self {
        Self(PROPOSAL_PALETTE[0].to_owned())
    }
}

impl AsRef<str> for ProposalColor {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ProposalColor {
    type Error = ProposalValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProposalColor> for String {
    fn from(value: ProposalColor) -> Self {
        value.0
    }
}

/// Membership of a card in a proposal.
///
/// `position` records insertion order and breaks ties between memberships
/// sharing a schedule slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalActivity {
    pub id: ProposalActivityId,
    pub proposal_id: ProposalId,
    pub card_id: CardId,
    pub day_number: Option<i32>,
    pub order_in_day: Option<i32>,
    pub position: i32,
}

/// A persisted proposal with its memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub trip_id: TripId,
    pub name: ProposalName,
    pub color: ProposalColor,
    pub origin: ProposalOrigin,
    pub start_card_id: Option<CardId>,
    pub is_official: bool,
    pub date: Option<NaiveDate>,
    pub metrics: ProposalMetrics,
    pub activities: Vec<ProposalActivity>,
}

impl Proposal {
    /// Card ids of every membership, in stored order.
    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.activities.iter().map(|activity| activity.card_id)
    }
}

/// A proposal produced by detection, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedProposal {
    pub id: ProposalId,
    pub trip_id: TripId,
    pub name: ProposalName,
    pub color: ProposalColor,
    pub start_card_id: CardId,
    /// Member cards in traversal-discovery order.
    pub card_ids: Vec<CardId>,
    /// Connections whose endpoints both lie inside the component.
    pub connection_ids: Vec<ConnectionId>,
}

/// A manually created proposal, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProposal {
    pub id: ProposalId,
    pub trip_id: TripId,
    pub name: ProposalName,
    pub color: ProposalColor,
}

/// Partial update of a proposal. `date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalUpdate {
    pub name: Option<ProposalName>,
    pub color: Option<ProposalColor>,
    pub date: Option<Option<NaiveDate>>,
}

impl ProposalUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.date.is_none()
    }
}

/// A membership to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProposalActivity {
    pub id: ProposalActivityId,
    pub proposal_id: ProposalId,
    pub card_id: CardId,
    pub day_number: Option<i32>,
}
