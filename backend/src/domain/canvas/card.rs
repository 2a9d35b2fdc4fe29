//! Canvas cards: the nodes users place on the planning surface.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CardId, TripId};

/// Closed set of activity categories a card can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Sightseeing,
    Food,
    Lodging,
    Transport,
    Other,
}

impl ActivityType {
    /// Stable lowercase name used in storage and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sightseeing => "sightseeing",
            Self::Food => "food",
            Self::Lodging => "lodging",
            Self::Transport => "transport",
            Self::Other => "other",
        }
    }
}

/// Error returned when parsing an [`ActivityType`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid activity type: {0}")]
pub struct ParseActivityTypeError(pub String);

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = ParseActivityTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sightseeing" => Ok(Self::Sightseeing),
            "food" => Ok(Self::Food),
            "lodging" => Ok(Self::Lodging),
            "transport" => Ok(Self::Transport),
            "other" => Ok(Self::Other),
            _ => Err(ParseActivityTypeError(value.to_owned())),
        }
    }
}

/// Structured location picked on a map instead of a free-text location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLocation {
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Position of a card on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

/// A user-placed activity card.
///
/// Cards are created and edited by the canvas CRUD layer; the proposal core
/// only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub trip_id: TripId,
    pub position: CanvasPosition,
    pub title: String,
    pub activity_type: ActivityType,
    pub location: Option<String>,
    pub custom_location: Option<CustomLocation>,
    #[serde(with = "hh_mm", default)]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "hh_mm", default)]
    pub end_time: Option<NaiveTime>,
    pub cost: Option<f64>,
    pub budget_category: Option<String>,
    pub memo: Option<String>,
    pub participants: Vec<Uuid>,
    pub is_completed: bool,
    pub is_collapsed: bool,
}

impl Card {
    /// Location text to copy onto itinerary records: the free-text location,
    /// else the custom location's name.
    pub fn display_location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .or_else(|| self.custom_location.as_ref().map(|loc| loc.name.as_str()))
    }
}

/// Parse an `HH:mm` time-of-day string.
///
/// # Examples
/// ```
/// use trip_canvas::domain::canvas::parse_time_of_day;
///
/// let time = parse_time_of_day("09:30").expect("valid time");
/// assert_eq!(time.format("%H:%M").to_string(), "09:30");
/// assert!(parse_time_of_day("9.30").is_none());
/// ```
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Serde helpers for optional `HH:mm` fields.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::parse_time_of_day;

    /// Serialise as `HH:mm` or `null`.
    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialise from `HH:mm` or `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse_time_of_day(&raw)
                    .ok_or_else(|| D::Error::custom(format!("expected HH:mm, got {raw}")))
            })
            .transpose()
    }
}
