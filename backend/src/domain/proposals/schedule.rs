//! Validation of bulk schedule assignments.
//!
//! A schedule batch slots a proposal's cards into trip days. Validation runs
//! before any write so a malformed batch never leaves the proposal partly
//! scheduled.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::CardId;

/// One card's slot in the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub card_id: CardId,
    /// Trip-relative day, starting at 1.
    pub day_number: i32,
    /// Position within the day, starting at 0.
    pub order_in_day: i32,
}

/// Reasons a schedule batch is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleValidationError {
    #[error("schedule must contain at least one entry")]
    Empty,
    #[error("card {card_id} appears more than once in the schedule")]
    DuplicateCard { card_id: CardId },
    #[error("day number for card {card_id} must be at least 1 (got {day_number})")]
    DayOutOfRange { card_id: CardId, day_number: i32 },
    #[error("order for card {card_id} must not be negative (got {order_in_day})")]
    NegativeOrder { card_id: CardId, order_in_day: i32 },
}

impl ScheduleValidationError {
    /// Card the error refers to, if any.
    pub fn card_id(&self) -> Option<CardId> {
        match self {
            Self::Empty => None,
            Self::DuplicateCard { card_id }
            | Self::DayOutOfRange { card_id, .. }
            | Self::NegativeOrder { card_id, .. } => Some(*card_id),
        }
    }
}

/// Check a schedule batch, reporting the first offending entry.
///
/// # Examples
/// ```
/// use trip_canvas::domain::CardId;
/// use trip_canvas::domain::proposals::{ScheduleEntry, validate_schedule};
///
/// let entry = ScheduleEntry { card_id: CardId::random(), day_number: 1, order_in_day: 0 };
/// assert!(validate_schedule(&[entry]).is_ok());
/// assert!(validate_schedule(&[]).is_err());
/// ```
pub fn validate_schedule(entries: &[ScheduleEntry]) -> Result<(), ScheduleValidationError> {
    if entries.is_empty() {
        return Err(ScheduleValidationError::Empty);
    }
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.card_id) {
            return Err(ScheduleValidationError::DuplicateCard {
                card_id: entry.card_id,
            });
        }
        if entry.day_number < 1 {
            return Err(ScheduleValidationError::DayOutOfRange {
                card_id: entry.card_id,
                day_number: entry.day_number,
            });
        }
        if entry.order_in_day < 0 {
            return Err(ScheduleValidationError::NegativeOrder {
                card_id: entry.card_id,
                order_in_day: entry.order_in_day,
            });
        }
    }
    Ok(())
}
