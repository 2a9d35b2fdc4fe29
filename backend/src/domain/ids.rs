//! Strongly typed identifiers for trips, canvas entities and proposals.
//!
//! Every identifier wraps a UUID and serialises transparently, so payloads
//! see plain UUID strings while the type system keeps a `CardId` from being
//! passed where a `ProposalId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Borrow the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id! {
    /// Identifier of a trip.
    TripId
}

define_id! {
    /// Identifier of a canvas card.
    CardId
}

define_id! {
    /// Identifier of a canvas connection.
    ConnectionId
}

define_id! {
    /// Identifier of a proposal.
    ProposalId
}

define_id! {
    /// Identifier of a proposal membership row.
    ProposalActivityId
}

define_id! {
    /// Identifier of a canonical itinerary activity.
    ItineraryActivityId
}
