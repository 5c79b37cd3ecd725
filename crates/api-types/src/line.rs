//! Lines and their stops.

use serde::{Deserialize, Deserializer, Serialize};

use crate::identifiers::LineIdentifier;

// ============================================================================
// Data Structures
// ============================================================================

/// A point on a line.
///
/// Stops have no identity of their own: a stop is addressed by its position in
/// the parent line's stop sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,

    /// Minutes from the preceding stop. For the first stop this is the time
    /// from the line's origin.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub travel_minutes_from_prev: u32,
}

impl Stop {
    pub fn new(name: impl Into<String>, travel_minutes_from_prev: u32) -> Self {
        Self {
            name: name.into(),
            travel_minutes_from_prev,
        }
    }
}

/// A bus route with its ordered stops and schedule list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineIdentifier,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Route order. Only append, update in place and delete by position are
    /// supported, so the order here is the order stops were appended.
    #[serde(default)]
    pub stops: Vec<Stop>,

    /// Opaque time tokens such as `"07:30"`, in the order they were saved.
    #[serde(default)]
    pub schedules: Vec<String>,
}

impl Line {
    /// Sum of the travel times of every stop.
    pub fn total_travel_minutes(&self) -> u64 {
        self.stops
            .iter()
            .map(|s| u64::from(s.travel_minutes_from_prev))
            .sum()
    }
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}
