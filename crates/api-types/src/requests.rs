//! Request and acknowledgement bodies for line mutations.

use serde::{Deserialize, Serialize};

use crate::identifiers::LineIdentifier;
use crate::line::Stop;

/// Body of a line creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLine {
    pub name: String,
    pub description: String,
    pub stops: Vec<Stop>,
    pub schedules: Vec<String>,
}

impl NewLine {
    /// A line with no stops and no schedules.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            stops: Vec::new(),
            schedules: Vec::new(),
        }
    }
}

/// The part of a creation response the editor relies on. Other fields the
/// backend echoes back are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedLine {
    pub id: LineIdentifier,
}

/// Partial update of a stop. Absent fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_minutes_from_prev: Option<u32>,
}

impl StopPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn travel_minutes(minutes: u32) -> Self {
        Self {
            travel_minutes_from_prev: Some(minutes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.travel_minutes_from_prev.is_none()
    }

    /// Apply the patch to a local stop value.
    pub fn apply_to(&self, stop: &mut Stop) {
        if let Some(name) = &self.name {
            stop.name.clone_from(name);
        }
        if let Some(minutes) = self.travel_minutes_from_prev {
            stop.travel_minutes_from_prev = minutes;
        }
    }
}

/// Body of a stop patch: the position plus the fields to change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPatchRequest {
    pub index: usize,

    #[serde(flatten)]
    pub patch: StopPatch,
}

/// Body of a stop deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopIndex {
    pub index: usize,
}

/// Body of a whole schedule replacement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReplacement {
    pub schedules: Vec<String>,
}
