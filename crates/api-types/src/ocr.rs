//! Output of the timetable recognition service.

use serde::{Deserialize, Serialize};

use crate::line::Stop;

/// Stops and schedules recognised in an uploaded timetable photo.
///
/// Stops are in the order the service emitted them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrImport {
    #[serde(default)]
    pub stops: Vec<Stop>,

    #[serde(default)]
    pub schedules: Vec<String>,
}
