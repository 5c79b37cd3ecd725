//! Errors surfaced by the line editor.

use atomo_api_types::LineIdentifier;

use crate::editor::ImportReport;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The request never produced a usable response: connection failure,
    /// timeout at the socket level, or a body that did not decode.
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} failed: {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },

    #[error("No line selected")]
    NoLineSelected,

    #[error("Stop index {index} out of range for a line with {len} stops")]
    StopIndexOutOfRange { index: usize, len: usize },

    #[error("Line name must not be empty")]
    EmptyLineName,

    #[error("An image import is already in progress")]
    ImportInFlight,

    /// An import stopped partway. `appended` of the `requested` stops were
    /// persisted on `line` before `source` occurred; schedules were not
    /// replaced.
    #[error("Import into line {line} stopped after {appended} of {requested} stops: {source}")]
    PartialImport {
        line: LineIdentifier,
        appended: usize,
        requested: usize,
        #[source]
        source: Box<EditorError>,
    },

    /// `line` was created, but the re-read afterwards failed. It is selected
    /// by the next successful refresh.
    #[error("Line {line} was created but the lines could not be reloaded: {source}")]
    Unsynced {
        line: LineIdentifier,
        #[source]
        source: Box<EditorError>,
    },

    /// Every request of an import was accepted; only the re-read afterwards
    /// failed. `report` is what the backend now holds.
    #[error(
        "Import into line {} was saved but the lines could not be reloaded: {source}",
        .report.line
    )]
    ImportUnsynced {
        report: Box<ImportReport>,
        #[source]
        source: Box<EditorError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EditorError {
    /// HTTP status of a rejected request, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::PartialImport { source, .. }
            | Self::Unsynced { source, .. }
            | Self::ImportUnsynced { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the failure came from talking to the backend rather than from
    /// a local precondition.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Status { .. }
                | Self::PartialImport { .. }
                | Self::Unsynced { .. }
                | Self::ImportUnsynced { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
