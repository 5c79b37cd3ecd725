//! Arrival table for the selected line.
//!
//! There is no way to cancel a request in flight, so every request carries
//! the line it was issued for and a generation number. A response is only
//! installed if both still match the view; anything else is dropped.

use atomo_api_types::{EtaEntry, LineIdentifier};

use crate::config::ETA_FROM_STOP_INDEX;
use crate::error::Result;
use crate::repository::LineRepository;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EtaState {
    /// Nothing requested for the tracked line yet.
    #[default]
    Idle,
    Pending,
    Ready(Vec<EtaEntry>),
    /// The latest request failed; shown as "no schedule available".
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EtaRequest {
    pub line: LineIdentifier,
    pub generation: u64,
    pub from_stop_index: usize,
}

#[derive(Debug)]
pub struct EtaResponse {
    pub request: EtaRequest,
    pub result: Result<Vec<EtaEntry>>,
}

impl EtaRequest {
    /// Perform the query. Independent of the view, so it can run while the
    /// view keeps tracking selection changes.
    pub async fn fetch(self, repository: &dyn LineRepository) -> EtaResponse {
        let result = repository.line_etas(&self.line, self.from_stop_index).await;
        EtaResponse {
            request: self,
            result,
        }
    }
}

#[derive(Debug, Default)]
pub struct EtaView {
    line: Option<LineIdentifier>,
    generation: u64,
    state: EtaState,
}

impl EtaView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> Option<&LineIdentifier> {
        self.line.as_ref()
    }

    pub fn state(&self) -> &EtaState {
        &self.state
    }

    /// Rows to display. Empty unless the latest request for the tracked line
    /// completed with entries.
    pub fn entries(&self) -> &[EtaEntry] {
        match &self.state {
            EtaState::Ready(entries) => entries,
            _ => &[],
        }
    }

    pub fn has_schedule(&self) -> bool {
        !self.entries().is_empty()
    }

    /// Follow the current selection. Switching to another line (or to none)
    /// drops the table and invalidates requests already in flight.
    pub fn track(&mut self, selected: Option<&LineIdentifier>) {
        if self.line.as_ref() == selected {
            return;
        }

        self.line = selected.cloned();
        self.generation += 1;
        self.state = EtaState::Idle;
    }

    /// Start a query for the tracked line. Supersedes any earlier request.
    pub fn request(&mut self) -> Option<EtaRequest> {
        let line = self.line.clone()?;

        self.generation += 1;
        self.state = EtaState::Pending;

        Some(EtaRequest {
            line,
            generation: self.generation,
            from_stop_index: ETA_FROM_STOP_INDEX,
        })
    }

    /// Install a response.
    ///
    /// Returns `Ok(false)` for a superseded response, which leaves the view
    /// untouched. A failure of the current request empties the table and is
    /// returned.
    pub fn apply(&mut self, response: EtaResponse) -> Result<bool> {
        let EtaResponse { request, result } = response;

        if request.generation != self.generation || self.line.as_ref() != Some(&request.line) {
            tracing::debug!(
                line = %request.line,
                generation = request.generation,
                current = self.generation,
                "discarding stale ETA response"
            );
            return Ok(false);
        }

        match result {
            Ok(entries) => {
                self.state = EtaState::Ready(entries);
                Ok(true)
            }
            Err(e) => {
                self.state = EtaState::Failed;
                Err(e)
            }
        }
    }
}
