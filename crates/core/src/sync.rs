//! Local snapshot of the backend's lines and the operator's selection.
//!
//! The snapshot is only ever replaced wholesale from a fresh
//! [`LineRepository::list_lines`] read; nothing patches it locally. Selection
//! is held by identity and re-resolved against every new snapshot.

use std::sync::Arc;

use atomo_api_types::{Line, LineIdentifier};

use crate::error::{EditorError, Result};
use crate::repository::LineRepository;

pub struct SyncController {
    repository: Arc<dyn LineRepository>,
    lines: Vec<Arc<Line>>,
    selected: Option<Arc<Line>>,
}

impl SyncController {
    /// An empty controller. Nothing is fetched until [`refresh`](Self::refresh).
    pub fn new(repository: Arc<dyn LineRepository>) -> Self {
        Self {
            repository,
            lines: Vec::new(),
            selected: None,
        }
    }

    pub fn repository(&self) -> &Arc<dyn LineRepository> {
        &self.repository
    }

    pub fn lines(&self) -> &[Arc<Line>] {
        &self.lines
    }

    pub fn selected(&self) -> Option<&Arc<Line>> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<&LineIdentifier> {
        self.selected.as_ref().map(|l| &l.id)
    }

    pub fn require_selected(&self) -> Result<Arc<Line>> {
        self.selected.clone().ok_or(EditorError::NoLineSelected)
    }

    pub fn find(&self, id: &LineIdentifier) -> Option<&Arc<Line>> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Replace the snapshot with the backend's current collection.
    ///
    /// On failure the previous snapshot and selection are kept as they were.
    /// A selected line that is gone from the new snapshot is deselected.
    pub async fn refresh(&mut self) -> Result<()> {
        let fetched = match self.repository.list_lines().await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed; keeping previous snapshot");
                return Err(e);
            }
        };

        self.lines = fetched.into_iter().map(Arc::new).collect();

        if let Some(previous) = self.selected.take() {
            self.selected = self.find(&previous.id).cloned();

            if self.selected.is_none() {
                tracing::warn!(line = %previous.id, "selected line no longer exists; clearing selection");
            }
        }

        tracing::debug!(
            lines = self.lines.len(),
            selected = ?self.selected_id().map(LineIdentifier::as_str),
            "snapshot refreshed"
        );

        Ok(())
    }

    /// Select a line from the current snapshot, or clear the selection.
    ///
    /// An identity missing from the snapshot clears the selection.
    pub fn select(&mut self, id: Option<&LineIdentifier>) -> Option<&Arc<Line>> {
        self.selected = id.and_then(|id| self.find(id)).cloned();
        self.selected.as_ref()
    }
}
