//! Operator-facing editing session over a line collection.
//!
//! Every mutation goes to the repository first and is only considered done
//! once the snapshot has been re-read; the editor never patches its snapshot
//! speculatively. Methods that mutate take `&mut self`, which keeps
//! positional stop edits from interleaving.

pub mod import;
pub mod schedule;
pub mod stops;

use std::sync::Arc;

use atomo_api_types::{EtaEntry, Line, LineIdentifier, NewLine};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::eta::EtaView;
use crate::repository::{HttpLineRepository, LineRepository};
use crate::sync::SyncController;

pub use import::{ImportGate, ImportGuard, ImportReport, ImportTarget};
pub use schedule::parse_schedule_text;
pub use stops::coerce_travel_minutes;

pub struct LineEditor {
    config: EditorConfig,
    sync: SyncController,
    schedule_text: String,
    import_gate: ImportGate,
    eta: EtaView,
    /// Line created while the snapshot could not be re-read; selected once a
    /// refresh succeeds.
    pending_selection: Option<LineIdentifier>,
}

impl LineEditor {
    pub fn new(repository: Arc<dyn LineRepository>, config: EditorConfig) -> Self {
        Self {
            schedule_text: config.schedule_text.clone(),
            config,
            sync: SyncController::new(repository),
            import_gate: ImportGate::new(),
            eta: EtaView::new(),
            pending_selection: None,
        }
    }

    /// An editor talking to the backend named by `config`.
    pub fn connect(config: EditorConfig) -> Result<Self> {
        let repository = Arc::new(HttpLineRepository::from_config(&config)?);
        Ok(Self::new(repository, config))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn lines(&self) -> &[Arc<Line>] {
        self.sync.lines()
    }

    pub fn selected(&self) -> Option<&Arc<Line>> {
        self.sync.selected()
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    /// Sum of travel times of the selected line, 0 with nothing selected.
    pub fn total_travel_minutes(&self) -> u64 {
        self.selected().map_or(0, |l| l.total_travel_minutes())
    }

    fn repository(&self) -> Arc<dyn LineRepository> {
        Arc::clone(self.sync.repository())
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let result = self.sync.refresh().await;

        if result.is_ok() {
            if let Some(id) = self.pending_selection.take() {
                self.sync.select(Some(&id));
            }
        }

        self.eta.track(self.sync.selected_id());
        result
    }

    /// Select a line of the current snapshot, or clear the selection.
    ///
    /// The ETA view follows but nothing is fetched; call
    /// [`refresh_etas`](Self::refresh_etas) to query the new line.
    pub fn select(&mut self, id: Option<&LineIdentifier>) -> Option<&Arc<Line>> {
        self.pending_selection = None;
        self.sync.select(id);
        self.eta.track(self.sync.selected_id());
        self.sync.selected()
    }

    /// Create an empty line, select it and query its arrivals.
    ///
    /// The name is sent as typed; it only has to contain something other
    /// than whitespace. If the line was created but the snapshot could not be
    /// re-read, [`EditorError::Unsynced`] carries its identity.
    pub async fn create_line(&mut self, name: &str) -> Result<LineIdentifier> {
        if name.trim().is_empty() {
            return Err(EditorError::EmptyLineName);
        }

        let id = self.repository().create_line(&NewLine::empty(name)).await?;
        tracing::info!(line = %id, name, "line created");

        if let Err(e) = self.refresh_selecting(&id).await {
            return Err(EditorError::Unsynced {
                line: id,
                source: Box::new(e),
            });
        }

        Ok(id)
    }

    /// Re-read the snapshot and select `id` in it. Should the re-read fail,
    /// `id` is selected by the next refresh that succeeds.
    async fn refresh_selecting(&mut self, id: &LineIdentifier) -> Result<()> {
        self.pending_selection = Some(id.clone());
        self.refresh().await?;
        self.fetch_etas_logged().await;
        Ok(())
    }

    // ---- ETA view ----

    pub fn etas(&self) -> &EtaView {
        &self.eta
    }

    /// Query and install the arrival table of the selected line. With
    /// nothing selected the table stays empty and no request is made.
    pub async fn refresh_etas(&mut self) -> Result<&[EtaEntry]> {
        if let Some(request) = self.eta.request() {
            let repository = self.repository();
            let response = request.fetch(repository.as_ref()).await;
            self.eta.apply(response)?;
        }
        Ok(self.eta.entries())
    }

    /// ETA query for a line the editor just selected on its own. A failure
    /// leaves the table empty.
    async fn fetch_etas_logged(&mut self) {
        if let Err(e) = self.refresh_etas().await {
            tracing::warn!(error = %e, "could not load arrivals");
        }
    }
}
