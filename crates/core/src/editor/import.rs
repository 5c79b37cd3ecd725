//! Merging recognised timetables into the line collection.
//!
//! With a line selected, recognised stops are appended after its existing
//! stops and its schedules are overwritten by the recognised ones. With no
//! selection a new line is created from the recognised content.
//!
//! The merge is a sequence of requests, not a transaction. If one fails the
//! earlier ones stay applied, and the error says how far it got.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use atomo_api_types::{LineIdentifier, NewLine, OcrImport};

use crate::editor::LineEditor;
use crate::error::{EditorError, Result};
use crate::repository::ImageUpload;

/// Marks an import as in flight. Clones share the flag, so a surface can
/// keep one to disable its import trigger.
#[derive(Clone, Debug, Default)]
pub struct ImportGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of an import; reopens the gate when dropped.
#[derive(Debug)]
pub struct ImportGuard {
    busy: Arc<AtomicBool>,
}

impl ImportGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Result<ImportGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EditorError::ImportInFlight)?;

        Ok(ImportGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

impl Drop for ImportGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportTarget {
    /// Appended to the line that was selected.
    Merged,
    /// Seeded a new line, now selected.
    Created,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReport {
    pub line: LineIdentifier,
    pub target: ImportTarget,
    pub stops_appended: usize,
    /// Number of schedules the line now has from the import.
    pub schedules_replaced: usize,
}

impl LineEditor {
    pub fn import_gate(&self) -> &ImportGate {
        &self.import_gate
    }

    /// Upload a timetable photo and merge what the recognition service found.
    pub async fn import_image(&mut self, image: &ImageUpload) -> Result<ImportReport> {
        let _guard = self.import_gate.try_begin()?;

        let recognised = self.repository().recognize_timetable(image).await?;
        tracing::debug!(
            file = %image.file_name,
            stops = recognised.stops.len(),
            schedules = recognised.schedules.len(),
            "timetable recognised"
        );

        self.apply_import(recognised).await
    }

    /// Merge an already recognised timetable.
    pub async fn merge_import(&mut self, recognised: OcrImport) -> Result<ImportReport> {
        let _guard = self.import_gate.try_begin()?;
        self.apply_import(recognised).await
    }

    async fn apply_import(&mut self, recognised: OcrImport) -> Result<ImportReport> {
        let report = match self.sync.selected().map(|l| l.id.clone()) {
            Some(line) => self.merge_into(line, recognised).await?,
            None => self.create_from(recognised).await?,
        };

        tracing::info!(
            line = %report.line,
            target = ?report.target,
            stops = report.stops_appended,
            schedules = report.schedules_replaced,
            "import applied"
        );
        Ok(report)
    }

    async fn merge_into(&mut self, line: LineIdentifier, recognised: OcrImport) -> Result<ImportReport> {
        let repository = self.repository();
        let requested = recognised.stops.len();

        for (appended, stop) in recognised.stops.iter().enumerate() {
            if let Err(e) = repository.append_stop(&line, stop).await {
                return Err(self.partial_failure(line, appended, requested, e).await);
            }
        }

        if let Err(e) = repository.replace_schedules(&line, &recognised.schedules).await {
            return Err(self.partial_failure(line, requested, requested, e).await);
        }

        let report = ImportReport {
            line,
            target: ImportTarget::Merged,
            stops_appended: requested,
            schedules_replaced: recognised.schedules.len(),
        };

        match self.refresh().await {
            Ok(()) => Ok(report),
            Err(e) => Err(unsynced(report, e)),
        }
    }

    async fn create_from(&mut self, recognised: OcrImport) -> Result<ImportReport> {
        let stops_appended = recognised.stops.len();
        let schedules_replaced = recognised.schedules.len();

        let new_line = NewLine {
            name: self.config.ocr_line.name.clone(),
            description: self.config.ocr_line.description.clone(),
            stops: recognised.stops,
            schedules: recognised.schedules,
        };

        let line = self.repository().create_line(&new_line).await?;
        let result = self.refresh_selecting(&line).await;

        let report = ImportReport {
            line,
            target: ImportTarget::Created,
            stops_appended,
            schedules_replaced,
        };

        match result {
            Ok(()) => Ok(report),
            Err(e) => Err(unsynced(report, e)),
        }
    }

    /// Build the error for an import that stopped partway, after trying to
    /// bring the snapshot up to date with what did land.
    async fn partial_failure(
        &mut self,
        line: LineIdentifier,
        appended: usize,
        requested: usize,
        source: EditorError,
    ) -> EditorError {
        tracing::warn!(%line, appended, requested, error = %source, "import stopped partway");

        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "could not resync after partial import");
        }

        EditorError::PartialImport {
            line,
            appended,
            requested,
            source: Box::new(source),
        }
    }
}

/// Every write of the import landed but the snapshot could not be re-read.
fn unsynced(report: ImportReport, source: EditorError) -> EditorError {
    tracing::warn!(line = %report.line, error = %source, "import saved but resync failed");

    EditorError::ImportUnsynced {
        report: Box::new(report),
        source: Box::new(source),
    }
}
