//! In-process repository holding lines in memory.
//!
//! Mirrors the backend's observable behaviour (server-assigned identities,
//! append-only stop insertion, positional patch/delete, whole schedule
//! replacement, status errors for unknown lines and bad positions) and adds
//! hooks to script failures and inspect the calls it received.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use atomo_api_types::{EtaEntry, Line, LineIdentifier, NewLine, OcrImport, Stop, StopPatch};

use crate::error::{EditorError, Result};
use crate::repository::{ImageUpload, LineRepository, RepositoryFuture};

/// Status returned by scripted failures.
pub const INJECTED_FAILURE_STATUS: u16 = 503;

/// The kinds of request a repository serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListLines,
    CreateLine,
    AppendStop,
    PatchStop,
    DeleteStop,
    ReplaceSchedules,
    RecognizeTimetable,
    LineEtas,
}

impl Operation {
    pub fn method(self) -> &'static str {
        match self {
            Self::ListLines | Self::LineEtas => "GET",
            Self::CreateLine | Self::AppendStop | Self::RecognizeTimetable => "POST",
            Self::PatchStop => "PATCH",
            Self::DeleteStop => "DELETE",
            Self::ReplaceSchedules => "PUT",
        }
    }

    fn path(self, line: Option<&LineIdentifier>) -> String {
        let line = line.map(LineIdentifier::as_str).unwrap_or_default();
        match self {
            Self::ListLines | Self::CreateLine => "/api/lines".to_string(),
            Self::AppendStop | Self::PatchStop | Self::DeleteStop => format!("/api/lines/{line}/stops"),
            Self::ReplaceSchedules => format!("/api/lines/{line}/schedules"),
            Self::RecognizeTimetable => "/api/ocr/upload".to_string(),
            Self::LineEtas => format!("/api/lines/{line}/eta?from_stop_index=0"),
        }
    }

    fn error(self, line: Option<&LineIdentifier>, status: u16) -> EditorError {
        EditorError::Status {
            method: self.method(),
            path: self.path(line),
            status,
        }
    }
}

#[derive(Default)]
struct State {
    lines: Vec<Line>,
    next_id: u64,
    etas: HashMap<LineIdentifier, Vec<EtaEntry>>,
    recognition: OcrImport,
    uploads: Vec<ImageUpload>,
    calls: Vec<Operation>,
    /// Operation -> number of further calls allowed to succeed.
    failures: HashMap<Operation, usize>,
}

impl State {
    /// Record the call and decide whether it is scripted to fail.
    fn begin(&mut self, operation: Operation, line: Option<&LineIdentifier>) -> Result<()> {
        self.calls.push(operation);

        match self.failures.get_mut(&operation) {
            Some(0) => Err(operation.error(line, INJECTED_FAILURE_STATUS)),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn line_mut(&mut self, operation: Operation, id: &LineIdentifier) -> Result<&mut Line> {
        self.lines
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| operation.error(Some(id), 404))
    }

    fn insert(&mut self, line: NewLine) -> LineIdentifier {
        self.next_id += 1;
        let id = LineIdentifier::new(self.next_id.to_string());

        self.lines.push(Line {
            id: id.clone(),
            name: line.name,
            description: line.description,
            stops: line.stops,
            schedules: line.schedules,
        });

        id
    }
}

#[derive(Default)]
pub struct MemoryLineRepository {
    state: Mutex<State>,
}

impl MemoryLineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Out-of-band changes (another client editing the backend) ----

    pub fn insert_line(&self, line: NewLine) -> LineIdentifier {
        self.state().insert(line)
    }

    /// Returns whether a line was removed.
    pub fn remove_line(&self, id: &LineIdentifier) -> bool {
        let mut state = self.state();
        let before = state.lines.len();
        state.lines.retain(|l| &l.id != id);
        state.lines.len() != before
    }

    pub fn set_etas(&self, id: &LineIdentifier, etas: Vec<EtaEntry>) {
        self.state().etas.insert(id.clone(), etas);
    }

    /// What the recognition endpoint answers for any upload.
    pub fn set_recognition(&self, result: OcrImport) {
        self.state().recognition = result;
    }

    // ---- Failure scripting ----

    /// Let `successes` more calls of `operation` succeed, then fail every
    /// following one with [`INJECTED_FAILURE_STATUS`].
    pub fn fail_after(&self, operation: Operation, successes: usize) {
        self.state().failures.insert(operation, successes);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    // ---- Inspection ----

    pub fn line(&self, id: &LineIdentifier) -> Option<Line> {
        self.state().lines.iter().find(|l| &l.id == id).cloned()
    }

    pub fn lines(&self) -> Vec<Line> {
        self.state().lines.clone()
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.state().calls.iter().filter(|c| **c == operation).count()
    }

    pub fn uploads(&self) -> Vec<ImageUpload> {
        self.state().uploads.clone()
    }
}

impl LineRepository for MemoryLineRepository {
    fn list_lines(&self) -> RepositoryFuture<'_, Vec<Line>> {
        Box::pin(async move {
            let mut state = self.state();
            state.begin(Operation::ListLines, None)?;
            Ok(state.lines.clone())
        })
    }

    fn create_line<'a>(&'a self, line: &'a NewLine) -> RepositoryFuture<'a, LineIdentifier> {
        Box::pin(async move {
            let mut state = self.state();
            state.begin(Operation::CreateLine, None)?;
            Ok(state.insert(line.clone()))
        })
    }

    fn append_stop<'a>(&'a self, line: &'a LineIdentifier, stop: &'a Stop) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let op = Operation::AppendStop;
            let mut state = self.state();
            state.begin(op, Some(line))?;
            state.line_mut(op, line)?.stops.push(stop.clone());
            Ok(())
        })
    }

    fn patch_stop<'a>(
        &'a self,
        line: &'a LineIdentifier,
        index: usize,
        patch: &'a StopPatch,
    ) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let op = Operation::PatchStop;
            let mut state = self.state();
            state.begin(op, Some(line))?;

            let stop = state
                .line_mut(op, line)?
                .stops
                .get_mut(index)
                .ok_or_else(|| op.error(Some(line), 400))?;
            patch.apply_to(stop);
            Ok(())
        })
    }

    fn delete_stop<'a>(&'a self, line: &'a LineIdentifier, index: usize) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let op = Operation::DeleteStop;
            let mut state = self.state();
            state.begin(op, Some(line))?;

            let stops = &mut state.line_mut(op, line)?.stops;
            if index >= stops.len() {
                return Err(op.error(Some(line), 400));
            }
            stops.remove(index);
            Ok(())
        })
    }

    fn replace_schedules<'a>(
        &'a self,
        line: &'a LineIdentifier,
        schedules: &'a [String],
    ) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let op = Operation::ReplaceSchedules;
            let mut state = self.state();
            state.begin(op, Some(line))?;
            state.line_mut(op, line)?.schedules = schedules.to_vec();
            Ok(())
        })
    }

    fn recognize_timetable<'a>(&'a self, image: &'a ImageUpload) -> RepositoryFuture<'a, OcrImport> {
        Box::pin(async move {
            let mut state = self.state();
            state.begin(Operation::RecognizeTimetable, None)?;
            state.uploads.push(image.clone());
            Ok(state.recognition.clone())
        })
    }

    fn line_etas<'a>(
        &'a self,
        line: &'a LineIdentifier,
        _from_stop_index: usize,
    ) -> RepositoryFuture<'a, Vec<EtaEntry>> {
        Box::pin(async move {
            let op = Operation::LineEtas;
            let mut state = self.state();
            state.begin(op, Some(line))?;
            state.line_mut(op, line)?;
            Ok(state.etas.get(line).cloned().unwrap_or_default())
        })
    }
}
