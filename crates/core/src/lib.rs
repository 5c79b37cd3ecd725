//! # atomo-core
//!
//! Editing and synchronization of bus lines held by a remote backend.
//!
//! The backend is the source of truth. [`LineEditor`] keeps a snapshot of
//! its lines plus the operator's selection, sends every edit as a request and
//! re-reads the whole collection afterwards.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use atomo_core::prelude::*;
//! use atomo_core::repository::MemoryLineRepository;
//!
//! # let runtime = tokio::runtime::Runtime::new().unwrap();
//! # runtime.block_on(async {
//! let repository = Arc::new(MemoryLineRepository::new());
//! let mut editor = LineEditor::new(repository, EditorConfig::default());
//!
//! editor.create_line("Linea 1").await?;
//! editor.add_stop().await?;
//! editor.set_schedule_text("07:30 08:00");
//! editor.set_schedules().await?;
//!
//! let line = editor.selected().unwrap();
//! assert_eq!(line.stops[0].name, "Stop 1");
//! assert_eq!(line.schedules, vec!["07:30", "08:00"]);
//! # Ok::<(), EditorError>(())
//! # }).unwrap();
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod eta;
pub mod repository;
pub mod sync;

pub use atomo_api_types as api;

pub mod prelude {
    pub use crate::config::EditorConfig;
    pub use crate::editor::{
        ImportGate, ImportReport, ImportTarget, LineEditor, coerce_travel_minutes,
        parse_schedule_text,
    };
    pub use crate::error::{EditorError, Result};
    pub use crate::eta::{EtaRequest, EtaResponse, EtaState, EtaView};
    pub use crate::repository::{HttpLineRepository, ImageUpload, LineRepository};
    pub use crate::sync::SyncController;
    pub use atomo_api_types::prelude::*;
}

pub use prelude::*;
