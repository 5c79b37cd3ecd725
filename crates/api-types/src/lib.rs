//! # atomo-api-types
//!
//! Wire types shared between the line editor core and the lines backend.
//!
//! Everything here is plain data: the shapes the backend returns for lines,
//! ETA tables and OCR imports, and the request bodies the editor sends back.
//!
//! ## Example
//!
//! ```
//! use atomo_api_types::prelude::*;
//!
//! let line: Line = serde_json::from_str(
//!     r#"{"id": 7, "name": "Linea 1", "stops": [
//!         {"name": "Depot", "travel_minutes_from_prev": 5},
//!         {"name": "Piazza", "travel_minutes_from_prev": 3}
//!     ]}"#,
//! ).unwrap();
//!
//! assert_eq!(line.id, LineIdentifier::new("7"));
//! assert_eq!(line.total_travel_minutes(), 8);
//! assert!(line.schedules.is_empty());
//! ```

pub mod eta;
pub mod identifiers;
pub mod line;
pub mod ocr;
pub mod requests;

pub mod prelude {
    pub use crate::eta::{EtaEntry, EtaTable};
    pub use crate::identifiers::LineIdentifier;
    pub use crate::line::{Line, Stop};
    pub use crate::ocr::OcrImport;
    pub use crate::requests::{
        CreatedLine, NewLine, ScheduleReplacement, StopIndex, StopPatch, StopPatchRequest,
    };
}

pub use prelude::*;
