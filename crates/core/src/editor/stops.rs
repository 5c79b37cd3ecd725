//! Positional editing of the selected line's stops.
//!
//! Stops are addressed by their index in the snapshot the editor holds when
//! the call is made. The index is checked against that snapshot before
//! anything is sent.

use atomo_api_types::{Stop, StopPatch};

use crate::editor::LineEditor;
use crate::error::{EditorError, Result};

impl LineEditor {
    /// Append a stop with the configured default name and travel time.
    pub async fn add_stop(&mut self) -> Result<()> {
        let line = self.sync.require_selected()?;
        let defaults = &self.config.new_stop;
        let stop = Stop::new(defaults.name_for(line.stops.len()), defaults.travel_minutes);

        tracing::debug!(line = %line.id, stop = %stop.name, "appending stop");
        self.repository().append_stop(&line.id, &stop).await?;
        self.refresh().await
    }

    pub async fn update_stop(&mut self, index: usize, patch: StopPatch) -> Result<()> {
        let line = self.sync.require_selected()?;
        check_index(index, line.stops.len())?;

        tracing::debug!(line = %line.id, index, ?patch, "patching stop");
        self.repository().patch_stop(&line.id, index, &patch).await?;
        self.refresh().await
    }

    pub async fn delete_stop(&mut self, index: usize) -> Result<()> {
        let line = self.sync.require_selected()?;
        check_index(index, line.stops.len())?;

        tracing::debug!(line = %line.id, index, "deleting stop");
        self.repository().delete_stop(&line.id, index).await?;
        self.refresh().await
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(EditorError::StopIndexOutOfRange { index, len });
    }
    Ok(())
}

/// Read a travel time typed by the operator.
///
/// Leading whitespace and an optional sign are accepted, then as many digits
/// as follow; anything after them is ignored. Empty, non-numeric and negative
/// input reads as 0. Values too large for `u32` saturate.
pub fn coerce_travel_minutes(input: &str) -> u32 {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = digits
        .find(|c: char| !c.is_ascii_digit())
        .map_or(digits, |end| &digits[..end]);

    if negative || digits.is_empty() {
        return 0;
    }

    digits
        .bytes()
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(u32::from(d - b'0')))
}
