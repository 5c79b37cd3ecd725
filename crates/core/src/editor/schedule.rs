//! Free-text schedule entry.

use crate::editor::LineEditor;
use crate::error::Result;

/// Split schedule text into time tokens.
///
/// Any run of commas, semicolons or whitespace (newlines included) separates
/// tokens. Empty tokens are dropped; order and duplicates are kept. Tokens
/// are not validated as times.
pub fn parse_schedule_text(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

impl LineEditor {
    pub fn schedule_text(&self) -> &str {
        &self.schedule_text
    }

    pub fn set_schedule_text(&mut self, text: impl Into<String>) {
        self.schedule_text = text.into();
    }

    /// Replace the selected line's whole schedule list with the parsed
    /// schedule text.
    pub async fn set_schedules(&mut self) -> Result<()> {
        let line = self.sync.require_selected()?;
        let schedules = parse_schedule_text(&self.schedule_text);

        tracing::debug!(line = %line.id, count = schedules.len(), "replacing schedules");
        self.repository().replace_schedules(&line.id, &schedules).await?;
        self.refresh().await
    }
}
