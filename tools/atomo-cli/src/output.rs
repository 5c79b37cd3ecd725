use std::sync::Arc;

use anyhow::Result;
use atomo_core::prelude::*;

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn lines(&self, lines: &[Arc<Line>]) -> Result<()> {
        if self.json {
            let lines: Vec<&Line> = lines.iter().map(Arc::as_ref).collect();
            return self.print_json(&lines);
        }

        if lines.is_empty() {
            println!("No lines.");
        }
        for line in lines {
            println!(
                "{:>6}  {}  ({} stops, {} schedules)",
                line.id.as_str(),
                line.name,
                line.stops.len(),
                line.schedules.len()
            );
        }
        Ok(())
    }

    /// Print the selected line, or say that nothing is selected (e.g. the
    /// line was removed by someone else meanwhile).
    pub fn selected(&self, editor: &LineEditor) -> Result<()> {
        let Some(line) = editor.selected() else {
            if self.json {
                println!("null");
            } else {
                println!("No line selected.");
            }
            return Ok(());
        };

        if self.json {
            return self.print_json(line.as_ref());
        }

        println!("{} [{}]", line.name, line.id);
        if !line.description.is_empty() {
            println!("  {}", line.description);
        }

        if line.stops.is_empty() {
            println!("  No stops.");
        }
        for (index, stop) in line.stops.iter().enumerate() {
            println!(
                "  {index:>3}  {:<30} {:>4} min from previous",
                stop.name, stop.travel_minutes_from_prev
            );
        }
        println!("  Total travel time: {} min", editor.total_travel_minutes());

        if !line.schedules.is_empty() {
            println!("  Schedules: {}", line.schedules.join(", "));
        }
        Ok(())
    }

    pub fn import(&self, report: &ImportReport) {
        let how = match report.target {
            ImportTarget::Merged => "appended to",
            ImportTarget::Created => "created as",
        };
        tracing::info!(
            "Imported {} stops and {} schedules, {how} line {}",
            report.stops_appended,
            report.schedules_replaced,
            report.line
        );
    }

    pub fn etas(&self, etas: &[EtaEntry]) -> Result<()> {
        if self.json {
            return self.print_json(etas);
        }

        if etas.is_empty() {
            println!("No schedule available.");
        }
        for entry in etas {
            println!("{:<30} {}", entry.stop, entry.arrivals.join(" • "));
        }
        Ok(())
    }
}
