use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use atomo_core::prelude::*;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod output;

use output::Output;

#[derive(Parser, Debug)]
#[command(
    name = "atomo",
    author,
    version,
    about = "Edit bus lines, import timetable photos and view arrival estimates",
    long_about = "Works against a lines backend. Every command loads the current lines first, \
                  and every change is followed by a reload, so what is printed is what the \
                  backend holds.\n\n\
                  Stops are addressed by their 0-based position in the line."
)]
struct Args {
    /// Backend base URL (overrides the config file and ATOMO_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all lines
    Lines,

    /// Show a line with its stops and schedules
    Show { line: String },

    /// Create an empty line
    Create { name: String },

    /// Append a stop with the default name and travel time
    AddStop { line: String },

    /// Change the name and/or travel time of a stop
    UpdateStop {
        line: String,
        index: usize,

        #[arg(long)]
        name: Option<String>,

        /// Minutes from the previous stop; invalid or negative input counts as 0
        #[arg(long, allow_hyphen_values = true)]
        minutes: Option<String>,
    },

    /// Remove a stop
    DeleteStop { line: String, index: usize },

    /// Replace all schedules of a line, e.g. "07:30, 08:00; 08:30"
    Schedules {
        line: String,

        #[arg(required = true, num_args = 1..)]
        times: Vec<String>,
    },

    /// Upload a timetable photo. With --line the stops are appended to that
    /// line and its schedules replaced; without it a new line is created.
    Import {
        image: PathBuf,

        #[arg(long)]
        line: Option<String>,
    },

    /// Show estimated arrivals of a line
    Eta { line: String },
}

fn load_config(args: &Args) -> Result<EditorConfig> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::from_env(),
    };

    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }

    Ok(config)
}

/// Select a line of the loaded snapshot by identity.
fn select(editor: &mut LineEditor, line: &str) -> Result<()> {
    editor
        .select(Some(&LineIdentifier::new(line)))
        .map(|_| ())
        .ok_or_else(|| anyhow!("Line not found: {line}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    tracing::debug!(backend = %config.backend_url, "starting");

    let out = Output::new(args.json);
    let mut editor = LineEditor::connect(config).context("Invalid backend URL")?;
    editor.refresh().await.context("Failed to load lines")?;

    match args.command {
        Command::Lines => out.lines(editor.lines())?,

        Command::Show { line } => {
            select(&mut editor, &line)?;
            out.selected(&editor)?;
        }

        Command::Create { name } => match editor.create_line(&name).await {
            Ok(_) => out.selected(&editor)?,
            // Created already; the message says so
            Err(e @ EditorError::Unsynced { .. }) => return Err(e.into()),
            Err(e) => return Err(e).context("Failed to create line"),
        },

        Command::AddStop { line } => {
            select(&mut editor, &line)?;
            editor.add_stop().await.context("Failed to add stop")?;
            out.selected(&editor)?;
        }

        Command::UpdateStop {
            line,
            index,
            name,
            minutes,
        } => {
            let patch = StopPatch {
                name,
                travel_minutes_from_prev: minutes.as_deref().map(coerce_travel_minutes),
            };
            if patch.is_empty() {
                bail!("Nothing to update: pass --name and/or --minutes");
            }

            select(&mut editor, &line)?;
            editor
                .update_stop(index, patch)
                .await
                .with_context(|| format!("Failed to update stop {index}"))?;
            out.selected(&editor)?;
        }

        Command::DeleteStop { line, index } => {
            select(&mut editor, &line)?;
            editor
                .delete_stop(index)
                .await
                .with_context(|| format!("Failed to delete stop {index}"))?;
            out.selected(&editor)?;
        }

        Command::Schedules { line, times } => {
            select(&mut editor, &line)?;
            editor.set_schedule_text(times.join(" "));
            editor.set_schedules().await.context("Failed to save schedules")?;
            out.selected(&editor)?;
        }

        Command::Import { image, line } => {
            if let Some(line) = &line {
                select(&mut editor, line)?;
            }

            let upload = ImageUpload::from_path(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;

            match editor.import_image(&upload).await {
                Ok(report) => {
                    out.import(&report);
                    out.selected(&editor)?;
                }
                Err(EditorError::ImportUnsynced { report, source }) => {
                    // Saved in full; running the import again would duplicate it
                    out.import(&report);
                    return Err(anyhow::Error::new(*source)
                        .context("Import saved, but the lines could not be reloaded"));
                }
                Err(e @ EditorError::PartialImport { .. }) => {
                    // What did land is in the refreshed snapshot
                    out.selected(&editor)?;
                    return Err(e).context("Import incomplete");
                }
                Err(e) => return Err(e).context("Import failed"),
            }
        }

        Command::Eta { line } => {
            select(&mut editor, &line)?;
            editor.refresh_etas().await.context("Failed to load arrivals")?;
            out.etas(editor.etas().entries())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "atomo",
            "update-stop",
            "3",
            "1",
            "--minutes",
            "-4",
            "--backend-url",
            "http://example.org",
        ])
        .unwrap();

        assert_eq!(args.backend_url.as_deref(), Some("http://example.org"));
        match args.command {
            Command::UpdateStop {
                line,
                index,
                name,
                minutes,
            } => {
                assert_eq!(line, "3");
                assert_eq!(index, 1);
                assert_eq!(name, None);
                assert_eq!(minutes.as_deref().map(coerce_travel_minutes), Some(0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_schedules_requires_times() {
        assert!(Args::try_parse_from(["atomo", "schedules", "3"]).is_err());

        let args = Args::try_parse_from(["atomo", "schedules", "3", "07:30,", "08:00"]).unwrap();
        match args.command {
            Command::Schedules { times, .. } => {
                assert_eq!(parse_schedule_text(&times.join(" ")), vec!["07:30", "08:00"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_backend_url_flag_wins() {
        let args = Args::try_parse_from(["atomo", "--backend-url", "http://10.1.1.1:8000", "lines"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.backend_url, "http://10.1.1.1:8000");
    }
}
