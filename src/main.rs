mod config;
mod dates;
mod filter;
mod gratitude_entry;
mod journal_state;
mod streak;
mod ui;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use config::{Config, ConfigSource};
use filter::GratitudeFilter;
use journal_state::JournalState;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use ui::{truncate_to_width, Action, UI};

/// A terminal journal for daily gratitude notes
#[derive(Parser, Debug)]
#[command(name = "gratitude-journal")]
#[command(about = "A terminal journal for daily gratitude notes")]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Journal file to use instead of the one named in the config
    #[arg(short, long)]
    data_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gratitude_journal=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Turns a store result into a status line message, logging failures.
fn report<T>(result: journal_state::Result<T>, on_success: impl FnOnce(T) -> String) -> String {
    match result {
        Ok(value) => on_success(value),
        Err(e) => {
            tracing::warn!(error = %e, "journal operation failed");
            format!("Not saved: {}", e)
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let (config, source) = Config::load_from(&config_path)?;
    init_logging(&config.log_file)?;
    match source {
        ConfigSource::Created => {
            tracing::info!("Created default config at {}", config_path.display())
        }
        ConfigSource::Loaded => {
            tracing::info!("Loaded config from {}: {:?}", config_path.display(), config)
        }
    }

    let data_file = args.data_file.unwrap_or_else(|| config.data_file.clone());
    let mut journal = JournalState::load_or_new(data_file.clone())
        .wrap_err_with(|| format!("Failed to load journal: {}", data_file.display()))?;
    tracing::info!("using journal {}", journal.path().display());
    let mut filter = GratitudeFilter::with_sort(config.default_sort);

    let mut status = if config.show_streak_on_start {
        match journal.streak(dates::today()) {
            0 => Some("Write something today to start a streak.".to_string()),
            n => Some(format!("You're on a {}-day gratitude streak!", n)),
        }
    } else {
        None
    };

    let mut ui = UI::new()?;

    loop {
        ui.display(&journal, &filter, status.as_deref())?;

        let Some(action) = ui.handle_input(&journal)? else {
            continue;
        };
        status = None;

        match action {
            Action::Write => {
                if let Some(draft) = ui.get_new_entry()? {
                    status = Some(report(
                        journal.add_entry(&draft.content, &draft.date),
                        |entry| format!("Saved entry for {}", entry.date),
                    ));
                }
            }
            Action::View => {
                let entries = journal.filtered_entries(&filter);
                ui.view_entries("View Entries", &entries)?;
            }
            Action::Edit => {
                let entries = journal.filtered_entries(&filter);
                if let Some(entry) = ui.select_entry("Select Entry to Edit", &entries)? {
                    if let Some(updated_entry) = ui.edit_entry(&entry)? {
                        status = Some(report(journal.update_entry(updated_entry), |_| {
                            "Entry updated".to_string()
                        }));
                    }
                }
            }
            Action::Delete => {
                let entries = journal.filtered_entries(&filter);
                if let Some(entry) = ui.select_entry("Select Entry to Delete", &entries)? {
                    let prompt = format!("Delete \"{}\"?", truncate_to_width(entry.headline(), 40));
                    if ui.confirm(&prompt)? {
                        status = Some(report(journal.delete_entry(entry.id), |_| {
                            "Entry deleted".to_string()
                        }));
                    }
                }
            }
            Action::Search => {
                if let Some(query) = ui.get_search_query()? {
                    let results = journal.search_entries(&query);
                    if results.is_empty() {
                        status = Some(format!("No entries contain \"{}\"", query));
                    } else {
                        ui.display_search_results(&query, &results)?;
                    }
                }
            }
            Action::Filter => {
                if let Some(updated) = ui.edit_filter(&filter)? {
                    tracing::debug!(?updated, "filter changed");
                    filter = updated;
                }
            }
            Action::ResetFilter => {
                filter = GratitudeFilter::with_sort(config.default_sort);
                status = Some("Filter cleared".to_string());
            }
            Action::Stats => {
                ui.view_stats(&journal.stats(dates::today()))?;
            }
            Action::ClearAll => {
                if ui.confirm("Delete every entry? This cannot be undone.")? {
                    status = Some(report(journal.clear_entries(), |removed| {
                        format!("Deleted {} entries", removed)
                    }));
                }
            }
            Action::Quit => break,
        }
    }

    Ok(())
}
