//! Almanac CLI
//!
//! Command-line interface for browsing a vault by date:
//! - List dated notes and headings
//! - List folders with dated items
//! - Render the agenda or calendar view
//! - Follow vault changes live
//! - Generate or update the config file

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use almanac::agenda::{AgendaSettings, AgendaState, ViewOptions, ViewRegistry};
use almanac::config::{generate_default_config, Config, LoggingConfig};
use almanac::index::event_title;
use almanac::parse::PrefixFormat;
use almanac::source::{DocumentSource, FsVault};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

#[derive(Parser)]
#[command(name = "almanac")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Agenda and calendar for date-prefixed notes")]
#[command(long_about = "Almanac reads the date at the start of note names and headings\n(e.g. \"202307141744 Testing\") and lays your vault out as an agenda.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (overrides the config file)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Config file (default: ./almanac.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every dated note and heading
    Scan {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List folders that contain dated items
    Folders,

    /// Render a view (agenda, calendar)
    Show {
        /// View name
        #[arg(default_value = "agenda")]
        view: String,
        /// Only show items under this folder (e.g. "Work/")
        #[arg(long)]
        folder: Option<String>,
        /// Centre the agenda on this date (YYYY-MM-DD, default: today)
        #[arg(long)]
        around: Option<NaiveDate>,
        /// Month for the calendar view (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
        /// Hide days without items
        #[arg(long)]
        compact: bool,
    },

    /// Render the agenda and re-render on every vault change
    Watch {
        /// Only show items under this folder
        #[arg(long)]
        folder: Option<String>,
        /// Hide days without items
        #[arg(long)]
        compact: bool,
    },

    /// Generate default config file, or update the prefix format
    Config {
        /// Output path (default: stdout, or the config file when updating)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Save this date-prefix format to the config file
        #[arg(long)]
        prefix_format: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load_default().context("Failed to load config")?,
    };
    if let Some(vault) = &cli.vault {
        config.vault.root = vault.display().to_string();
    }

    init_logging(&config.logging)?;

    match cli.command {
        Commands::Scan { json } => {
            let state = load_state(&config).await?;
            let format = &state.settings().format;

            if json || cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(state.items())?);
            } else if state.items().is_empty() {
                println!("No dated notes found in {}", config.vault.root);
                println!();
                println!("Note names must start with the prefix format {:?}, e.g.", format.pattern());
                println!("  {} Meeting notes", format.format(&chrono::Local::now().naive_local()));
            } else {
                println!("{:<17} {:<8} {:<30} {}", "Date", "Kind", "Title", "Path");
                println!("{}", "-".repeat(80));

                let rows = state
                    .items()
                    .iter()
                    .flat_map(|item| std::iter::once(item).chain(item.sub_items.iter()));
                for item in rows {
                    println!(
                        "{:<17} {:<8} {:<30} {}",
                        item.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                        item.kind.to_string(),
                        event_title(item, format),
                        item.path
                    );
                }
            }
        }

        Commands::Folders => {
            let state = load_state(&config).await?;
            let counts: BTreeMap<&str, usize> = state
                .folders()
                .iter()
                .map(|(key, items)| (key, items.len()))
                .collect();

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else if counts.is_empty() {
                println!("No folders with dated notes.");
            } else {
                println!("{:<40} {}", "Folder", "Items");
                println!("{}", "-".repeat(50));
                println!("{:<40} {}", "(all folders)", state.items().len());
                for (key, count) in counts {
                    println!("{:<40} {}", key, count);
                }
            }
        }

        Commands::Show {
            view,
            folder,
            around,
            month,
            compact,
        } => {
            let views = ViewRegistry::with_defaults();
            // Fail on a bad view name before touching the vault
            views.get(&view).with_context(|| {
                format!("Available views: {}", views.names().join(", "))
            })?;

            let mut state = load_state(&config).await?;
            apply_folder(&mut state, folder.as_deref());
            if let Some(date) = around {
                state.set_reference_date(date);
            }

            let options = ViewOptions { compact, month };
            print!("{}", views.render(&view, &state, &options)?);
        }

        Commands::Watch { folder, compact } => {
            let vault = FsVault::from_config(&config.vault);
            let mut state = AgendaState::new(AgendaSettings::from_config(&config)?);
            state.refresh(&vault).await?;
            apply_folder(&mut state, folder.as_deref());

            let views = ViewRegistry::with_defaults();
            let options = ViewOptions {
                compact,
                month: None,
            };
            let render = |state: &AgendaState| match views.render("agenda", state, &options) {
                Ok(text) => print!("{}", text),
                Err(e) => eprintln!("Render failed: {}", e),
            };
            render(&state);

            let mut subscription = vault.subscribe()?;
            tracing::info!("Watching {} (Ctrl-C to stop)", config.vault.root);

            tokio::select! {
                result = state.follow(&vault, &mut subscription, |state| {
                    println!("{}", "-".repeat(40));
                    render(state);
                }) => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopped watching");
                }
            }
        }

        Commands::Config {
            output,
            prefix_format,
        } => match prefix_format {
            Some(pattern) => {
                // Reject bad patterns before anything is written
                PrefixFormat::compile(&pattern)
                    .with_context(|| format!("Invalid prefix format {:?}", pattern))?;

                let path = match output.or(cli.config).or_else(Config::default_path) {
                    Some(path) => path,
                    None => bail!("No config directory found; pass --output"),
                };

                let mut saved = if path.exists() {
                    Config::load(&path)?
                } else {
                    Config::default()
                };
                saved.agenda.prefix_format = pattern;
                saved.save(&path)?;
                println!("Prefix format {:?} saved to {:?}", saved.agenda.prefix_format, path);
            }
            None => {
                let config = generate_default_config();

                match output {
                    Some(path) => {
                        // Create parent directory if needed
                        if let Some(parent) = path.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(&path, &config)?;
                        println!("Config written to {:?}", path);
                    }
                    None => {
                        print!("{}", config);
                    }
                }
            }
        },
    }

    Ok(())
}

/// Build agenda state for the configured vault
async fn load_state(config: &Config) -> anyhow::Result<AgendaState> {
    let settings = AgendaSettings::from_config(config)?;
    let vault = FsVault::from_config(&config.vault);

    let mut state = AgendaState::new(settings);
    state
        .refresh(&vault)
        .await
        .with_context(|| format!("Failed to read vault {}", config.vault.root))?;
    Ok(state)
}

fn apply_folder(state: &mut AgendaState, folder: Option<&str>) {
    if let Some(folder) = folder {
        if !state.select_folder(folder) {
            eprintln!("No dated items under {:?}, showing all folders", folder);
        }
    }
}

fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("Expected YYYY-MM, got {:?}", s))?;
    let year: i32 = year.parse().map_err(|_| format!("Invalid year: {}", year))?;
    let month: u32 = month.parse().map_err(|_| format!("Invalid month: {}", month))?;
    if !(1..=12).contains(&month) {
        return Err(format!("Month must be 1-12, got {}", month));
    }
    Ok((year, month))
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("almanac={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(config.file.is_none());
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format.as_str() {
        "json" => layer.json().boxed(),
        _ => layer.pretty().boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
    Ok(())
}
