use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use std::sync::Arc;

use skycast_core::app::{App, SEARCH_DEBOUNCE};
use skycast_core::config::Config;
use skycast_core::debounce::Debouncer;
use skycast_core::geolocate::IpLocationSource;
use skycast_core::history::RecentHistory;
use skycast_core::model::UnitSystem;
use skycast_core::provider::openweather::OpenWeatherProvider;
use skycast_core::store::FileStore;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather lookup with recent-search history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current conditions and the 5-day outlook for a city.
    Show {
        /// City name.
        city: String,

        /// Unit system, "metric" or "imperial". Persisted for later runs.
        #[arg(long)]
        unit: Option<String>,
    },

    /// Show weather for your current (network-derived) location.
    Here {
        /// Unit system, "metric" or "imperial". Persisted for later runs.
        #[arg(long)]
        unit: Option<String>,
    },

    /// List recent searches, or clear them.
    History {
        /// Remove all stored searches.
        #[arg(long)]
        clear: bool,
    },

    /// Interactive search prompt with debounced lookups.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, unit } => {
                let mut app = build_app()?;
                apply_unit(&mut app, unit.as_deref()).await?;
                app.search_now(&city).await;
                render::report(&app);
                Ok(())
            }
            Command::Here { unit } => {
                let mut app = build_app()?;
                apply_unit(&mut app, unit.as_deref()).await?;
                app.locate().await;
                render::report(&app);
                Ok(())
            }
            Command::History { clear } => history(clear),
            Command::Interactive => {
                let app = build_app()?;
                interactive(app).await
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_app() -> Result<App> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?.to_string();

    let store = Arc::new(FileStore::open()?);
    let provider = Arc::new(OpenWeatherProvider::new(api_key));
    let location =
        Arc::new(IpLocationSource::new().context("Failed to initialize location source")?);

    Ok(App::new(store, provider, location))
}

async fn apply_unit(app: &mut App, unit: Option<&str>) -> Result<()> {
    let Some(raw) = unit else { return Ok(()) };

    match UnitSystem::parse(raw) {
        Some(unit) => {
            app.set_unit(unit).await;
            Ok(())
        }
        None => bail!("Unknown unit '{raw}'. Supported units: metric, imperial."),
    }
}

fn history(clear: bool) -> Result<()> {
    let store = Arc::new(FileStore::open()?);
    let mut history = RecentHistory::load(store);

    if clear {
        history.clear();
        println!("Recent searches cleared.");
    } else if history.is_empty() {
        println!("No recent searches.");
    } else {
        render::print_history(history.entries());
    }

    Ok(())
}

async fn interactive(mut app: App) -> Result<()> {
    println!("Type a city name (two letters or more), then press Enter.");
    println!("Commands: :here  :unit  :history  :clear  :1-:5 (re-run a recent search)  :quit");

    let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

    loop {
        let line = match Text::new("city>").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };
        let line = line.trim();

        match line {
            "" => continue,
            ":quit" | ":q" => break,
            ":here" => {
                app.locate().await;
                render::report(&app);
            }
            ":unit" => {
                let next = app.unit().toggled();
                app.set_unit(next).await;
                println!("Units: {}", app.unit());
                render::report(&app);
            }
            ":history" => {
                if app.recent().is_empty() {
                    println!("No recent searches.");
                } else {
                    render::print_history(app.recent());
                }
            }
            ":clear" => {
                app.clear_recent();
                println!("Recent searches cleared.");
            }
            command if command.starts_with(':') => {
                let selected = command[1..]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| app.recent().get(i).cloned());

                match selected {
                    Some(city) => {
                        app.select_recent(&city).await;
                        render::report(&app);
                    }
                    None => println!("Unknown command: {command}"),
                }
            }
            term => {
                debouncer.input(term);
                if let Some(settled) = debouncer.settled().await {
                    app.search_settled(&settled).await;
                }
                render::report(&app);
            }
        }
    }

    Ok(())
}
