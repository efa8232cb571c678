use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use climatica_core::{
    forecast::simulate_forecast,
    geocode::Geocoder,
    models::{favorite_name, GeoPoint},
    storage::{Database, FavoriteStore, LocalStorage, SqliteStorage, FAVORITES_KEY},
    Error as CoreError,
};
use climatica_tui::{load_config, App, Config, Event, EventHandler};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "climatica", version, about = "Weather dashboard with saved favorite locations")]
struct Cli {
    /// SQLite file backing local storage
    #[arg(long, default_value = "climatica.db")]
    db: PathBuf,

    /// Config file (defaults to config.toml next to the database)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file used while the terminal UI is running
    #[arg(long, default_value = "climatica.log")]
    log_file: PathBuf,

    /// Never contact the geocoding service
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage saved locations
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Print the simulated forecast for the first favorite
    Forecast {
        /// First forecast day (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Seed for a reproducible forecast
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show stored keys and when each was last written
    Inspect,
    /// Copy the storage database to another file
    Backup {
        /// Destination file
        path: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesCommand {
    /// List saved favorites
    List {
        /// Print the stored JSON array
        #[arg(long)]
        json: bool,
    },
    /// Save a location
    Add {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Name to use instead of the geocoded one
        #[arg(long)]
        name: Option<String>,
    },
    /// Change a favorite's name
    Rename { id: i64, name: String },
    /// Delete a favorite
    Remove { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| default_config_path(&cli.db));

    match cli.command {
        None => {
            init_file_logging(&cli.log_file)?;
            let config = load_config(&config_path)?;
            run_tui(&cli.db, config, cli.offline)
        }
        Some(command) => {
            init_stderr_logging();
            let config = load_config(&config_path)?;
            run_command(command, &cli.db, &config, cli.offline)
        }
    }
}

fn default_config_path(db: &Path) -> PathBuf {
    db.parent()
        .map(|dir| dir.join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Logs go to a file so they do not draw over the terminal UI
fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

// =========================
// Terminal UI
// =========================

fn run_tui(db: &Path, config: Config, offline: bool) -> Result<()> {
    let geocoder = config.geocoder.build(offline)?;
    let tick_rate = config.layout.tick_rate_ms;

    // Create app before touching the terminal so storage errors print normally
    let mut app = App::new(db, config, geocoder)?;
    tracing::info!(db = %db.display(), favorites = app.favorites.len(), "starting terminal UI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.on_resize(size.width);

    let event_handler = EventHandler::new(tick_rate);
    let result = run_app(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.favorites.is_dirty() {
        tracing::warn!("exiting with unsaved favorites");
        eprintln!("Warning: some favorite changes could not be saved.");
    }
    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal UI failed");
    }
    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| climatica_tui::ui::render(f, app))?;

        match event_handler.next()? {
            Event::Key(key) => climatica_tui::event::handle_key_event(key, app),
            Event::Mouse(mouse) => climatica_tui::event::handle_mouse_event(mouse, app),
            Event::Resize(width, _) => app.on_resize(width),
            Event::Tick => app.tick(),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

// =========================
// Scripted commands
// =========================

fn open_store(db: &Path) -> Result<FavoriteStore<SqliteStorage>> {
    let storage = SqliteStorage::open(db)
        .with_context(|| format!("Failed to open storage at {}", db.display()))?;
    Ok(FavoriteStore::load(storage)?)
}

fn run_command(command: Command, db: &Path, config: &Config, offline: bool) -> Result<()> {
    let mut store = open_store(db)?;

    match command {
        Command::Favorites(FavoritesCommand::List { json }) => {
            if json {
                println!("{}", stored_json(&store)?);
            } else if store.is_empty() {
                println!("No favorites saved.");
            } else {
                for f in store.list() {
                    println!("{}\t{}\t{:.4}\t{:.4}", f.id, f.name, f.lat, f.lng);
                }
            }
        }
        Command::Favorites(FavoritesCommand::Add { lat, lng, name }) => {
            let point = GeoPoint::new(lat, lng)?;
            let name = match name {
                Some(name) => name,
                None => {
                    let geocoder = config.geocoder.build(offline)?;
                    lookup_name(geocoder.as_ref(), point)
                }
            };
            let favorite = store.add(&name, point.lat, point.lng)?;
            println!("Added {} ({})", favorite.name, favorite.id);
        }
        Command::Favorites(FavoritesCommand::Rename { id, name }) => {
            if !store.rename(id, &name)? {
                return Err(CoreError::NotFound(format!("favorite {}", id)).into());
            }
            println!("Renamed {} to {}", id, name.trim());
        }
        Command::Favorites(FavoritesCommand::Remove { id }) => {
            if !store.remove(id)? {
                return Err(CoreError::NotFound(format!("favorite {}", id)).into());
            }
            println!("Removed {}", id);
        }
        Command::Forecast { date, seed } => {
            let Some(location) = store.first() else {
                bail!("No favorites saved; add one first");
            };
            let start = date.unwrap_or_else(|| Local::now().date_naive());
            let days = match seed {
                Some(seed) => simulate_forecast(start, &mut StdRng::seed_from_u64(seed)),
                None => simulate_forecast(start, &mut rand::rng()),
            };
            println!("Forecast for {}", location.name);
            for day in days {
                println!(
                    "{}\train {:>2}%\tfrost {}\theat {}",
                    day.date, day.rain_chance, day.frost_risk, day.heat_risk
                );
            }
        }
        Command::Inspect => {
            let storage = store.storage();
            for key in storage.keys()? {
                let written = storage
                    .updated_at(&key)?
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}", key, written);
            }
            println!("favorites: {}", store.len());
        }
        Command::Backup { path } => {
            Database::new(db).backup(&path)?;
            println!("Backed up {} to {}", db.display(), path.display());
        }
    }
    Ok(())
}

/// The raw value under the favorites key, as other clients would read it
fn stored_json(store: &FavoriteStore<SqliteStorage>) -> Result<String> {
    Ok(store
        .storage()
        .get_item(FAVORITES_KEY)?
        .unwrap_or_else(|| "[]".to_string()))
}

/// Geocoded name for `point`, or its coordinates if the lookup fails
fn lookup_name(geocoder: &dyn Geocoder, point: GeoPoint) -> String {
    match geocoder.reverse(point) {
        Ok(address) => favorite_name(&address, point),
        Err(e) => {
            tracing::warn!(error = %e, "reverse geocoding failed; naming by coordinates");
            point.to_string()
        }
    }
}
