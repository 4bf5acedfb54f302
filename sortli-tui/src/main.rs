//! Terminal UI for sortli that lets users classify waste, log disposals, and find recycling
//! centers.

mod app;
mod input;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Arc, sync::Mutex, time::Duration as StdDuration};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use sortli_core::{
    Backends, Catalog, DisposalEntry, GeoPoint, ProfileStore, ServiceOptions, Settings,
    SortliService,
};
use sortli_provider_places::PlacesCenterPort;
use sortli_provider_vision::VisionAnnotationPort;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Screen};
use crate::input::Action;

#[derive(Debug, Parser)]
#[command(name = "sortli", version, about = "Sort waste, track your carbon savings")]
struct Args {
    /// Path to the TOML settings file
    #[arg(long, env = "SORTLI_CONFIG", default_value = "sortli.toml")]
    config: PathBuf,

    /// Latitude used for the nearby center search
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude used for the nearby center search
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Name shown on the progress screen; renames a stored profile
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(Some(args.config.as_path()))
        .with_context(|| format!("loading {}", args.config.display()))?;

    // The terminal owns stdout, so logs go to a file
    let log_file = File::create(&settings.log_file)
        .with_context(|| format!("creating log file {}", settings.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    // HTTP + service setup
    let client = Client::builder()
        .user_agent("sortli/0.1")
        .timeout(settings.request_timeout())
        .build()?;

    let mut backends = Backends::offline();
    if let Some(key) = &settings.vision_api_key {
        backends = backends.with_annotations(Arc::new(VisionAnnotationPort::new(
            client.clone(),
            key.as_str(),
        )));
    }
    if let Some(key) = &settings.places_api_key {
        backends = backends.with_centers(Arc::new(PlacesCenterPort::new(client, key.as_str())));
    }

    let service = Arc::new(SortliService::new(
        Arc::new(Catalog::standard()),
        backends,
        ServiceOptions::from(&settings),
    ));

    let location = args.lat.zip(args.lng).map(|(lat, lng)| GeoPoint::new(lat, lng));
    info!(?location, radius_km = settings.search_radius_km, "Starting sortli");

    // Stored progress
    let store = ProfileStore::new(&settings.profile_file);
    let profile = store
        .load_or_new(args.name.as_deref())
        .with_context(|| format!("loading profile {}", store.path().display()))?;

    // App state
    let app = App::new(service, profile, location, settings.search_radius_km);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app, &store).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    store: &ProfileStore,
) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::Classify => {
                    let waste = match app.capture_input() {
                        Ok(waste) => waste,
                        Err(message) => {
                            app.error_message = Some(message);
                            continue;
                        }
                    };
                    if let Err(message) = app.weight_kg() {
                        app.error_message = Some(message);
                        continue;
                    }

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let classification = app.service.classify(waste).await;

                    app.is_loading = false;
                    if classification.is_fallback() {
                        app.error_message =
                            Some("Classification uncertain, correct it with ↑/↓".into());
                    }
                    app.category_override = None;
                    app.classification = Some(classification);
                    app.screen = Screen::Review;
                }
                Action::LogDisposal => {
                    let Some(result) = app.reviewed_result() else {
                        app.error_message = Some("Classify something first".into());
                        continue;
                    };
                    let weight_kg = match app.weight_kg() {
                        Ok(weight_kg) => weight_kg,
                        Err(message) => {
                            app.error_message = Some(message);
                            continue;
                        }
                    };

                    let entry = DisposalEntry {
                        result,
                        weight_kg,
                        disposal: app.disposal,
                        location: app.location,
                    };
                    let receipt = app.service.log_disposal(&mut app.profile, entry);
                    app.clear_review();

                    app.error_message = match store.save(&app.profile) {
                        Ok(()) => None,
                        Err(err) => {
                            warn!("Could not save profile: {err}");
                            Some(format!("Progress not saved: {err}"))
                        }
                    };
                    app.last_receipt = Some(receipt);
                    app.image_path.clear();
                    app.screen = Screen::Progress;
                }
                Action::LoadCenters => {
                    let Some(origin) = app.location else {
                        app.error_message =
                            Some("Start sortli with --lat and --lng to search nearby".into());
                        continue;
                    };
                    let category = app
                        .last_receipt
                        .as_ref()
                        .map(|receipt| receipt.record.category);

                    app.screen = Screen::Centers;
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    app.centers = app
                        .service
                        .nearby_centers(origin, app.search_radius_km, category)
                        .await;

                    app.is_loading = false;
                }
            }
        }
    }

    Ok(())
}
