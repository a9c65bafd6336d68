//! `handsup` - campsites, hazard warnings and SOS messages from the terminal

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

use handsup::campsites::validate_draft;
use handsup::emergency::{RegionPreference, build_sos_message};
use handsup::models::campsite::{MAX_RATING, MIN_RATING};
use handsup::models::{CampsiteCategory, format_distance};
use handsup::{
    AustralianState, CampsiteDraft, CampsiteStore, ContactRegistry, Coordinates, EmergencyContact,
    EmergencyTemplate, EmergencyWarning, FjallStore, HandsUpConfig, HandsUpError, KeyValueStore,
    SosAlert, WarningAggregator, WarningSnapshot,
};

#[derive(Parser, Debug)]
#[command(
    name = "handsup",
    version,
    about = "Emergency companion for campers and hikers"
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage saved campsites
    Campsite {
        #[command(subcommand)]
        command: CampsiteCommand,
    },
    /// Fetch current hazard warnings once
    Warnings {
        #[command(flatten)]
        position: PositionArgs,

        /// Radius around the position in kilometres
        #[arg(long)]
        radius: Option<f64>,

        /// Only severe and critical warnings
        #[arg(long)]
        critical: bool,
    },
    /// Keep refreshing warnings until interrupted
    Watch {
        #[command(flatten)]
        position: PositionArgs,

        #[arg(long)]
        radius: Option<f64>,
    },
    /// Manage emergency contacts
    Contacts {
        #[command(subcommand)]
        command: ContactCommand,
    },
    /// Preview the SOS message and its recipients
    Sos {
        /// Emergency template title, e.g. "Snake Bite"
        #[arg(long, default_value = "General Emergency")]
        template: String,

        #[command(flatten)]
        position: PositionArgs,
    },
    /// List the emergency message templates
    Templates,
    /// Show or change the state whose warnings are monitored
    State {
        #[command(subcommand)]
        command: StateCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CampsiteCommand {
    /// Save a new campsite
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// 1 to 5 stars
        #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
        rating: i32,
        #[arg(long, value_parser = parse_category)]
        category: Option<CampsiteCategory>,
        #[arg(long)]
        cost: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        accessible: bool,
    },
    /// List saved campsites
    List {
        #[arg(long, value_parser = parse_category)]
        category: Option<CampsiteCategory>,
        /// Only free campsites
        #[arg(long)]
        free: bool,
        #[arg(long)]
        accessible: bool,
    },
    /// Search names, addresses and notes
    Search { query: String },
    /// Best-rated campsites near a position
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete a campsite by id
    Remove { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum ContactCommand {
    Add {
        name: String,
        #[arg(required = true)]
        phone_numbers: Vec<String>,
    },
    List,
    /// Remove by position in the list, starting at 1
    Remove { position: usize },
}

#[derive(Subcommand, Debug)]
enum StateCommand {
    Show,
    /// Select by name or abbreviation, e.g. "NSW"
    Select { state: String },
}

#[derive(Args, Debug)]
struct PositionArgs {
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

fn parse_category(value: &str) -> std::result::Result<CampsiteCategory, String> {
    let wanted = value.trim().replace(['-', '_'], " ");
    CampsiteCategory::ALL
        .into_iter()
        .find(|category| category.label().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| {
            format!(
                "unknown category '{}', expected one of: {}",
                value,
                CampsiteCategory::ALL.map(CampsiteCategory::label).join(", ")
            )
        })
}

struct App {
    config: HandsUpConfig,
    backend: Arc<dyn KeyValueStore>,
    json: bool,
}

impl App {
    fn selected_state(&self) -> Result<AustralianState> {
        let fallback = self.config.defaults.australian_state()?;
        Ok(RegionPreference::open(self.backend.clone(), fallback).selected())
    }

    fn print_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<HandsUpError>() {
            Some(err) => eprintln!("{}", err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = HandsUpConfig::load_from_path(cli.config)?;
    handsup::telemetry::init(&config.logging)?;

    let location = config.storage.resolved_path();
    let backend: Arc<dyn KeyValueStore> = Arc::new(
        FjallStore::open(&location)
            .with_context(|| format!("Failed to open storage at {}", location.display()))?,
    );

    let app = App {
        config,
        backend,
        json: cli.json,
    };

    match cli.command {
        Command::Campsite { command } => run_campsite(&app, command),
        Command::Warnings {
            position,
            radius,
            critical,
        } => run_warnings(&app, position.coordinates(), radius, critical).await,
        Command::Watch { position, radius } => {
            run_watch(&app, position.coordinates(), radius).await
        }
        Command::Contacts { command } => run_contacts(&app, command),
        Command::Sos { template, position } => run_sos(&app, &template, position.coordinates()),
        Command::Templates => {
            for template in EmergencyTemplate::camping_templates() {
                println!("{} {}", template.emoji, template.title);
            }
            Ok(())
        }
        Command::State { command } => run_state(&app, command),
    }
}

fn run_campsite(app: &App, command: CampsiteCommand) -> Result<()> {
    let mut store = CampsiteStore::open(app.backend.clone());

    match command {
        CampsiteCommand::Add {
            name,
            address,
            lat,
            lon,
            rating,
            category,
            cost,
            notes,
            accessible,
        } => {
            let mut draft = CampsiteDraft::new(name, address, Coordinates::new(lat, lon));
            draft.rating = rating;
            draft.cost = cost;
            draft.notes = notes;
            draft.is_accessible = accessible;
            if let Some(category) = category {
                draft.category = category;
            }

            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                warn!(
                    "Rating {} is outside {}..={} and will be clamped",
                    rating, MIN_RATING, MAX_RATING
                );
            }

            let problems = validate_draft(&draft);
            if !problems.is_empty() {
                return Err(HandsUpError::validation(problems.join("; ")).into());
            }

            let campsite = store.add(draft);
            println!("Saved {} ({})", campsite.name, campsite.id());
        }
        CampsiteCommand::List {
            category,
            free,
            accessible,
        } => {
            let campsites: Vec<_> = store
                .filter_by_category(category)
                .into_iter()
                .filter(|c| !free || c.is_free())
                .filter(|c| !accessible || c.is_accessible)
                .collect();

            if app.json {
                return app.print_json(&campsites);
            }
            for campsite in campsites {
                println!(
                    "{}  {} [{}] {}/5  {}",
                    campsite.id(),
                    campsite.name,
                    campsite.category,
                    campsite.rating(),
                    campsite.address
                );
            }
        }
        CampsiteCommand::Search { query } => {
            let results = store.search(&query);
            if app.json {
                return app.print_json(&results);
            }
            if results.is_empty() {
                println!("No campsites match '{}'", query);
            }
            for campsite in results {
                println!("{}  {}  {}", campsite.id(), campsite.name, campsite.address);
            }
        }
        CampsiteCommand::Nearby {
            lat,
            lon,
            radius,
            limit,
        } => {
            let center = Coordinates::new(lat, lon);
            let radius = radius.unwrap_or(app.config.defaults.campsite_radius_km);
            let results = store.nearby_by_rating(&center, radius, limit);
            if app.json {
                let campsites: Vec<_> = results.iter().map(|(campsite, _)| campsite).collect();
                return app.print_json(&campsites);
            }
            println!("{} campsites within {}:", results.len(), format_distance(radius));
            for (campsite, distance) in results {
                println!(
                    "  {} {}/5 ({} away)",
                    campsite.name,
                    campsite.rating(),
                    format_distance(distance)
                );
            }
        }
        CampsiteCommand::Remove { id } => match store.remove(id) {
            Some(removed) => println!("Removed {}", removed.name),
            None => println!("No campsite with id {}", id),
        },
    }

    if let Some(error) = store.persistence_error() {
        warn!("Campsites were not saved: {}", error);
    }
    Ok(())
}

fn print_warnings(app: &App, warnings: &[&EmergencyWarning], snapshot: &WarningSnapshot) -> Result<()> {
    if app.json {
        return app.print_json(warnings);
    }
    if let Some(error) = &snapshot.error {
        eprintln!("Last refresh failed: {}", error);
    }
    if let Some(updated) = snapshot.last_updated {
        println!("Updated {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    if warnings.is_empty() {
        println!("No active warnings");
    }
    for warning in warnings {
        println!(
            "[{}] {} - {} ({})",
            warning.severity, warning.warning_type, warning.title, warning.location
        );
    }
    Ok(())
}

fn select_warnings<'a>(
    snapshot: &'a WarningSnapshot,
    position: Option<Coordinates>,
    radius_km: f64,
    critical_only: bool,
) -> Vec<&'a EmergencyWarning> {
    let mut warnings = match position {
        Some(point) => snapshot.warnings_near(&point, radius_km),
        None => snapshot.warnings.iter().collect(),
    };
    if critical_only {
        let critical = snapshot.critical_warnings();
        warnings.retain(|warning| critical.iter().any(|c| c.id == warning.id));
    }
    warnings
}

async fn run_warnings(
    app: &App,
    position: Option<Coordinates>,
    radius: Option<f64>,
    critical: bool,
) -> Result<()> {
    let state = app.selected_state()?;
    let aggregator = WarningAggregator::from_config(&app.config, state)?;
    let snapshot = aggregator.refresh().await;
    if let Some(error) = &snapshot.error {
        bail!("Could not fetch warnings for {}: {}", state, error);
    }

    let radius = radius.unwrap_or(app.config.defaults.warning_radius_km);
    print_warnings(app, &select_warnings(&snapshot, position, radius, critical), &snapshot)
}

async fn run_watch(app: &App, position: Option<Coordinates>, radius: Option<f64>) -> Result<()> {
    let state = app.selected_state()?;
    let aggregator = Arc::new(WarningAggregator::from_config(&app.config, state)?);
    let radius = radius.unwrap_or(app.config.defaults.warning_radius_km);

    let mut updates = aggregator.subscribe();
    let refresh = aggregator.spawn_periodic(Duration::from_secs(
        app.config.warnings.refresh_interval_seconds,
    ));
    info!("Watching warnings for {}, press Ctrl-C to stop", state);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.is_loading {
                    print_warnings(app, &select_warnings(&snapshot, position, radius, false), &snapshot)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping warning refresh");
                break;
            }
        }
    }

    refresh.stop();
    Ok(())
}

fn run_contacts(app: &App, command: ContactCommand) -> Result<()> {
    let mut registry = ContactRegistry::open(app.backend.clone());

    match command {
        ContactCommand::Add {
            name,
            phone_numbers,
        } => {
            registry.add(EmergencyContact::new(name.clone(), phone_numbers))?;
            println!("Added {} to emergency contacts", name);
        }
        ContactCommand::List => {
            if app.json {
                return app.print_json(registry.contacts());
            }
            if registry.contacts().is_empty() {
                println!("No emergency contacts");
            }
            for (index, contact) in registry.contacts().iter().enumerate() {
                println!("{}. {}  {}", index + 1, contact.name, contact.phone_numbers.join(", "));
            }
        }
        ContactCommand::Remove { position } => {
            match position.checked_sub(1).and_then(|index| registry.remove_at(index)) {
                Some(removed) => println!("Removed {}", removed.name),
                None => println!("No contact at position {}", position),
            }
        }
    }
    Ok(())
}

fn run_sos(app: &App, template: &str, position: Option<Coordinates>) -> Result<()> {
    let Some(template) = EmergencyTemplate::find(template) else {
        return Err(HandsUpError::not_found(format!("No emergency template named '{}'", template)).into());
    };

    let defaults = &app.config.defaults;
    let location_text = position.map_or_else(
        || "Location unavailable".to_string(),
        |point| point.emergency_text(),
    );
    let sent_at = Utc::now().with_timezone(&defaults.time_zone()?);
    let registry = ContactRegistry::open(app.backend.clone());

    match SosAlert::prepare(
        &registry,
        template,
        &defaults.user_name,
        &location_text,
        &sent_at,
        &defaults.emergency_number,
    ) {
        Ok(alert) => {
            if app.json {
                return app.print_json(&alert);
            }
            println!("To: {}\n", alert.recipients.join(", "));
            println!("{}", alert.body);
        }
        Err(e) => {
            warn!("{}", e);
            println!(
                "{}",
                build_sos_message(
                    template,
                    &defaults.user_name,
                    &location_text,
                    &sent_at,
                    &defaults.emergency_number
                )
            );
            return Err(e.into());
        }
    }
    Ok(())
}

fn run_state(app: &App, command: StateCommand) -> Result<()> {
    let fallback = app.config.defaults.australian_state()?;
    let mut region = RegionPreference::open(app.backend.clone(), fallback);

    match command {
        StateCommand::Show => {
            let state = region.selected();
            println!("{} ({})", state, state.abbreviation());
            println!("Fire service: {}", state.fire_service_name());
            println!("Warnings feed: {}", app.config.warnings.feed_url_for(state));
        }
        StateCommand::Select { state } => {
            let Some(state) = AustralianState::from_name(&state) else {
                return Err(HandsUpError::validation(format!("Unknown state '{}'", state)).into());
            };
            region.select(state);
            println!("Monitoring {}", state);
        }
    }
    Ok(())
}
