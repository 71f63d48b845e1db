use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfwatch_core::providers::{FixedProvider, GeoIpProvider};
use shelfwatch_core::tracker::EditPolicy;
use shelfwatch_core::{
    Config, Coordinate, DonationMatcher, Exporter, ItemDraft, LocationProvider, Notifier, Ranking,
    ScanService, SqliteItemStore, Tier, Urgency,
};

#[derive(Parser)]
#[command(name = "shelfwatch")]
#[command(version, about = "Pantry expiry tracker with donation suggestions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Track a new item
    Add {
        name: String,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires: String,
        #[arg(long)]
        qty: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        /// Purchase date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        purchased: Option<String>,
    },
    /// List tracked items, soonest expiry first
    List,
    /// Edit an item; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        expires: Option<String>,
        #[arg(long)]
        qty: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        purchased: Option<String>,
        /// Keep already-fired notification flags even if the expiry changed
        #[arg(long)]
        keep_flags: bool,
    },
    /// Stop tracking an item
    Remove { id: String },
    /// Run a single expiry scan
    Scan,
    /// Scan on a fixed interval until interrupted
    Watch {
        /// Seconds between scans (overrides the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// List donation centers ranked by distance from here
    Centers,
    /// Suggest the nearest donation center for an item
    Donate { id: String },
    /// Shopping suggestion based on what's about to expire
    Suggest,
    /// Export the item list (.json, .csv or .md by extension)
    Export { path: PathBuf },
    /// Import items from a JSON export, replacing the current list
    Import { path: PathBuf },
}

/// Prints notifications to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn deliver(&self, tier: Tier, title: &str, body: &str) -> shelfwatch_core::Result<()> {
        println!("[{}] {}: {}", tier, title, body);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let db_path = Config::db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store: Arc<SqliteItemStore> = Arc::new(SqliteItemStore::open(&db_path)?);
    let mut service = ScanService::from_store(store, Box::new(ConsoleNotifier))?;

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Add {
            name,
            expires,
            qty,
            category,
            purchased,
        } => {
            let item = service.tracker_mut().add(
                ItemDraft {
                    name: Some(name),
                    qty,
                    category,
                    purchase: purchased,
                    expiry: expires,
                },
                today,
            );
            println!("Tracking {} (id {})", item.name, item.id);
            service.persist()?;
        }

        Commands::List => {
            cmd_list(&service, today);
        }

        Commands::Edit {
            id,
            name,
            expires,
            qty,
            category,
            purchased,
            keep_flags,
        } => {
            let current = service
                .tracker()
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("no item with id {}", id))?
                .clone();

            let draft = ItemDraft {
                name: Some(name.unwrap_or(current.name)),
                qty: Some(qty.unwrap_or(current.qty)),
                category: Some(category.unwrap_or(current.category)),
                purchase: Some(purchased.unwrap_or(current.purchase)),
                expiry: expires.unwrap_or(current.expiry),
            };
            let policy = if keep_flags {
                EditPolicy::PreserveFlags
            } else {
                EditPolicy::ResetOnExpiryChange
            };

            let item = service.tracker_mut().update(&id, draft, today, policy)?;
            println!("Updated {}", item.name);
            service.persist()?;
        }

        Commands::Remove { id } => {
            let item = service.tracker_mut().remove(&id)?;
            println!("Stopped tracking {}", item.name);
            service.persist()?;
        }

        Commands::Scan => {
            let outcome = service.tick(today);
            println!(
                "Scan complete: {} notification(s), {} warning(s)",
                outcome.notifications.len(),
                outcome.warnings.len()
            );
        }

        Commands::Watch { interval } => {
            let secs = interval.unwrap_or(config.scan.interval_secs);
            watch(&mut service, secs).await;
        }

        Commands::Centers => {
            let here = current_location(&config).await;
            let matcher = DonationMatcher::new(config.centers.clone());
            match matcher.rank(here) {
                Ranking::LocationUnknown => {
                    println!("Location unknown. Set [location].home in the config or check the network.");
                }
                Ranking::Ranked(ranked) => {
                    for entry in ranked {
                        println!(
                            "{:>7.1} km  {} ({})",
                            entry.distance_km, entry.center.name, entry.center.address
                        );
                    }
                }
            }
        }

        Commands::Donate { id } => {
            let item = service
                .tracker()
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("no item with id {}", id))?;

            let here = current_location(&config).await;
            let matcher = DonationMatcher::new(config.centers.clone());
            let ranking = matcher.rank(here);
            if ranking.is_location_unknown() {
                println!(
                    "Can't rank donation centers for {}: location unknown.",
                    item.name
                );
            } else {
                match ranking.nearest() {
                    Some(nearest) => println!(
                        "Item {:?} (x{}): nearest donation center is {}, {:.1} km away.",
                        item.name, item.qty, nearest.center.name, nearest.distance_km
                    ),
                    None => println!("No donation centers configured."),
                }
            }
        }

        Commands::Suggest => match service.tracker().restock_suggestion(today) {
            Some(suggestion) => println!("{}", suggestion.message()),
            None => println!("No strong suggestion. Your tracked items look fine."),
        },

        Commands::Export { path } => {
            Exporter::export_to_file(service.tracker().items(), &path)?;
            println!(
                "Exported {} item(s) to {}",
                service.tracker().len(),
                path.display()
            );
        }

        Commands::Import { path } => {
            let items = Exporter::import_from_file(&path)?;
            let count = items.len();
            *service.tracker_mut() = shelfwatch_core::ExpiryTracker::with_items(items);
            service.persist()?;
            println!("Imported {} item(s) from {}", count, path.display());
        }
    }

    Ok(())
}

fn cmd_list(service: &ScanService, today: NaiveDate) {
    let tracker = service.tracker();
    if tracker.is_empty() {
        println!("No items tracked yet.");
        return;
    }

    for item in tracker.sorted_by_expiry() {
        match item.expiry_date() {
            Ok(expiry) => {
                let days_left = shelfwatch_core::days_until(today, expiry);
                let urgency = Urgency::from_days_left(days_left);
                let badge = if days_left <= 0 {
                    "expired".to_string()
                } else {
                    format!("{}d", days_left)
                };
                println!(
                    "{}  {:<24} x{:<3} {:<16} expires {} ({}, {})",
                    item.id,
                    item.name,
                    item.qty,
                    item.category,
                    item.expiry,
                    badge,
                    urgency.label()
                );
            }
            Err(_) => {
                warn!("item {} has an unparseable expiry date", item.id);
                println!(
                    "{}  {:<24} x{:<3} {:<16} expiry {:?} (unreadable)",
                    item.id, item.name, item.qty, item.category, item.expiry
                );
            }
        }
    }

    let stats = tracker.stats(today);
    println!(
        "\nTotal: {}  Expiring within 3 days: {}  Perishable: {}",
        stats.total, stats.expiring_soon, stats.perishable
    );
}

/// Periodic scan loop. Ctrl-C stops it; starting and stopping again is safe.
async fn watch(service: &mut ScanService, secs: u64) {
    info!("watching every {}s, ctrl-c to stop", secs);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let today = Local::now().date_naive();
                let outcome = service.tick(today);
                if !outcome.warnings.is_empty() {
                    warn!("{} item(s) skipped for bad dates", outcome.warnings.len());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping watch loop");
                break;
            }
        }
    }
}

/// Resolve the current coordinate: configured home first, geoip fallback
async fn current_location(config: &Config) -> Option<Coordinate> {
    let provider: Box<dyn LocationProvider> = match config.location.home {
        Some(home) => Box::new(FixedProvider::new(home)),
        None => Box::new(GeoIpProvider::new(
            config.location.geoip_url.clone(),
            Duration::from_secs(config.location.timeout_secs),
        )),
    };
    provider.current().await
}
