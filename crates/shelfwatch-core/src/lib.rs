// Core business logic lives here - the brain of the operation
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod models;
pub mod notify;
pub mod providers;
pub mod service;
pub mod store;
pub mod tracker;

pub use config::Config;
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use matcher::{distance_km, DonationMatcher, RankedCenter, Ranking};
pub use models::{
    Coordinate, DonationCenter, Item, ItemDraft, Notification, NotificationFlags, Tier, Urgency,
};
pub use notify::{LogNotifier, Notifier};
pub use providers::LocationProvider;
pub use service::ScanService;
pub use store::{ItemStore, SqliteItemStore};
pub use tracker::{days_until, EditPolicy, ExpiryTracker, ScanOutcome};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
