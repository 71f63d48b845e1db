// Scan orchestration - wires the tracker to its collaborators
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::notify::Notifier;
use crate::store::ItemStore;
use crate::tracker::{ExpiryTracker, ScanOutcome};
use crate::Result;

/// Runs scans against the collaborator seams: notification decisions go out
/// through the Notifier, updated flag state goes back through the ItemStore.
pub struct ScanService {
    tracker: ExpiryTracker,
    store: Option<Arc<dyn ItemStore>>,
    notifier: Box<dyn Notifier>,
}

impl ScanService {
    pub fn new(tracker: ExpiryTracker, notifier: Box<dyn Notifier>) -> Self {
        Self {
            tracker,
            store: None,
            notifier,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ItemStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Load the collection from the store and build the service around it
    pub fn from_store(store: Arc<dyn ItemStore>, notifier: Box<dyn Notifier>) -> Result<Self> {
        let items = store.load()?;
        debug!("loaded {} items from store", items.len());
        Ok(Self {
            tracker: ExpiryTracker::with_items(items),
            store: Some(store),
            notifier,
        })
    }

    pub fn tracker(&self) -> &ExpiryTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ExpiryTracker {
        &mut self.tracker
    }

    /// One scheduler tick: scan, deliver, persist.
    ///
    /// A failed delivery is logged and does not roll back flag state - a
    /// tier that was decided stays decided, so it will not re-fire even if
    /// nobody saw it. The save is likewise fire-and-forget.
    pub fn tick(&mut self, today: NaiveDate) -> ScanOutcome {
        let outcome = self.tracker.scan(today);

        for warning in &outcome.warnings {
            warn!(
                "skipping {} ({}): {}",
                warning.item_name, warning.item_id, warning.message
            );
        }

        for notification in &outcome.notifications {
            if let Err(e) =
                self.notifier
                    .deliver(notification.tier, notification.title(), &notification.body)
            {
                warn!(
                    "delivery failed for {} ({}): {}",
                    notification.item_name, notification.tier, e
                );
            }
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.save(self.tracker.items()) {
                warn!("failed to persist items after scan: {}", e);
            }
        }

        if outcome.notifications.is_empty() {
            debug!("scan finished quietly");
        } else {
            info!("scan emitted {} notifications", outcome.notifications.len());
        }

        outcome
    }

    /// Persist the current collection through the store, if one is attached
    pub fn persist(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(self.tracker.items())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemDraft, DATE_FORMAT};
    use crate::notify::MockNotifier;
    use crate::store::MockItemStore;
    use crate::Error;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn tracker_with(name: &str, expiry: &str) -> ExpiryTracker {
        let mut tracker = ExpiryTracker::new();
        tracker.add(
            ItemDraft {
                name: Some(name.to_string()),
                expiry: expiry.to_string(),
                ..Default::default()
            },
            date("2025-01-01"),
        );
        tracker
    }

    #[test]
    fn test_tick_delivers_and_persists() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_deliver()
            .times(2) // near-expiry + expired for a day-0 item
            .returning(|_, _, _| Ok(()));

        let mut store = MockItemStore::new();
        store.expect_save().times(1).returning(|_| Ok(()));

        let mut service = ScanService::new(tracker_with("Milk", "2025-01-01"), Box::new(notifier))
            .with_store(Arc::new(store));

        let outcome = service.tick(date("2025-01-01"));
        assert_eq!(outcome.notifications.len(), 2);
    }

    #[test]
    fn test_delivery_failure_keeps_flags_set() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_deliver()
            .returning(|_, _, _| Err(Error::DeliveryError("transport down".to_string())));

        let mut service = ScanService::new(tracker_with("Milk", "2025-01-01"), Box::new(notifier));

        let first = service.tick(date("2025-01-01"));
        assert_eq!(first.notifications.len(), 2);

        // Flags stuck even though nothing was delivered: at-most-once wins
        // over delivery guarantees
        let second = service.tick(date("2025-01-01"));
        assert!(second.notifications.is_empty());
        assert!(service.tracker().items()[0].flags.near_expiry_24h);
        assert!(service.tracker().items()[0].flags.expired);
    }

    #[test]
    fn test_store_failure_does_not_abort_tick() {
        let mut notifier = MockNotifier::new();
        notifier.expect_deliver().returning(|_, _, _| Ok(()));

        let mut store = MockItemStore::new();
        store
            .expect_save()
            .returning(|_| Err(Error::StoreError("disk full".to_string())));

        let mut service = ScanService::new(tracker_with("Milk", "2025-01-01"), Box::new(notifier))
            .with_store(Arc::new(store));

        let outcome = service.tick(date("2025-01-01"));
        assert_eq!(outcome.notifications.len(), 2);
    }

    #[test]
    fn test_from_store_loads_collection() {
        let items = {
            let tracker = tracker_with("Milk", "2025-01-03");
            tracker.into_items()
        };

        let mut store = MockItemStore::new();
        let loaded = items.clone();
        store.expect_load().returning(move || Ok(loaded.clone()));
        store.expect_save().returning(|_| Ok(()));

        let notifier = MockNotifier::new();
        let service = ScanService::from_store(Arc::new(store), Box::new(notifier)).unwrap();
        assert_eq!(service.tracker().items(), items.as_slice());
    }
}
