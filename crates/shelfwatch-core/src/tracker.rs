// Expiry tracking engine - classifies every item and fires each
// notification tier exactly once
use chrono::NaiveDate;
use tracing::debug;

use crate::models::{
    DataQualityWarning, Item, ItemDraft, Notification, NotificationFlags, Tier,
};
use crate::{Error, Result};

/// Whole-day difference between today and an expiry date.
///
/// Calendar dates carry no time-of-day, so any partial day remaining counts
/// as a full day - the warning always lands early rather than late.
/// Zero means "expires today", negative means already expired.
pub fn days_until(today: NaiveDate, expiry: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Everything one scan pass produced: notification decisions plus
/// data-quality warnings for items it had to skip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub notifications: Vec<Notification>,
    pub warnings: Vec<DataQualityWarning>,
}

impl ScanOutcome {
    pub fn is_quiet(&self) -> bool {
        self.notifications.is_empty() && self.warnings.is_empty()
    }
}

/// What happens to already-fired notification flags when an edit changes an
/// item's expiry date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditPolicy {
    /// Clear every tier flag when the expiry date changes, so the item is
    /// re-evaluated from scratch on the next scan. An extended expiry earns
    /// fresh warnings instead of staying silent forever.
    #[default]
    ResetOnExpiryChange,
    /// Leave flags untouched. A tier that fired once never fires again for
    /// this item, whatever the new expiry says.
    PreserveFlags,
}

/// Headline counts for the collection, computed against an injected date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerStats {
    pub total: usize,
    /// Items expiring within 3 days (unparseable dates don't count)
    pub expiring_soon: usize,
    pub perishable: usize,
}

/// Shopping hint: too many perishables on the clock at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestockSuggestion {
    pub perishable_expiring: usize,
}

impl RestockSuggestion {
    pub fn message(&self) -> String {
        format!(
            "You have {} perishable items expiring soon. Buy fewer fresh items this week \
             (keep staples like rice, lentils, canned veg) and consider donating what you \
             can't consume.",
            self.perishable_expiring
        )
    }
}

/// Owns the tracked item collection and all flag state.
///
/// The only mutators are add, update, remove and scan. The periodic trigger
/// lives with the caller; scan itself is deterministic in (items, today).
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    items: Vec<Item>,
}

impl ExpiryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Normalize a draft into a new item and start tracking it.
    /// Returns a reference to the stored item (its id is freshly assigned).
    pub fn add(&mut self, draft: ItemDraft, today: NaiveDate) -> &Item {
        let item = Item::from_draft(draft, today);
        debug!("tracking new item {} ({})", item.name, item.id);
        self.items.push(item);
        self.items.last().unwrap()
    }

    /// Replace an item's fields from a draft. The id stays stable; flag
    /// handling follows the given policy.
    pub fn update(
        &mut self,
        id: &str,
        draft: ItemDraft,
        today: NaiveDate,
        policy: EditPolicy,
    ) -> Result<&Item> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let expiry_changed = item.expiry != draft.expiry;

        let mut updated = Item::from_draft(draft, today);
        updated.id = item.id.clone();
        updated.flags = if expiry_changed && policy == EditPolicy::ResetOnExpiryChange {
            NotificationFlags::default()
        } else {
            item.flags
        };

        *item = updated;
        Ok(&*item)
    }

    /// Stop tracking an item, returning it
    pub fn remove(&mut self, id: &str) -> Result<Item> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Evaluate every item against the notification tiers.
    ///
    /// Tier order per item:
    /// 1. days left <= 1 and near-expiry not yet fired
    /// 2. otherwise, days left <= 3 and reminder not yet fired
    /// 3. independently, days left <= 0 and expired not yet fired
    ///
    /// Each tier fires at most once per item, ever - repeating the scan with
    /// unchanged items and date emits nothing new. Items whose expiry string
    /// won't parse are skipped with a warning; the rest of the batch runs.
    pub fn scan(&mut self, today: NaiveDate) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for item in &mut self.items {
            let expiry = match item.expiry_date() {
                Ok(date) => date,
                Err(err) => {
                    outcome.warnings.push(DataQualityWarning {
                        item_id: item.id.clone(),
                        item_name: item.name.clone(),
                        field: "expiry",
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            let days_left = days_until(today, expiry);

            if days_left <= 1 && !item.flags.is_set(Tier::NearExpiry) {
                item.flags.mark(Tier::NearExpiry);
                outcome
                    .notifications
                    .push(Notification::new(Tier::NearExpiry, item, days_left));
            } else if days_left <= 3 && !item.flags.is_set(Tier::Reminder) {
                item.flags.mark(Tier::Reminder);
                outcome
                    .notifications
                    .push(Notification::new(Tier::Reminder, item, days_left));
            }

            if days_left <= 0 && !item.flags.is_set(Tier::Expired) {
                item.flags.mark(Tier::Expired);
                outcome
                    .notifications
                    .push(Notification::new(Tier::Expired, item, days_left));
            }
        }

        outcome
    }

    pub fn stats(&self, today: NaiveDate) -> TrackerStats {
        let expiring_soon = self
            .items
            .iter()
            .filter(|item| {
                item.expiry_date()
                    .map(|expiry| days_until(today, expiry) <= 3)
                    .unwrap_or(false)
            })
            .count();

        TrackerStats {
            total: self.items.len(),
            expiring_soon,
            perishable: self.items.iter().filter(|i| i.is_perishable()).count(),
        }
    }

    /// Suggest easing up on fresh goods when two or more perishables are
    /// expiring within 3 days.
    pub fn restock_suggestion(&self, today: NaiveDate) -> Option<RestockSuggestion> {
        let perishable_expiring = self
            .items
            .iter()
            .filter(|item| {
                item.is_perishable()
                    && item
                        .expiry_date()
                        .map(|expiry| days_until(today, expiry) <= 3)
                        .unwrap_or(false)
            })
            .count();

        if perishable_expiring >= 2 {
            Some(RestockSuggestion {
                perishable_expiring,
            })
        } else {
            None
        }
    }

    /// Items in display order: soonest expiry first, unparseable dates last.
    /// Ties keep insertion order.
    pub fn sorted_by_expiry(&self) -> Vec<&Item> {
        let mut sorted: Vec<&Item> = self.items.iter().collect();
        sorted.sort_by_key(|item| match item.expiry_date() {
            Ok(date) => (false, Some(date)),
            Err(_) => (true, None),
        });
        sorted
    }
}
