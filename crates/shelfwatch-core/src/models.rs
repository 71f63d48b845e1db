use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar dates travel as ISO "YYYY-MM-DD" strings
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A tracked pantry item - the star of the show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque unique id, assigned at creation, never changes
    pub id: String,
    pub name: String,
    pub qty: u32,
    /// Free-text category; "perishable" anywhere in it marks the item perishable
    pub category: String,
    /// Purchase date, ISO "YYYY-MM-DD"
    pub purchase: String,
    /// Expiry date, ISO "YYYY-MM-DD". Kept as the raw string: a malformed
    /// value loaded from disk surfaces as a scan warning instead of making
    /// the whole collection unloadable.
    pub expiry: String,
    /// Which notification tiers have already fired for this item
    #[serde(default)]
    pub flags: NotificationFlags,
}

impl Item {
    /// Build a normalized item from raw input. Blank names, missing
    /// quantities and missing purchase dates get the documented defaults.
    pub fn from_draft(draft: ItemDraft, today: NaiveDate) -> Self {
        let name = draft
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unnamed item".to_string());

        let purchase = draft
            .purchase
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            qty: draft.qty.filter(|&q| q > 0).unwrap_or(1),
            category: draft.category.unwrap_or_default(),
            purchase,
            expiry: draft.expiry,
            flags: NotificationFlags::default(),
        }
    }

    pub fn is_perishable(&self) -> bool {
        self.category.to_lowercase().contains("perish")
    }

    pub fn expiry_date(&self) -> crate::Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.expiry, DATE_FORMAT).map_err(|_| {
            crate::Error::InvalidDate {
                field: "expiry",
                value: self.expiry.clone(),
            }
        })
    }

    pub fn purchase_date(&self) -> crate::Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.purchase, DATE_FORMAT).map_err(|_| {
            crate::Error::InvalidDate {
                field: "purchase",
                value: self.purchase.clone(),
            }
        })
    }
}

/// Raw input for a new or edited item, before normalization
///
/// Everything except the expiry date is optional; defaults are applied when
/// the tracker takes the draft in.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub name: Option<String>,
    pub qty: Option<u32>,
    pub category: Option<String>,
    pub purchase: Option<String>,
    pub expiry: String,
}

/// Per-item record of which notification tiers have fired
///
/// Monotonic under scan: tiers only ever get set, never cleared. The one
/// exception is an explicit edit under `EditPolicy::ResetOnExpiryChange`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFlags {
    #[serde(default)]
    pub near_expiry_24h: bool,
    #[serde(default)]
    pub reminder_72h: bool,
    #[serde(default)]
    pub expired: bool,
}

impl NotificationFlags {
    pub fn is_set(&self, tier: Tier) -> bool {
        match tier {
            Tier::NearExpiry => self.near_expiry_24h,
            Tier::Reminder => self.reminder_72h,
            Tier::Expired => self.expired,
        }
    }

    pub fn mark(&mut self, tier: Tier) {
        match tier {
            Tier::NearExpiry => self.near_expiry_24h = true,
            Tier::Reminder => self.reminder_72h = true,
            Tier::Expired => self.expired = true,
        }
    }
}

/// The three notification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    NearExpiry,
    Reminder,
    Expired,
}

impl Tier {
    /// Notification title for this tier
    pub fn title(&self) -> &'static str {
        match self {
            Tier::NearExpiry => "Item near expiry",
            Tier::Reminder => "Expiry reminder",
            Tier::Expired => "Item expired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::NearExpiry => "near-expiry",
            Tier::Reminder => "reminder",
            Tier::Expired => "expired",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Presentation-tier urgency bucket
///
/// Display labelling only - the scan thresholds in the tracker are what
/// actually gate notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    /// 1 day or less (or already expired)
    High,
    /// 2 to 4 days
    Mid,
    /// 5 days or more
    Low,
}

impl Urgency {
    pub fn from_days_left(days_left: i64) -> Self {
        if days_left <= 1 {
            Urgency::High
        } else if days_left <= 4 {
            Urgency::Mid
        } else {
            Urgency::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Mid => "mid",
            Urgency::Low => "low",
        }
    }

    pub fn color_code(&self) -> &'static str {
        match self {
            Urgency::High => "red",
            Urgency::Mid => "yellow",
            Urgency::Low => "green",
        }
    }
}

/// A WGS84 point
///
/// Absence of a coordinate (location unknown) is a valid state threaded as
/// `Option<Coordinate>`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A donation center from the catalog. Static data, read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationCenter {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

impl DonationCenter {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// One notification decision from a scan
///
/// The engine decides *whether* and *what* to notify; delivery belongs to
/// the Notifier collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub tier: Tier,
    pub item_id: String,
    pub item_name: String,
    pub days_left: i64,
    pub body: String,
}

impl Notification {
    pub fn new(tier: Tier, item: &Item, days_left: i64) -> Self {
        let body = match tier {
            Tier::NearExpiry => format!(
                "{} expires in {} day(s). Consider using or donating.",
                item.name, days_left
            ),
            Tier::Reminder => format!("{} expires in {} days.", item.name, days_left),
            Tier::Expired => format!("{} is expired. Remove or dispose safely.", item.name),
        };

        Self {
            tier,
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            days_left,
            body,
        }
    }

    pub fn title(&self) -> &'static str {
        self.tier.title()
    }
}

/// A malformed field spotted during a scan. Soft failure: the item is
/// skipped for notification purposes, the rest of the batch proceeds.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityWarning {
    pub item_id: String,
    pub item_name: String,
    pub field: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_draft_normalization_defaults() {
        let item = Item::from_draft(
            ItemDraft {
                expiry: "2025-06-01".to_string(),
                ..Default::default()
            },
            date("2025-05-20"),
        );

        assert_eq!(item.name, "Unnamed item");
        assert_eq!(item.qty, 1);
        assert_eq!(item.category, "");
        assert_eq!(item.purchase, "2025-05-20");
        assert_eq!(item.expiry, "2025-06-01");
        assert_eq!(item.flags, NotificationFlags::default());
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_draft_zero_qty_becomes_one() {
        let item = Item::from_draft(
            ItemDraft {
                name: Some("Milk".to_string()),
                qty: Some(0),
                expiry: "2025-06-01".to_string(),
                ..Default::default()
            },
            date("2025-05-20"),
        );
        assert_eq!(item.qty, 1);
    }

    #[test]
    fn test_draft_blank_name_becomes_unnamed() {
        let item = Item::from_draft(
            ItemDraft {
                name: Some("   ".to_string()),
                expiry: "2025-06-01".to_string(),
                ..Default::default()
            },
            date("2025-05-20"),
        );
        assert_eq!(item.name, "Unnamed item");
    }

    #[test]
    fn test_is_perishable_substring_case_insensitive() {
        let mut item = Item::from_draft(
            ItemDraft {
                name: Some("Milk".to_string()),
                category: Some("Perishable".to_string()),
                expiry: "2025-06-01".to_string(),
                ..Default::default()
            },
            date("2025-05-20"),
        );
        assert!(item.is_perishable());

        item.category = "non-PERISHABLE".to_string();
        assert!(item.is_perishable()); // substring match, "non-perishable" also hits

        item.category = "Staple".to_string();
        assert!(!item.is_perishable());
    }

    #[test]
    fn test_expiry_date_parse_failure() {
        let mut item = Item::from_draft(
            ItemDraft {
                expiry: "not-a-date".to_string(),
                ..Default::default()
            },
            date("2025-05-20"),
        );
        assert!(item.expiry_date().is_err());

        item.expiry = "2025-06-01".to_string();
        assert_eq!(item.expiry_date().unwrap(), date("2025-06-01"));
    }

    #[test]
    fn test_flags_mark_and_is_set() {
        let mut flags = NotificationFlags::default();
        assert!(!flags.is_set(Tier::NearExpiry));

        flags.mark(Tier::NearExpiry);
        flags.mark(Tier::Expired);
        assert!(flags.is_set(Tier::NearExpiry));
        assert!(flags.is_set(Tier::Expired));
        assert!(!flags.is_set(Tier::Reminder));

        // Marking twice is a no-op, not a toggle
        flags.mark(Tier::NearExpiry);
        assert!(flags.is_set(Tier::NearExpiry));
    }

    #[test]
    fn test_flags_deserialize_default_when_absent() {
        // Snapshots from before flag tracking still import cleanly
        let json = r#"{
            "id": "a",
            "name": "Milk",
            "qty": 1,
            "category": "Perishable",
            "purchase": "2025-05-20",
            "expiry": "2025-06-01"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.flags, NotificationFlags::default());
    }

    #[test]
    fn test_urgency_buckets() {
        assert_eq!(Urgency::from_days_left(-3), Urgency::High);
        assert_eq!(Urgency::from_days_left(0), Urgency::High);
        assert_eq!(Urgency::from_days_left(1), Urgency::High);
        assert_eq!(Urgency::from_days_left(2), Urgency::Mid);
        assert_eq!(Urgency::from_days_left(4), Urgency::Mid);
        assert_eq!(Urgency::from_days_left(5), Urgency::Low);
        assert_eq!(Urgency::from_days_left(365), Urgency::Low);
    }
}
