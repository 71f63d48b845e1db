// Item persistence seam. The engine never does I/O itself - it hands the
// whole collection to whatever implements ItemStore.
use std::path::Path;
use std::sync::Mutex;

use shelfwatch_store::ItemDb;

use crate::models::Item;
use crate::{Error, Result};

/// Collaborator contract for durable item storage.
///
/// Durability and atomicity belong to the implementor; the engine treats
/// save as fire-and-forget and expects the data back on the next load.
#[cfg_attr(test, mockall::automock)]
pub trait ItemStore: Send + Sync {
    fn load(&self) -> Result<Vec<Item>>;
    fn save(&self, items: &[Item]) -> Result<()>;
}

/// ItemStore over the SQLite document table from shelfwatch-store
pub struct SqliteItemStore {
    db: Mutex<ItemDb>,
}

impl SqliteItemStore {
    pub fn new(db: ItemDb) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = ItemDb::new(path).map_err(|e| Error::StoreError(e.to_string()))?;
        Ok(Self::new(db))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ItemDb>> {
        self.db
            .lock()
            .map_err(|_| Error::StoreError("store lock poisoned".to_string()))
    }
}

impl ItemStore for SqliteItemStore {
    fn load(&self) -> Result<Vec<Item>> {
        self.lock()?
            .load_all()
            .map_err(|e| Error::StoreError(e.to_string()))
    }

    fn save(&self, items: &[Item]) -> Result<()> {
        let rows: Vec<(String, &Item)> = items
            .iter()
            .map(|item| (item.id.clone(), item))
            .collect();
        self.lock()?
            .replace_all(&rows)
            .map_err(|e| Error::StoreError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemDraft, DATE_FORMAT};
    use chrono::NaiveDate;

    fn item(name: &str, expiry: &str) -> Item {
        Item::from_draft(
            ItemDraft {
                name: Some(name.to_string()),
                expiry: expiry.to_string(),
                ..Default::default()
            },
            NaiveDate::parse_from_str("2025-01-01", DATE_FORMAT).unwrap(),
        )
    }

    #[test]
    fn test_sqlite_store_round_trip() {
        let store = SqliteItemStore::new(ItemDb::open_in_memory().unwrap());

        let items = vec![item("Milk", "2025-01-03"), item("Rice", "2030-01-01")];
        store.save(&items).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, items);
    }

    #[test]
    fn test_sqlite_store_save_replaces() {
        let store = SqliteItemStore::new(ItemDb::open_in_memory().unwrap());

        store.save(&[item("Milk", "2025-01-03")]).unwrap();
        let replacement = vec![item("Bread", "2025-01-05")];
        store.save(&replacement).unwrap();

        assert_eq!(store.load().unwrap(), replacement);
    }
}
