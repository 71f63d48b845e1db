use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Things the store can trip over
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Document store for item records using SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Battle-tested and reliable
/// - Doesn't require a separate process
///
/// Records are stored as JSON in a TEXT column, keyed by id, with an
/// explicit position column so the collection keeps its sequence order
/// across a save/load round trip.
pub struct ItemDb {
    conn: Connection,
}

impl ItemDb {
    pub fn new<P: AsRef<Path>>(db_path: P) -> crate::Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, handy for tests
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Replace the whole collection in one transaction, preserving the
    /// order of `rows`.
    pub fn replace_all<T: Serialize>(&mut self, rows: &[(String, T)]) -> crate::Result<()> {
        let now = Utc::now().timestamp();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM items", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (id, position, data, updated_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (id, value)) in rows.iter().enumerate() {
                let data = serde_json::to_string(value)?;
                stmt.execute(params![id, position as i64, data, now])?;
            }
        }
        tx.commit()?;
        debug!("replaced item table with {} rows", rows.len());
        Ok(())
    }

    /// Load every record in stored order
    pub fn load_all<T: DeserializeOwned>(&self) -> crate::Result<Vec<T>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM items ORDER BY position")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for data in rows {
            out.push(serde_json::from_str(&data?)?);
        }
        Ok(out)
    }

    /// Fetch one record by id
    pub fn get<T: DeserializeOwned>(&self, id: &str) -> crate::Result<Option<T>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM items WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Insert or update a single record. New records go to the end of the
    /// sequence; updates keep their position.
    pub fn upsert<T: Serialize>(&self, id: &str, value: &T) -> crate::Result<()> {
        let data = serde_json::to_string(value)?;
        let now = Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO items (id, position, data, updated_at)
             VALUES (
                ?1,
                COALESCE(
                    (SELECT position FROM items WHERE id = ?1),
                    (SELECT COALESCE(MAX(position), -1) + 1 FROM items)
                ),
                ?2, ?3
             )
             ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![id, data, now],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> crate::Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn len(&self) -> crate::Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> crate::Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        qty: u32,
    }

    fn record(name: &str, qty: u32) -> Record {
        Record {
            name: name.to_string(),
            qty,
        }
    }

    #[test]
    fn test_replace_all_round_trip_preserves_order() {
        let mut db = ItemDb::open_in_memory().unwrap();

        let rows = vec![
            ("b".to_string(), record("Milk", 2)),
            ("a".to_string(), record("Rice", 1)),
            ("c".to_string(), record("Eggs", 12)),
        ];
        db.replace_all(&rows).unwrap();

        let loaded: Vec<Record> = db.load_all().unwrap();
        assert_eq!(
            loaded,
            vec![record("Milk", 2), record("Rice", 1), record("Eggs", 12)]
        );
    }

    #[test]
    fn test_replace_all_overwrites_previous_contents() {
        let mut db = ItemDb::open_in_memory().unwrap();

        db.replace_all(&[("a".to_string(), record("Milk", 1))])
            .unwrap();
        db.replace_all(&[("b".to_string(), record("Bread", 1))])
            .unwrap();

        let loaded: Vec<Record> = db.load_all().unwrap();
        assert_eq!(loaded, vec![record("Bread", 1)]);
    }

    #[test]
    fn test_upsert_and_get() {
        let db = ItemDb::open_in_memory().unwrap();

        db.upsert("a", &record("Milk", 1)).unwrap();
        db.upsert("a", &record("Milk", 3)).unwrap();

        let got: Option<Record> = db.get("a").unwrap();
        assert_eq!(got, Some(record("Milk", 3)));
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn test_upsert_appends_new_records_in_order() {
        let db = ItemDb::open_in_memory().unwrap();

        db.upsert("a", &record("Milk", 1)).unwrap();
        db.upsert("b", &record("Rice", 1)).unwrap();
        // Updating the first record must not move it to the end
        db.upsert("a", &record("Milk", 2)).unwrap();

        let loaded: Vec<Record> = db.load_all().unwrap();
        assert_eq!(loaded, vec![record("Milk", 2), record("Rice", 1)]);
    }

    #[test]
    fn test_delete() {
        let db = ItemDb::open_in_memory().unwrap();

        db.upsert("a", &record("Milk", 1)).unwrap();
        assert!(db.delete("a").unwrap());
        assert!(!db.delete("a").unwrap());
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let db = ItemDb::open_in_memory().unwrap();
        let got: Option<Record> = db.get("nope").unwrap();
        assert_eq!(got, None);
    }
}
