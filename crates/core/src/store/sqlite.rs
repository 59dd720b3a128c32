//! SQLite-backed ad store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{AdStore, PersistOutcome, StoreError, StoreStats};
use crate::source::Ad;

/// SQLite-backed ad store.
pub struct SqliteAdStore {
    conn: Mutex<Connection>,
}

impl SqliteAdStore {
    /// Create a new SQLite ad store, creating the database file and tables
    /// if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ad store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- Plate identity, one row per physical vehicle plate
            CREATE TABLE IF NOT EXISTS plates (
                plate TEXT PRIMARY KEY,
                first_seen_at TEXT NOT NULL
            );

            -- One row per ingested listing; ad_id is the dedup key,
            -- rowid `id` preserves discovery order within a plate
            CREATE TABLE IF NOT EXISTS advertisements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ad_id INTEGER NOT NULL UNIQUE,
                title TEXT NOT NULL,
                year INTEGER,
                price_minor INTEGER NOT NULL,
                drive_type TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                phone_number TEXT NOT NULL DEFAULT '',
                ad_link TEXT NOT NULL,
                plate TEXT NOT NULL REFERENCES plates(plate),
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_advertisements_plate ON advertisements(plate);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_ad(row: &rusqlite::Row) -> rusqlite::Result<Ad> {
        Ok(Ad {
            ad_id: row.get::<_, i64>(0)? as u64,
            title: row.get(1)?,
            year: row.get::<_, Option<i64>>(2)?.map(|y| y as u32),
            price_minor: row.get(3)?,
            drive_type: row.get(4)?,
            city: row.get(5)?,
            phone_number: row.get(6)?,
            ad_link: row.get(7)?,
            plate: row.get(8)?,
            image_urls: Vec::new(),
        })
    }
}

impl AdStore for SqliteAdStore {
    fn insert(&self, ad: &Ad, plate: &str) -> Result<PersistOutcome, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT OR IGNORE INTO plates (plate, first_seen_at) VALUES (?, ?)",
            params![plate, now],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let inserted = tx
            .execute(
                "INSERT OR IGNORE INTO advertisements
                 (ad_id, title, year, price_minor, drive_type, city, phone_number, ad_link, plate, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    ad.ad_id as i64,
                    ad.title,
                    ad.year.map(|y| y as i64),
                    ad.price_minor,
                    ad.drive_type,
                    ad.city,
                    ad.phone_number,
                    ad.ad_link,
                    plate,
                    now,
                ],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))?;

        if inserted == 0 {
            Ok(PersistOutcome::Duplicate)
        } else {
            Ok(PersistOutcome::Created)
        }
    }

    fn find_by_plate(&self, plate: &str) -> Result<Vec<Ad>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT ad_id, title, year, price_minor, drive_type, city, phone_number, ad_link, plate
                 FROM advertisements WHERE plate = ? ORDER BY id",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![plate], Self::row_to_ad)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut ads = Vec::new();
        for row in rows {
            ads.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(ads)
    }

    fn exists(&self, ad_id: u64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM advertisements WHERE ad_id = ?",
                params![ad_id as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.conn.lock().unwrap();
        let ads: i64 = conn
            .query_row("SELECT COUNT(*) FROM advertisements", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let plates: i64 = conn
            .query_row("SELECT COUNT(*) FROM plates", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(StoreStats {
            ads: ads as u64,
            plates: plates as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ad(ad_id: u64, title: &str) -> Ad {
        Ad {
            ad_id,
            title: title.to_string(),
            price_minor: 120_000_000,
            city: "Хабаровск".to_string(),
            drive_type: "Задний".to_string(),
            year: Some(2001),
            phone_number: "+7-914-555-12-34".to_string(),
            ad_link: format!("https://example.org/sales/{ad_id}"),
            image_urls: vec!["https://img.example.org/xl/1.jpg".to_string()],
            plate: None,
        }
    }

    #[test]
    fn test_insert_then_duplicate() {
        let store = SqliteAdStore::in_memory().unwrap();

        let outcome = store.insert(&ad(1, "Toyota Mark II"), "Х471НК96").unwrap();
        assert_eq!(outcome, PersistOutcome::Created);

        let outcome = store.insert(&ad(1, "Toyota Mark II"), "Х471НК96").unwrap();
        assert_eq!(outcome, PersistOutcome::Duplicate);

        assert!(store.exists(1).unwrap());
        assert!(!store.exists(2).unwrap());
    }

    #[test]
    fn test_find_by_plate_in_insertion_order() {
        let store = SqliteAdStore::in_memory().unwrap();
        store.insert(&ad(10, "first"), "Х471НК96").unwrap();
        store.insert(&ad(12, "second"), "Х471НК96").unwrap();
        store.insert(&ad(11, "other plate"), "А123ВС45").unwrap();

        let ads = store.find_by_plate("Х471НК96").unwrap();
        assert_eq!(ads.len(), 2);
        assert_eq!(ads[0].ad_id, 10);
        assert_eq!(ads[1].ad_id, 12);
        assert_eq!(ads[0].plate.as_deref(), Some("Х471НК96"));
        // Photo URLs are transient, not persisted
        assert!(ads[0].image_urls.is_empty());

        assert!(store.find_by_plate("В000ВВ00").unwrap().is_empty());
    }

    #[test]
    fn test_plate_record_created_lazily_once() {
        let store = SqliteAdStore::in_memory().unwrap();
        store.insert(&ad(1, "a"), "Х471НК96").unwrap();
        store.insert(&ad(2, "b"), "Х471НК96").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.ads, 2);
        assert_eq!(stats.plates, 1);
    }

    #[test]
    fn test_concurrent_same_id_yields_one_created() {
        let store = Arc::new(SqliteAdStore::in_memory().unwrap());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.insert(&ad(99, "racer"), "Х471НК96").unwrap()
            }));
        }

        let outcomes: Vec<PersistOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let created = outcomes
            .iter()
            .filter(|o| **o == PersistOutcome::Created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(outcomes.len() - created, 7);
        assert_eq!(store.stats().unwrap().ads, 1);
    }
}
