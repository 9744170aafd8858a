// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::Connection;
use rusqlite::params;

use catechist_core::ItemId;
use catechist_core::Language;
use catechist_core::Timestamp;

use crate::error::Fallible;

/// Name of the store file inside the data directory.
pub const DB_FILENAME: &str = "catechist.db";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bookmarks (
    item_id INTEGER PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Bookmark and preference store backing the web interface. The quiz engine
/// never touches this: bookmarks are loaded into memory and handed to it
/// read-only.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the store, creating the schema on first use.
    pub fn open(path: &Path) -> Fallible<Database> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// The set of bookmarked item ids.
    pub fn bookmarks(&self) -> Fallible<HashSet<ItemId>> {
        let mut stmt = self.conn.prepare("SELECT item_id FROM bookmarks")?;
        let rows = stmt.query_map([], |row| row.get::<_, ItemId>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// Flip an item's bookmark. Returns the new state.
    pub fn toggle_bookmark(&self, id: ItemId, now: Timestamp) -> Fallible<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM bookmarks WHERE item_id = ?1", [id])?;
        if deleted > 0 {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT INTO bookmarks (item_id, created_at) VALUES (?1, ?2)",
            params![id, now.to_string()],
        )?;
        Ok(true)
    }

    /// The stored language preference, if one has been saved.
    pub fn language(&self) -> Fallible<Option<Language>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = 'language'")?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => {
                let value: String = row.get(0)?;
                Ok(Some(Language::try_from(value)?))
            }
            None => Ok(None),
        }
    }

    pub fn set_language(&self, language: Language) -> Fallible<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES ('language', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [language.code()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn now() -> Timestamp {
        Timestamp::try_from("2024-06-01T09:00:00.000".to_string()).unwrap()
    }

    #[test]
    fn test_bookmark_toggle_round_trip() -> Fallible<()> {
        let dir = tempdir()?;
        let db = Database::open(&dir.path().join(DB_FILENAME))?;
        assert!(db.bookmarks()?.is_empty());
        assert!(db.toggle_bookmark(7, now())?);
        assert!(db.toggle_bookmark(3, now())?);
        assert_eq!(db.bookmarks()?, [3, 7].into_iter().collect());
        assert!(!db.toggle_bookmark(7, now())?);
        assert_eq!(db.bookmarks()?, [3].into_iter().collect());
        Ok(())
    }

    #[test]
    fn test_bookmarks_survive_reopen() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join(DB_FILENAME);
        {
            let db = Database::open(&path)?;
            db.toggle_bookmark(42, now())?;
        }
        let db = Database::open(&path)?;
        assert_eq!(db.bookmarks()?, [42].into_iter().collect());
        Ok(())
    }

    #[test]
    fn test_language_preference_round_trip() -> Fallible<()> {
        let dir = tempdir()?;
        let db = Database::open(&dir.path().join(DB_FILENAME))?;
        assert_eq!(db.language()?, None);
        db.set_language(Language::Zh)?;
        assert_eq!(db.language()?, Some(Language::Zh));
        db.set_language(Language::En)?;
        assert_eq!(db.language()?, Some(Language::En));
        Ok(())
    }
}
