pub mod ranking;
pub mod schema;
pub mod vector;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::Result;

/// A code-search hit, best (lowest vector distance) first.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CodeHit {
    pub filename: String,
    pub location: String,
    pub language: Option<String>,
    pub code: String,
    /// `1 − distance` from the vector index.
    pub score: f64,
}

/// A knowledge-search hit. `relevance` is `1 − distance` for vector
/// search, zero for full-text search, and the fused score after RRF.
#[derive(Debug, Clone, serde::Serialize)]
pub struct KnowledgeHit {
    pub content: String,
    pub category: String,
    pub tags: Option<BTreeMap<String, String>>,
    pub stored_at: String,
    pub relevance: f64,
}

/// A single-connection database handle.
///
/// A run owns its connection exclusively from open to close; WAL
/// journaling makes the file safe for concurrent readers in other
/// processes. Vector availability is probed once at open and the flag
/// is sticky for the connection's lifetime; every vector-touching
/// operation is guarded by it.
pub struct Database {
    conn: Connection,
    vec_enabled: bool,
}

impl Database {
    /// Register sqlite-vec as an auto-extension (process-global; must run
    /// before opening connections).
    fn register_vec_extension() {
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute::<
                *const (),
                unsafe extern "C" fn(
                    *mut rusqlite::ffi::sqlite3,
                    *mut *mut std::ffi::c_char,
                    *const rusqlite::ffi::sqlite3_api_routines,
                ) -> std::ffi::c_int,
            >(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }
    }

    /// Open or create a database file, creating parent directories as
    /// needed. Sets WAL journaling and `synchronous=NORMAL`, then probes
    /// the vector extension.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::register_vec_extension();
        let conn = Connection::open(path)?;
        Self::configure(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::register_vec_extension();
        let conn = Connection::open_in_memory()?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;
        let vec_enabled = Self::probe_vec(&conn);
        Ok(Self { conn, vec_enabled })
    }

    /// Check whether sqlite-vec loaded into this connection.
    fn probe_vec(conn: &Connection) -> bool {
        match conn.query_row("SELECT vec_version()", [], |row| row.get::<_, String>(0)) {
            Ok(version) => {
                tracing::debug!("sqlite-vec {} loaded", version);
                true
            }
            Err(e) => {
                tracing::warn!("sqlite-vec not available: {} — vector search disabled", e);
                false
            }
        }
    }

    /// Whether vector operations are available on this connection.
    pub fn vec_enabled(&self) -> bool {
        self.vec_enabled
    }

    /// Force the degraded no-vector mode, as if the extension had failed
    /// to load. Text tables keep working; vector searches return empty.
    pub fn disable_vector(&mut self) {
        self.vec_enabled = false;
    }

    /// Begin the run-level transaction.
    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    /// Commit the run-level transaction, making all writes durable.
    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    // --- Schema ---

    pub fn init_metadata_schema(&self) -> Result<()> {
        schema::init_metadata_schema(&self.conn)
    }

    pub fn init_codebase_schema(&self) -> Result<()> {
        schema::init_codebase_schema(&self.conn, self.vec_enabled)
    }

    pub fn init_knowledge_schema(&self) -> Result<()> {
        schema::init_knowledge_schema(&self.conn, self.vec_enabled)
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let mut rows = stmt.query_map([key], |row| row.get::<_, String>(0))?;
        Ok(rows.next().transpose()?)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO metadata (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    // --- Code chunks ---

    /// Insert or update a code chunk and its embedding. Returns the row id.
    pub fn upsert_code_chunk(
        &self,
        filename: &str,
        location: &str,
        language: Option<&str>,
        code: &str,
        embedding: &[f32],
    ) -> Result<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let row_id: i64 = self.conn.query_row(
            "INSERT INTO code_chunks (filename, location, language, code, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(filename, location) DO UPDATE SET
                 language = excluded.language,
                 code = excluded.code,
                 updated_at = excluded.updated_at
             RETURNING id",
            rusqlite::params![filename, location, language, code, now],
        )?;
        if self.vec_enabled {
            self.conn.execute(
                "INSERT OR REPLACE INTO code_chunks_vec (id, embedding) VALUES (?1, ?2)",
                rusqlite::params![row_id, vector::serialize(embedding)],
            )?;
        }
        Ok(row_id)
    }

    /// Remove chunks for a file whose location is not in the keep set;
    /// their vector companions go with them. Empty keep set deletes every
    /// chunk for the file. Runs as a single transactional unit. Returns
    /// the number of deleted text rows.
    pub fn delete_stale_chunks(&self, filename: &str, keep_locations: &HashSet<String>) -> Result<usize> {
        let ids: Vec<i64> = if keep_locations.is_empty() {
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM code_chunks WHERE filename = ?1")?;
            let rows = stmt.query_map([filename], |row| row.get(0))?;
            rows.collect::<std::result::Result<_, _>>()?
        } else {
            let placeholders = vec!["?"; keep_locations.len()].join(",");
            let sql = format!(
                "SELECT id FROM code_chunks WHERE filename = ? AND location NOT IN ({placeholders})"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::ToSql> = std::iter::once(&filename as &dyn rusqlite::ToSql)
                .chain(keep_locations.iter().map(|l| l as &dyn rusqlite::ToSql))
                .collect();
            let rows = stmt.query_map(params.as_slice(), |row| row.get(0))?;
            rows.collect::<std::result::Result<_, _>>()?
        };

        if ids.is_empty() {
            return Ok(0);
        }

        self.conn.execute_batch("SAVEPOINT stale_delete")?;
        let id_placeholders = vec!["?"; ids.len()].join(",");
        if self.vec_enabled {
            self.conn.execute(
                &format!("DELETE FROM code_chunks_vec WHERE id IN ({id_placeholders})"),
                rusqlite::params_from_iter(ids.iter()),
            )?;
        }
        self.conn.execute(
            &format!("DELETE FROM code_chunks WHERE id IN ({id_placeholders})"),
            rusqlite::params_from_iter(ids.iter()),
        )?;
        self.conn.execute_batch("RELEASE stale_delete")?;
        Ok(ids.len())
    }

    /// Delete every code chunk and vector companion. Used when the
    /// chunker version changes. Returns the number of deleted text rows.
    pub fn purge_all_code_chunks(&self) -> Result<usize> {
        let count = self.conn.execute("DELETE FROM code_chunks", [])?;
        if self.vec_enabled {
            self.conn.execute("DELETE FROM code_chunks_vec", [])?;
        }
        Ok(count)
    }

    /// Vector KNN over code chunks, best first. Empty when the vector
    /// extension is unavailable.
    pub fn search_code(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<CodeHit>> {
        if !self.vec_enabled {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT v.distance, c.filename, c.location, c.language, c.code
             FROM code_chunks_vec v
             JOIN code_chunks c ON c.id = v.id
             WHERE v.embedding MATCH ?1 AND k = ?2
             ORDER BY v.distance",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![vector::serialize(query_embedding), top_k as i64],
            |row| {
                Ok(CodeHit {
                    score: 1.0 - row.get::<_, f64>(0)?,
                    filename: row.get(1)?,
                    location: row.get(2)?,
                    language: row.get(3)?,
                    code: row.get(4)?,
                })
            },
        )?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    // --- Knowledge ---

    /// Insert a knowledge entry and its embedding. Duplicates are
    /// permitted. Returns the row id.
    pub fn insert_knowledge(
        &self,
        content: &str,
        category: &str,
        tags: Option<&BTreeMap<String, String>>,
        embedding: &[f32],
    ) -> Result<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let tags_json = match tags {
            Some(map) if !map.is_empty() => Some(serde_json::to_string(map)?),
            _ => None,
        };
        self.conn.execute(
            "INSERT INTO knowledge (content, category, tags, stored_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![content, category, tags_json, now, now],
        )?;
        let row_id = self.conn.last_insert_rowid();
        if self.vec_enabled {
            self.conn.execute(
                "INSERT INTO knowledge_vec (id, embedding) VALUES (?1, ?2)",
                rusqlite::params![row_id, vector::serialize(embedding)],
            )?;
        }
        Ok(row_id)
    }

    /// Vector KNN over knowledge, optionally filtered by category.
    ///
    /// vec0 cannot mix arbitrary predicates with MATCH + k, so a category
    /// filter over-fetches 3·k candidates and post-filters in memory.
    pub fn search_knowledge(
        &self,
        query_embedding: &[f32],
        category: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<KnowledgeHit>> {
        if !self.vec_enabled {
            return Ok(Vec::new());
        }
        let effective_top_k = if category.is_some() { top_k * 3 } else { top_k };
        let mut stmt = self.conn.prepare(
            "SELECT v.distance, k.content, k.category, k.tags, k.stored_at
             FROM knowledge_vec v
             JOIN knowledge k ON k.id = v.id
             WHERE v.embedding MATCH ?1 AND k = ?2
             ORDER BY v.distance",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![vector::serialize(query_embedding), effective_top_k as i64],
            |row| {
                Ok(KnowledgeHit {
                    relevance: 1.0 - row.get::<_, f64>(0)?,
                    content: row.get(1)?,
                    category: row.get(2)?,
                    tags: parse_tags(row.get::<_, Option<String>>(3)?),
                    stored_at: row.get(4)?,
                })
            },
        )?;
        let mut hits: Vec<KnowledgeHit> = rows.collect::<std::result::Result<_, _>>()?;
        if let Some(cat) = category {
            hits.retain(|h| h.category == cat);
            hits.truncate(top_k);
        }
        Ok(hits)
    }

    /// Full-text phrase search over knowledge, best rank first. The query
    /// is quoted (embedded quotes doubled) to force a phrase match.
    /// Relevance is zero here; hybrid fusion recomputes it.
    pub fn search_knowledge_fts(
        &self,
        query: &str,
        category: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<KnowledgeHit>> {
        let phrase = format!("\"{}\"", query.replace('"', "\"\""));
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(KnowledgeHit {
                content: row.get(0)?,
                category: row.get(1)?,
                tags: parse_tags(row.get::<_, Option<String>>(2)?),
                stored_at: row.get(3)?,
                relevance: 0.0,
            })
        };
        let hits = match category {
            Some(cat) => {
                let mut stmt = self.conn.prepare(
                    "SELECT k.content, k.category, k.tags, k.stored_at
                     FROM knowledge_fts
                     JOIN knowledge k ON k.id = knowledge_fts.rowid
                     WHERE knowledge_fts MATCH ?1 AND k.category = ?2
                     ORDER BY knowledge_fts.rank
                     LIMIT ?3",
                )?;
                let rows = stmt.query_map(rusqlite::params![phrase, cat, top_k as i64], map_row)?;
                rows.collect::<std::result::Result<_, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT k.content, k.category, k.tags, k.stored_at
                     FROM knowledge_fts
                     JOIN knowledge k ON k.id = knowledge_fts.rowid
                     WHERE knowledge_fts MATCH ?1
                     ORDER BY knowledge_fts.rank
                     LIMIT ?2",
                )?;
                let rows = stmt.query_map(rusqlite::params![phrase, top_k as i64], map_row)?;
                rows.collect::<std::result::Result<_, _>>()?
            }
        };
        Ok(hits)
    }

    /// Hybrid knowledge search: over-fetch 2·k from both vector and
    /// full-text rankings, then fuse with reciprocal rank fusion.
    pub fn search_knowledge_hybrid(
        &self,
        query_embedding: &[f32],
        query: &str,
        category: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<KnowledgeHit>> {
        let vec_hits = self.search_knowledge(query_embedding, category, top_k * 2)?;
        let fts_hits = self.search_knowledge_fts(query, category, top_k * 2)?;
        Ok(ranking::fuse(&[vec_hits, fts_hits], top_k))
    }
}

fn parse_tags(tags_json: Option<String>) -> Option<BTreeMap<String, String>> {
    tags_json.and_then(|json| serde_json::from_str(&json).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(seed: f32) -> Vec<f32> {
        (0..crate::config::EMBED_DIMENSIONS)
            .map(|i| seed + i as f32 * 0.001)
            .collect()
    }

    fn code_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_codebase_schema().unwrap();
        db
    }

    fn knowledge_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_knowledge_schema().unwrap();
        db
    }

    #[test]
    fn test_metadata_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        db.init_metadata_schema().unwrap();
        assert_eq!(db.get_metadata("chunker_version").unwrap(), None);
        db.set_metadata("chunker_version", "ts1").unwrap();
        assert_eq!(db.get_metadata("chunker_version").unwrap(), Some("ts1".into()));
        db.set_metadata("chunker_version", "ts2").unwrap();
        assert_eq!(db.get_metadata("chunker_version").unwrap(), Some("ts2".into()));
    }

    #[test]
    fn test_upsert_then_search_code() {
        let db = code_db();
        db.upsert_code_chunk("f.py", "0:0", Some("python"), "def f(): pass", &embedding(0.1))
            .unwrap();
        db.upsert_code_chunk("g.py", "0:0", Some("python"), "def g(): pass", &embedding(0.9))
            .unwrap();

        let hits = db.search_code(&embedding(0.1), 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].filename, "f.py");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let db = code_db();
        let first = db
            .upsert_code_chunk("f.py", "0:0", Some("python"), "old", &embedding(0.1))
            .unwrap();
        let second = db
            .upsert_code_chunk("f.py", "0:0", Some("python"), "new", &embedding(0.2))
            .unwrap();
        assert_eq!(first, second);

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM code_chunks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let code: String = db
            .conn
            .query_row("SELECT code FROM code_chunks WHERE id = ?1", [first], |r| r.get(0))
            .unwrap();
        assert_eq!(code, "new");
    }

    #[test]
    fn test_text_and_vector_rows_paired() {
        let db = code_db();
        for i in 0..3 {
            db.upsert_code_chunk("f.py", &format!("{i}:0"), None, "code", &embedding(i as f32))
                .unwrap();
        }
        let unpaired: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM code_chunks c
                 WHERE NOT EXISTS (SELECT 1 FROM code_chunks_vec v WHERE v.id = c.id)",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(unpaired, 0);
    }

    #[test]
    fn test_delete_stale_chunks_keeps_named_locations() {
        let db = code_db();
        for loc in ["0:0", "1:100", "2:200"] {
            db.upsert_code_chunk("test.py", loc, Some("python"), "code", &embedding(0.5))
                .unwrap();
        }
        let keep: HashSet<String> = ["0:0".to_string()].into_iter().collect();
        let deleted = db.delete_stale_chunks("test.py", &keep).unwrap();
        assert_eq!(deleted, 2);

        let remaining: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM code_chunks WHERE filename='test.py'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(remaining, 1);
        let vec_remaining: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM code_chunks_vec", [], |r| r.get(0))
            .unwrap();
        assert_eq!(vec_remaining, 1);
    }

    #[test]
    fn test_delete_stale_chunks_empty_keep_set_deletes_all() {
        let db = code_db();
        for loc in ["0:0", "1:100", "2:200"] {
            db.upsert_code_chunk("test.py", loc, Some("python"), "code", &embedding(0.5))
                .unwrap();
        }
        let deleted = db.delete_stale_chunks("test.py", &HashSet::new()).unwrap();
        assert_eq!(deleted, 3);
    }

    #[test]
    fn test_delete_stale_chunks_all_kept() {
        let db = code_db();
        for loc in ["0:0", "1:100"] {
            db.upsert_code_chunk("test.py", loc, Some("python"), "code", &embedding(0.5))
                .unwrap();
        }
        let keep: HashSet<String> = ["0:0", "1:100"].iter().map(|s| s.to_string()).collect();
        assert_eq!(db.delete_stale_chunks("test.py", &keep).unwrap(), 0);
    }

    #[test]
    fn test_delete_stale_chunks_other_files_untouched() {
        let db = code_db();
        db.upsert_code_chunk("test.py", "0:0", None, "code", &embedding(0.1))
            .unwrap();
        db.upsert_code_chunk("other.py", "0:0", None, "code", &embedding(0.2))
            .unwrap();
        let deleted = db.delete_stale_chunks("test.py", &HashSet::new()).unwrap();
        assert_eq!(deleted, 1);
        let other: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM code_chunks WHERE filename='other.py'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(other, 1);
    }

    #[test]
    fn test_purge_all_code_chunks() {
        let db = code_db();
        for i in 0..4 {
            db.upsert_code_chunk("f.py", &format!("{i}:0"), None, "code", &embedding(i as f32))
                .unwrap();
        }
        assert_eq!(db.purge_all_code_chunks().unwrap(), 4);
        let remaining: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM code_chunks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        let vec_remaining: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM code_chunks_vec", [], |r| r.get(0))
            .unwrap();
        assert_eq!(vec_remaining, 0);
    }

    #[test]
    fn test_insert_knowledge_with_tags() {
        let db = knowledge_db();
        let mut tags = BTreeMap::new();
        tags.insert("scope".to_string(), "ci".to_string());
        let id = db
            .insert_knowledge("flaky tests rerun", "pitfall", Some(&tags), &embedding(0.3))
            .unwrap();
        assert!(id > 0);

        let hits = db.search_knowledge(&embedding(0.3), None, 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tags.as_ref().unwrap()["scope"], "ci");
    }

    #[test]
    fn test_insert_knowledge_duplicates_allowed() {
        let db = knowledge_db();
        let a = db.insert_knowledge("same fact", "pattern", None, &embedding(0.1)).unwrap();
        let b = db.insert_knowledge("same fact", "pattern", None, &embedding(0.1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_search_knowledge_category_filter() {
        let db = knowledge_db();
        db.insert_knowledge("use builder pattern", "pattern", None, &embedding(0.1))
            .unwrap();
        db.insert_knowledge("prefer composition", "pattern", None, &embedding(0.2))
            .unwrap();
        db.insert_knowledge("watch for off-by-one", "pitfall", None, &embedding(0.15))
            .unwrap();

        let hits = db.search_knowledge(&embedding(0.1), Some("pattern"), 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.category == "pattern"));
    }

    #[test]
    fn test_search_knowledge_fts_phrase() {
        let db = knowledge_db();
        db.insert_knowledge("the cache must be warmed first", "codebase", None, &embedding(0.1))
            .unwrap();
        db.insert_knowledge("unrelated entry", "codebase", None, &embedding(0.2))
            .unwrap();

        let hits = db.search_knowledge_fts("cache must", None, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relevance, 0.0);
    }

    #[test]
    fn test_search_knowledge_fts_escapes_quotes() {
        let db = knowledge_db();
        db.insert_knowledge("say \"hello\" politely", "preference", None, &embedding(0.1))
            .unwrap();
        // Embedded quotes must not break the MATCH expression.
        let hits = db.search_knowledge_fts("say \"hello\"", None, 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_hybrid_prefers_entry_in_both_rankings() {
        let db = knowledge_db();
        db.insert_knowledge("vector and text agree here", "pattern", None, &embedding(0.1))
            .unwrap();
        db.insert_knowledge("only vectors like this one", "pattern", None, &embedding(0.11))
            .unwrap();

        let hits = db
            .search_knowledge_hybrid(&embedding(0.1), "text agree", None, 10)
            .unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].content, "vector and text agree here");
    }

    #[test]
    fn test_vec_unavailable_guards() {
        let mut db = Database::open_in_memory().unwrap();
        db.disable_vector();
        db.init_codebase_schema().unwrap();
        db.init_knowledge_schema().unwrap();

        // Writes land in the text tables; vector ops are no-ops.
        db.upsert_code_chunk("f.py", "0:0", Some("python"), "print('hi')", &embedding(0.1))
            .unwrap();
        let code: String = db
            .conn
            .query_row("SELECT code FROM code_chunks WHERE filename='f.py'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(code, "print('hi')");
        assert!(db.search_code(&embedding(0.1), 10).unwrap().is_empty());

        let id = db.insert_knowledge("some fact", "pattern", None, &embedding(0.1)).unwrap();
        assert!(id > 0);
        assert!(db.search_knowledge(&embedding(0.1), None, 10).unwrap().is_empty());

        // Stale deletion still works without the vec companion.
        assert_eq!(db.delete_stale_chunks("f.py", &HashSet::new()).unwrap(), 1);

        // Full-text search is unaffected.
        let hits = db.search_knowledge_fts("fact", None, 10).unwrap();
        assert_eq!(hits.len(), 1);
    }
}
