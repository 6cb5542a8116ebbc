use rusqlite::Connection;

use crate::config::EMBED_DIMENSIONS;
use crate::error::Result;

/// Initialize the metadata key-value table.
pub fn init_metadata_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Initialize the code-chunk table and, when sqlite-vec is loaded, its
/// vec0 companion keyed by the chunk's row id.
pub fn init_codebase_schema(conn: &Connection, vec_enabled: bool) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS code_chunks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            location TEXT NOT NULL,
            language TEXT,
            code TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(filename, location)
        );

        CREATE INDEX IF NOT EXISTS idx_code_chunks_filename ON code_chunks(filename);",
    )?;
    if vec_enabled {
        conn.execute_batch(&format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS code_chunks_vec USING vec0(
                id INTEGER PRIMARY KEY,
                embedding FLOAT[{EMBED_DIMENSIONS}]
            );"
        ))?;
    }
    Ok(())
}

/// Initialize the knowledge table, its vec0 companion, and the FTS5 mirror.
///
/// The FTS5 table is external-content over `knowledge`, kept in sync by
/// triggers. On first creation only (no `knowledge_fts` in sqlite_master
/// before this call), a `'rebuild'` back-fills rows inserted before the
/// triggers existed; later initializations must not rebuild.
pub fn init_knowledge_schema(conn: &Connection, vec_enabled: bool) -> Result<()> {
    let fts_existed: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='knowledge_fts'",
        [],
        |row| row.get(0),
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS knowledge (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            category TEXT NOT NULL,
            tags TEXT,
            stored_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_knowledge_category ON knowledge(category);

        CREATE VIRTUAL TABLE IF NOT EXISTS knowledge_fts USING fts5(
            content,
            category,
            content=knowledge,
            content_rowid=id
        );

        CREATE TRIGGER IF NOT EXISTS knowledge_ai AFTER INSERT ON knowledge BEGIN
            INSERT INTO knowledge_fts(rowid, content, category)
            VALUES (new.id, new.content, new.category);
        END;

        CREATE TRIGGER IF NOT EXISTS knowledge_ad AFTER DELETE ON knowledge BEGIN
            INSERT INTO knowledge_fts(knowledge_fts, rowid, content, category)
            VALUES('delete', old.id, old.content, old.category);
        END;

        CREATE TRIGGER IF NOT EXISTS knowledge_au AFTER UPDATE ON knowledge BEGIN
            INSERT INTO knowledge_fts(knowledge_fts, rowid, content, category)
            VALUES('delete', old.id, old.content, old.category);
            INSERT INTO knowledge_fts(rowid, content, category)
            VALUES (new.id, new.content, new.category);
        END;",
    )?;

    if !fts_existed {
        conn.execute_batch("INSERT INTO knowledge_fts(knowledge_fts) VALUES('rebuild');")?;
    }

    if vec_enabled {
        conn.execute_batch(&format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS knowledge_vec USING vec0(
                id INTEGER PRIMARY KEY,
                embedding FLOAT[{EMBED_DIMENSIONS}]
            );"
        ))?;
    }
    Ok(())
}
