//! Indexing flows: walk a tree, chunk files, embed in batches, store.

pub mod chunker;
pub mod converter;
pub mod walker;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{
    CODE_EXTENSIONS, DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DOC_EXTENSIONS,
};
use crate::db::Database;
use crate::embeddings::Embedder;
use crate::error::{Result, SidecarError};
use self::chunker::{chunk_file, split_simple, CHUNKER_VERSION};
use self::converter::DocumentConverter;
use self::walker::walk_source_files;

/// Knobs shared by both indexing flows.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Statistics from a codebase indexing run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IndexStats {
    pub files_processed: usize,
    pub chunks_indexed: usize,
    pub chunks_deleted: usize,
    pub chunks_purged: usize,
}

/// Statistics from a document indexing run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DocIndexStats {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub chunks_indexed: usize,
    pub chunks_deleted: usize,
}

/// Map file extensions (dotted, lowercase) to tree-sitter language tags.
fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        ".py" => Some("python"),
        ".cs" => Some("c_sharp"),
        ".rs" => Some("rust"),
        ".ts" => Some("typescript"),
        ".tsx" => Some("tsx"),
        ".js" | ".jsx" => Some("javascript"),
        ".md" | ".mdx" => Some("markdown"),
        ".json" => Some("json"),
        ".toml" => Some("toml"),
        ".yaml" | ".yml" => Some("yaml"),
        ".gdscript" => Some("gdscript"),
        _ => None,
    }
}

fn extension_of(relative: &str) -> String {
    Path::new(relative)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

struct PendingChunk {
    filename: String,
    location: String,
    language: String,
    text: String,
}

/// Index a codebase directory. Incremental: re-chunks every eligible
/// file, deletes the chunks that disappeared, and upserts the rest. A
/// chunker-version mismatch purges all code chunks first.
pub fn index_codebase(
    db: &Database,
    source_path: &Path,
    embedder: &dyn Embedder,
    opts: &IndexOptions,
) -> Result<IndexStats> {
    let source_root = resolve_root(source_path)?;

    db.init_metadata_schema()?;
    db.init_codebase_schema()?;

    let mut stats = IndexStats::default();

    // Stale vec0 rows from an older chunking algorithm can't be matched
    // up with new locations; purge wholesale on version change.
    let stored_version = db.get_metadata("chunker_version")?;
    if stored_version.as_deref() != Some(CHUNKER_VERSION) {
        let purged = db.purge_all_code_chunks()?;
        if purged > 0 {
            tracing::info!(
                "Chunker version changed ({} -> {}), purged {} stale chunks",
                stored_version.as_deref().unwrap_or("none"),
                CHUNKER_VERSION,
                purged
            );
            stats.chunks_purged = purged;
        }
        db.set_metadata("chunker_version", CHUNKER_VERSION)?;
    }

    let files = walk_source_files(&source_root, CODE_EXTENSIONS);
    let mut pending: Vec<PendingChunk> = Vec::new();

    db.begin()?;
    for file in files {
        let raw = match std::fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };
        let content = String::from_utf8_lossy(&raw);
        if content.trim().is_empty() {
            continue;
        }

        let ext = extension_of(&file.relative);
        let ts_language = language_for_extension(&ext);
        let language = ts_language
            .map(str::to_string)
            .unwrap_or_else(|| ext.trim_start_matches('.').to_string());

        let chunks = chunk_file(&content, ts_language, opts.chunk_size, opts.chunk_overlap);
        let keep: HashSet<String> = chunks.iter().map(|c| c.location.clone()).collect();
        stats.chunks_deleted += db.delete_stale_chunks(&file.relative, &keep)?;
        stats.files_processed += 1;

        for chunk in chunks {
            pending.push(PendingChunk {
                filename: file.relative.clone(),
                location: chunk.location,
                language: language.clone(),
                text: chunk.text,
            });
        }

        if pending.len() >= opts.batch_size {
            flush(db, embedder, &mut pending, &mut stats.chunks_indexed)?;
        }
    }
    if !pending.is_empty() {
        flush(db, embedder, &mut pending, &mut stats.chunks_indexed)?;
    }
    db.commit()?;

    tracing::info!(
        "Indexed {} files: {} chunks upserted, {} deleted, {} purged",
        stats.files_processed,
        stats.chunks_indexed,
        stats.chunks_deleted,
        stats.chunks_purged
    );
    Ok(stats)
}

/// Index a directory of rich documents. Each file is converted to
/// markdown first and stored with the literal language tag `document`;
/// conversion failures and empty conversions are skipped, not fatal.
pub fn index_documents(
    db: &Database,
    docs_path: &Path,
    converter: &dyn DocumentConverter,
    embedder: &dyn Embedder,
    opts: &IndexOptions,
) -> Result<DocIndexStats> {
    let docs_root = resolve_root(docs_path)?;

    db.init_codebase_schema()?;

    let mut stats = DocIndexStats::default();
    let files = walk_source_files(&docs_root, DOC_EXTENSIONS);
    let mut pending: Vec<PendingChunk> = Vec::new();

    db.begin()?;
    for file in files {
        let content = match converter.convert(&file.path) {
            Ok(markdown) => markdown,
            Err(e) => {
                tracing::warn!("Failed to convert {}, skipping: {}", file.relative, e);
                stats.files_skipped += 1;
                continue;
            }
        };
        if content.trim().is_empty() {
            stats.files_skipped += 1;
            continue;
        }

        let chunks = split_simple(&content, opts.chunk_size, opts.chunk_overlap);
        let keep: HashSet<String> = chunks.iter().map(|c| c.location.clone()).collect();
        stats.chunks_deleted += db.delete_stale_chunks(&file.relative, &keep)?;
        stats.files_processed += 1;

        for chunk in chunks {
            pending.push(PendingChunk {
                filename: file.relative.clone(),
                location: chunk.location,
                language: "document".to_string(),
                text: chunk.text,
            });
        }

        if pending.len() >= opts.batch_size {
            flush(db, embedder, &mut pending, &mut stats.chunks_indexed)?;
        }
    }
    if !pending.is_empty() {
        flush(db, embedder, &mut pending, &mut stats.chunks_indexed)?;
    }
    db.commit()?;

    Ok(stats)
}

/// Embed the buffered chunk texts as one batch and upsert each chunk
/// with its vector. An embedder failure here is fatal to the run.
fn flush(
    db: &Database,
    embedder: &dyn Embedder,
    pending: &mut Vec<PendingChunk>,
    chunks_indexed: &mut usize,
) -> Result<()> {
    let texts: Vec<String> = pending.iter().map(|p| p.text.clone()).collect();
    let embeddings = embedder.embed(&texts)?;
    if embeddings.len() != pending.len() {
        return Err(SidecarError::Embedding(format!(
            "embedder returned {} vectors for {} texts",
            embeddings.len(),
            pending.len()
        )));
    }
    for (chunk, embedding) in pending.iter().zip(&embeddings) {
        db.upsert_code_chunk(
            &chunk.filename,
            &chunk.location,
            Some(&chunk.language),
            &chunk.text,
            embedding,
        )?;
    }
    *chunks_indexed += pending.len();
    pending.clear();
    Ok(())
}

fn resolve_root(path: &Path) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .map_err(|_| SidecarError::Config(format!("Source path not found: {}", path.display())))?;
    if !root.is_dir() {
        return Err(SidecarError::Config(format!(
            "Source path is not a directory: {}",
            root.display()
        )));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_extension() {
        assert_eq!(language_for_extension(".py"), Some("python"));
        assert_eq!(language_for_extension(".cs"), Some("c_sharp"));
        assert_eq!(language_for_extension(".jsx"), Some("javascript"));
        assert_eq!(language_for_extension(".yml"), Some("yaml"));
        assert_eq!(language_for_extension(".sql"), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("src/Main.CS"), ".cs");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".gitignore"), "");
    }

    #[test]
    fn test_resolve_root_rejects_missing_path() {
        let err = resolve_root(Path::new("/definitely/not/here"));
        assert!(matches!(err, Err(SidecarError::Config(_))));
    }

    #[test]
    fn test_resolve_root_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "x = 1").unwrap();
        assert!(matches!(resolve_root(&file), Err(SidecarError::Config(_))));
    }
}
