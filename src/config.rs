//! Compiled-in defaults and database-path resolution.
//!
//! All default paths are rooted at the data directory, which the
//! `MEMORY_SIDECAR_DATA_DIR` environment variable overrides.

use std::path::PathBuf;

/// Embedding model identifier (BAAI/bge-small-en-v1.5 via fastembed).
pub const EMBED_MODEL_NAME: &str = "BAAI/bge-small-en-v1.5";

/// Embedding vector dimensions. Constant across the lifetime of a database file.
pub const EMBED_DIMENSIONS: usize = 384;

/// Default max chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between text-mode chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 300;

/// Default embedding batch size for indexing runs.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Source-file extensions eligible for code indexing (lowercase, with dot).
pub const CODE_EXTENSIONS: &[&str] = &[
    ".cs", ".py", ".rs", ".ts", ".js", ".tsx", ".jsx", ".md", ".mdx", ".toml", ".json", ".yaml",
    ".yml", ".gdscript", ".tscn", ".cfg", ".csproj", ".sln",
];

/// Rich-document extensions routed through the markdown converter.
pub const DOC_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".pptx", ".xlsx", ".html"];

/// Directory names pruned during the walk (in addition to dot-directories).
pub const EXCLUDED_DIRS: &[&str] = &[
    "bin",
    "obj",
    "node_modules",
    "target",
    "__pycache__",
    ".git",
    ".godot",
    "addons",
];

/// Root-relative paths pruned during the walk.
pub const EXCLUDED_PATHS: &[&str] = &["build/_artifacts"];

/// Resolve the memory data directory. Respects `MEMORY_SIDECAR_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    std::env::var_os("MEMORY_SIDECAR_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/memory"))
}

/// Default location of the codebase index.
pub fn codebase_db_path() -> PathBuf {
    data_dir().join("codebase.sqlite")
}

/// Default location of an agent's knowledge base.
/// Falls back to the shared database when no agent is given.
pub fn knowledge_db_path(agent_id: Option<&str>) -> PathBuf {
    match agent_id {
        Some(agent) => data_dir().join("knowledge").join(format!("{agent}.sqlite")),
        None => data_dir().join("knowledge").join("shared.sqlite"),
    }
}
