//! Embedded semantic search over source repositories and long-lived
//! agent knowledge.
//!
//! The pipeline: a deterministic walker yields source files, the
//! chunker splits them along AST boundaries (sliding-window fallback),
//! chunks are embedded in batches and stored in SQLite next to a
//! sqlite-vec index. Knowledge entries get the same treatment plus an
//! FTS5 mirror, so queries can fuse dense and lexical rankings with
//! reciprocal rank fusion.

pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod indexer;
pub mod search;
