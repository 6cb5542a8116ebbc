use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use memory_sidecar::config;
use memory_sidecar::db::Database;
use memory_sidecar::embeddings::{Embedder, FastEmbedder};
use memory_sidecar::indexer::{self, IndexOptions};
use memory_sidecar::search;

#[derive(Debug, Parser)]
#[command(name = "memory-sidecar")]
#[command(version)]
#[command(about = "Embedding, indexing, and knowledge search for agent memory")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Index a codebase directory into SQLite with vector embeddings
    Index {
        source_path: PathBuf,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Max chunk size in characters
        #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Overlap between chunks
        #[arg(long, default_value_t = config::DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,
        /// Embedding batch size
        #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Search the codebase index by semantic similarity
    Search {
        query: String,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Number of results
        #[arg(long, default_value_t = 10)]
        top_k: usize,
        /// Output as JSON
        #[arg(long)]
        json_output: bool,
    },
    /// Index a documents directory (PDF, DOCX, PPTX, XLSX, HTML) via markdown conversion
    IndexDocs {
        docs_path: PathBuf,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Max chunk size in characters
        #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Overlap between chunks
        #[arg(long, default_value_t = config::DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,
        /// Embedding batch size
        #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Generate an embedding vector for a text string. Outputs a JSON array
    Embed { text: String },
    /// Store a knowledge entry for an agent
    Store {
        content: String,
        /// Agent ID
        #[arg(long)]
        agent: String,
        #[arg(long, value_enum)]
        category: Category,
        /// Tags as key:value pairs
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Search an agent's knowledge base by semantic similarity
    Query {
        query: String,
        /// Agent ID
        #[arg(long)]
        agent: String,
        /// Filter by category
        #[arg(long, value_enum)]
        category: Option<Category>,
        /// Number of results
        #[arg(long, default_value_t = 10)]
        top_k: usize,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json_output: bool,
        /// Fuse vector and full-text rankings (default)
        #[arg(long, overrides_with = "no_hybrid")]
        hybrid: bool,
        /// Vector-only search
        #[arg(long)]
        no_hybrid: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Category {
    Pattern,
    Pitfall,
    Codebase,
    Preference,
    Outcome,
}

impl Category {
    fn as_str(self) -> &'static str {
        match self {
            Category::Pattern => "pattern",
            Category::Pitfall => "pitfall",
            Category::Codebase => "codebase",
            Category::Preference => "preference",
            Category::Outcome => "outcome",
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("memory_sidecar=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().cmd {
        Command::Index {
            source_path,
            db,
            chunk_size,
            chunk_overlap,
            batch_size,
        } => {
            let db_path = db.unwrap_or_else(config::codebase_db_path);
            println!("Indexing {} -> {}", source_path.display(), db_path.display());
            let database = Database::open(&db_path)?;
            let stats = indexer::index_codebase(
                &database,
                &source_path,
                &FastEmbedder::new(),
                &IndexOptions {
                    chunk_size,
                    chunk_overlap,
                    batch_size,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }

        Command::Search {
            query,
            db,
            top_k,
            json_output,
        } => {
            let db_path = db.unwrap_or_else(config::codebase_db_path);
            let database = Database::open(&db_path)?;
            let results = search::search_codebase(&database, &FastEmbedder::new(), &query, top_k)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results found.");
            } else {
                for hit in results {
                    println!("[{:.3}] {}:{}", hit.score, hit.filename, hit.location);
                    for line in hit.code.trim().lines().take(3) {
                        println!("    {line}");
                    }
                    println!("---");
                }
            }
        }

        Command::IndexDocs {
            docs_path,
            db,
            chunk_size,
            chunk_overlap,
            batch_size,
        } => {
            #[cfg(feature = "docs")]
            {
                let db_path = db.unwrap_or_else(config::codebase_db_path);
                println!("Indexing documents {} -> {}", docs_path.display(), db_path.display());
                let database = Database::open(&db_path)?;
                let stats = indexer::index_documents(
                    &database,
                    &docs_path,
                    &indexer::converter::MarkdownConverter::new(),
                    &FastEmbedder::new(),
                    &IndexOptions {
                        chunk_size,
                        chunk_overlap,
                        batch_size,
                    },
                )?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            #[cfg(not(feature = "docs"))]
            {
                let _ = (docs_path, db, chunk_size, chunk_overlap, batch_size);
                anyhow::bail!(
                    "Document conversion not available. Rebuild with: cargo install --features docs"
                );
            }
        }

        Command::Embed { text } => {
            let vector = FastEmbedder::new().embed_one(&text)?;
            println!("{}", serde_json::to_string(&vector)?);
        }

        Command::Store {
            content,
            agent,
            category,
            tags,
            db,
        } => {
            let db_path = db.unwrap_or_else(|| config::knowledge_db_path(Some(&agent)));
            let database = Database::open(&db_path)?;

            let mut tag_map = BTreeMap::new();
            for tag in &tags {
                if let Some((key, value)) = tag.split_once(':') {
                    tag_map.insert(key.to_string(), value.to_string());
                }
            }
            let tags = if tag_map.is_empty() { None } else { Some(&tag_map) };

            let id = search::store_knowledge(
                &database,
                &FastEmbedder::new(),
                &content,
                category.as_str(),
                tags,
            )?;
            println!(
                "{}",
                serde_json::json!({ "id": id, "agent": agent, "category": category.as_str() })
            );
        }

        Command::Query {
            query,
            agent,
            category,
            top_k,
            db,
            json_output,
            hybrid: _,
            no_hybrid,
        } => {
            let db_path = db.unwrap_or_else(|| config::knowledge_db_path(Some(&agent)));
            let database = Database::open(&db_path)?;
            let results = search::query_knowledge(
                &database,
                &FastEmbedder::new(),
                &query,
                category.map(Category::as_str),
                top_k,
                !no_hybrid,
            )?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results found.");
            } else {
                for hit in results {
                    println!("[{:.3}] {}", hit.relevance, hit.category);
                    println!("    {}", truncate_chars(&hit.content, 120));
                    if let Some(tags) = &hit.tags {
                        println!("    tags: {}", serde_json::to_string(tags)?);
                    }
                    println!("---");
                }
            }
        }
    }

    Ok(())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
