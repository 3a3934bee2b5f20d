//! CLI glue for manual operation: a thin `clap` front end wrapping the
//! library's public operations. All logic lives in the library crate; this
//! module only parses arguments, wires up the collaborators, and prints
//! results.

use crate::config::Config;
use crate::embedder::{Embedder, HashEmbedder};
use crate::error::Result;
use crate::indexer::Indexer;
use crate::jobs::JobManager;
use crate::mutator::{Mutator, SymbolLocator};
use crate::search::{SearchSurface, SymbolFilter};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::Storage;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[derive(Parser, Debug)]
#[command(name = "codescope", about = "Multi-language source-code indexer and symbol-search engine")]
pub struct Cli {
    /// Project root. Defaults to the current directory.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index (or reconcile) the project rooted at `--root`, then wait for it to finish.
    Index {
        #[arg(long)]
        name: Option<String>,
    },
    /// Print indexing status and per-language/per-type symbol counts for a project.
    Status { project_id: String },
    /// Re-run the parse/extract/embed/commit path for one file.
    ReindexFile {
        project_id: String,
        relative_path: String,
    },
    /// List every indexed project.
    ListProjects,
    /// Delete a project and everything derived from it.
    DeleteProject { project_id: String },
    /// Semantic search over a project's symbols.
    Search {
        project_id: String,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Resolve symbols by name_path pattern.
    FindSymbol {
        project_id: String,
        name_path: String,
        #[arg(long)]
        relative_path: Option<String>,
        #[arg(long, default_value_t = 0)]
        depth: u32,
        #[arg(long, default_value_t = false)]
        substring: bool,
    },
    /// Replace a symbol's full byte span with new source text read from stdin.
    ReplaceSymbol {
        project_id: String,
        name_path: String,
        #[arg(long)]
        relative_path: Option<String>,
    },
    /// Insert text immediately after a symbol's byte span, read from stdin.
    InsertAfterSymbol {
        project_id: String,
        name_path: String,
        #[arg(long)]
        relative_path: Option<String>,
    },
    /// Insert text immediately before a symbol's byte span, read from stdin.
    InsertBeforeSymbol {
        project_id: String,
        name_path: String,
        #[arg(long)]
        relative_path: Option<String>,
    },
    /// Delete a symbol, collapsing the blank lines it leaves behind.
    DeleteSymbol {
        project_id: String,
        name_path: String,
        #[arg(long)]
        relative_path: Option<String>,
    },
}

/// Resolves the project root: `--root` flag, then the `CODESCOPE_WORKSPACE`
/// environment variable, then the current directory. A path coming from the
/// flag or the environment gets tilde-expanded and canonicalized so `~/code`
/// and symlinked paths behave the same as a plain absolute path.
fn workspace_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(root) = &cli.root {
        return Ok(expand_and_canonicalize(root));
    }
    if let Ok(path) = std::env::var("CODESCOPE_WORKSPACE") {
        return Ok(expand_and_canonicalize(std::path::Path::new(&path)));
    }
    Ok(std::env::current_dir()?)
}

fn expand_and_canonicalize(path: &std::path::Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string());
    expanded.canonicalize().unwrap_or(expanded)
}

fn open_storage(root: &std::path::Path, config: &Config) -> Result<Arc<dyn Storage>> {
    let db_path = root.join(".codescope").join("index.db");
    Ok(Arc::new(SqliteStorage::open(&db_path, config.hnsw_threshold)?))
}

fn read_stdin_body() -> Result<String> {
    use std::io::Read;
    let mut body = String::new();
    std::io::stdin().read_to_string(&mut body)?;
    Ok(body)
}

pub async fn run(cli: Cli) -> Result<()> {
    let root = workspace_root(&cli)?;
    let config = Config::load(&root);
    let storage = open_storage(&root, &config)?;
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(config.embedding_dimension));
    let indexer = Indexer::new(storage.clone(), embedder.clone(), config.clone());

    match cli.command {
        Command::Index { name } => {
            let jobs = JobManager::new(indexer, config.job_ttl_seconds);
            let job = jobs.submit(&root, name.as_deref()).await?;
            let job_id = job.id.clone();
            loop {
                let status = jobs.get_job_status(&job_id)?;
                if status.status.is_terminal() {
                    println!("{:?}: {} files indexed, {} symbols found", status.status, status.files_indexed, status.symbols_found);
                    break;
                }
                sleep(Duration::from_millis(100)).await;
            }
        }
        Command::Status { project_id } => {
            let stats = storage.get_code_project_stats(&project_id).await?;
            println!("files: {}, symbols: {}", stats.total_files, stats.total_symbols);
            for (lang, count) in &stats.files_by_language {
                println!("  {lang}: {count} files");
            }
            for (kind, count) in &stats.symbols_by_type {
                println!("  {kind}: {count} symbols");
            }
        }
        Command::ReindexFile { project_id, relative_path } => {
            indexer.reindex_file(&project_id, &relative_path).await?;
            println!("reindexed {relative_path}");
        }
        Command::ListProjects => {
            for project in storage.list_code_projects().await? {
                println!("{}\t{}\t{:?}", project.project_id, project.name, project.indexing_status);
            }
        }
        Command::DeleteProject { project_id } => {
            indexer.delete_project(&project_id).await?;
            println!("deleted {project_id}");
        }
        Command::Search { project_id, query, limit } => {
            let search = SearchSurface::new(storage, embedder);
            let hits = search.search_symbols_semantic(&project_id, &query, limit, &SymbolFilter::default()).await?;
            for hit in hits {
                println!("{:.3}\t{}\t{}", hit.score, hit.symbol.name_path, hit.symbol.file_path);
            }
        }
        Command::FindSymbol { project_id, name_path, relative_path, depth, substring } => {
            let search = SearchSurface::new(storage, embedder);
            let hits = search
                .find_symbol(&project_id, &name_path, relative_path.as_deref(), &SymbolFilter::default(), depth, substring)
                .await?;
            for hit in hits {
                println!("{}\t{}:{}-{}", hit.symbol.name_path, hit.symbol.file_path, hit.symbol.start_line, hit.symbol.end_line);
            }
        }
        Command::ReplaceSymbol { project_id, name_path, relative_path } => {
            let body = read_stdin_body()?;
            let mutator = Mutator::new(storage, indexer, root);
            let resolved = mutator
                .resolve(&project_id, SymbolLocator::NamePath { name_path: &name_path, relative_path: relative_path.as_deref() })
                .await?;
            mutator.replace(&resolved, &body).await?;
            println!("replaced {}", resolved.name_path);
        }
        Command::InsertAfterSymbol { project_id, name_path, relative_path } => {
            let body = read_stdin_body()?;
            let mutator = Mutator::new(storage, indexer, root);
            let resolved = mutator
                .resolve(&project_id, SymbolLocator::NamePath { name_path: &name_path, relative_path: relative_path.as_deref() })
                .await?;
            mutator.insert_after(&resolved, &body).await?;
            println!("inserted after {}", resolved.name_path);
        }
        Command::InsertBeforeSymbol { project_id, name_path, relative_path } => {
            let body = read_stdin_body()?;
            let mutator = Mutator::new(storage, indexer, root);
            let resolved = mutator
                .resolve(&project_id, SymbolLocator::NamePath { name_path: &name_path, relative_path: relative_path.as_deref() })
                .await?;
            mutator.insert_before(&resolved, &body).await?;
            println!("inserted before {}", resolved.name_path);
        }
        Command::DeleteSymbol { project_id, name_path, relative_path } => {
            let mutator = Mutator::new(storage, indexer, root);
            let resolved = mutator
                .resolve(&project_id, SymbolLocator::NamePath { name_path: &name_path, relative_path: relative_path.as_deref() })
                .await?;
            mutator.delete(&resolved).await?;
            println!("deleted {}", resolved.name_path);
        }
    }

    Ok(())
}
