//! incident-corpus CLI: runs the harvesting pipeline and inspects stored collections.
//!
//! Usage:
//!   incident-corpus run --config pipeline.yaml --sources recorded.json [--db path]
//!   incident-corpus collections <subcommand> [--db path]

use clap::{Parser, Subcommand};
use incident_corpus::annotate::{JsonDocumentWriter, ModelRegistry};
use incident_corpus::pipeline::write_triples_to;
use incident_corpus::services::RecordedSources;
use incident_corpus::{
    CollectionKey, CollectionStore, OpenStore, Pipeline, PipelineConfig, PipelineServices, SqliteStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "incident-corpus",
    version,
    about = "Harvest incidents and build reference-text corpora"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for every configured incident type and language set
    Run {
        /// Pipeline configuration (YAML)
        #[arg(long)]
        config: PathBuf,
        /// Recorded service responses to replay (JSON)
        #[arg(long)]
        sources: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Inspect stored collections
    Collections {
        #[command(subcommand)]
        action: CollectionAction,
        /// Path to SQLite database file
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List stored collections
    List,
    /// Print a stored collection as JSON
    Show {
        incident_type: String,
        /// Language tags, e.g. `en nl pilot`
        #[arg(required = true)]
        languages: Vec<String>,
    },
    /// Write a stored collection's triples to a file
    Export {
        incident_type: String,
        #[arg(required = true)]
        languages: Vec<String>,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
    /// Delete a stored collection
    Delete {
        incident_type: String,
        #[arg(required = true)]
        languages: Vec<String>,
    },
}

/// Get the default database path (~/.local/share/incident-corpus/collections.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("incident-corpus").join("collections.db")
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

async fn cmd_run(config: PathBuf, sources: PathBuf, db: Option<PathBuf>) -> i32 {
    let config = match PipelineConfig::load(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let sources = match RecordedSources::load(&sources) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let store = match open_store(db) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let writer = Arc::new(JsonDocumentWriter::new(config.documents_dir()));
    let models = config
        .languages
        .keys()
        .fold(ModelRegistry::new(), |registry, language| {
            registry.with_model(language.clone(), writer.clone())
        });

    let pipeline = match Pipeline::new(config, PipelineServices::from_single(sources), store) {
        Ok(p) => p.with_models(models),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let report = pipeline.run().await;

    println!("{:<32}  {:>9}  {:>6}  {:>8}", "UNIT", "INCIDENTS", "PILOT", "SECONDS");
    println!("{}", "-".repeat(62));
    for unit in &report.units {
        let stem = incident_corpus::model::output_stem(&unit.incident_type, &unit.languages);
        match &unit.result {
            Ok(summary) => println!(
                "{:<32}  {:>9}  {:>6}  {:>8.1}",
                stem,
                summary.incidents,
                summary.pilot_incidents,
                summary.timings.total().as_secs_f64()
            ),
            Err(e) => println!("{:<32}  failed: {}", stem, e),
        }
    }
    println!(
        "\nRun {} finished in {:.1}s: {} succeeded, {} failed",
        report.run_id,
        report.elapsed.as_secs_f64(),
        report.succeeded(),
        report.failed()
    );

    if report.failed() > 0 {
        1
    } else {
        0
    }
}

fn cmd_collections_list(store: &SqliteStore) -> i32 {
    let summaries = match store.list() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if summaries.is_empty() {
        println!("No collections stored.");
        return 0;
    }
    println!("{:<32}  {:>9}  {:>10}  {:<25}", "COLLECTION", "INCIDENTS", "REF TEXTS", "CREATED");
    println!("{}", "-".repeat(82));
    for s in summaries {
        println!(
            "{:<32}  {:>9}  {:>10}  {:<25}",
            s.key,
            s.incidents,
            s.reference_texts,
            s.created_at.to_rfc3339()
        );
    }
    0
}

fn cmd_collections_show(store: &SqliteStore, key: &CollectionKey) -> i32 {
    match store.load(key) {
        Ok(Some(collection)) => match serde_json::to_string_pretty(&collection) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Ok(None) => {
            eprintln!("Error: collection '{}' not found", key);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_collections_export(store: &SqliteStore, key: &CollectionKey, out: &PathBuf) -> i32 {
    let collection = match store.load(key) {
        Ok(Some(c)) => c,
        Ok(None) => {
            eprintln!("Error: collection '{}' not found", key);
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match write_triples_to(&collection, out) {
        Ok(()) => {
            println!("Wrote triples for '{}' to {}", key, out.display());
            0
        }
        Err(e) => {
            eprintln!("Error: cannot write '{}': {}", out.display(), e);
            1
        }
    }
}

fn cmd_collections_delete(store: &SqliteStore, key: &CollectionKey) -> i32 {
    match store.delete(key) {
        Ok(true) => {
            println!("Deleted collection '{}'", key);
            0
        }
        Ok(false) => {
            eprintln!("Error: collection '{}' not found", key);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run { config, sources, db } => cmd_run(config, sources, db).await,
        Commands::Collections { action, db } => {
            let store = match open_store(db) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            match action {
                CollectionAction::List => cmd_collections_list(&store),
                CollectionAction::Show { incident_type, languages } => {
                    cmd_collections_show(&store, &CollectionKey::new(incident_type, languages))
                }
                CollectionAction::Export { incident_type, languages, out } => {
                    cmd_collections_export(&store, &CollectionKey::new(incident_type, languages), &out)
                }
                CollectionAction::Delete { incident_type, languages } => {
                    cmd_collections_delete(&store, &CollectionKey::new(incident_type, languages))
                }
            }
        }
    };
    std::process::exit(code);
}
