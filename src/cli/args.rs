//! Command line argument parsing for the atlas CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Atlas - semantic retrieval over arXiv abstracts
#[derive(Parser, Debug, Clone)]
#[command(name = "atlas")]
#[command(about = "Related-paper graphs and reranked semantic search over arXiv abstracts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AtlasArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AtlasArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.max(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute the related-paper graph of a document collection
    Neighbors(NeighborsArgs),

    /// Run a semantic query against a category
    Query(QueryArgs),

    /// Print the stored abstract of a paper
    Abstract(AbstractArgs),

    /// Show the related papers of one id from a saved graph
    Related(RelatedArgs),
}

/// Arguments for the offline neighbor computation
#[derive(Parser, Debug, Clone)]
pub struct NeighborsArgs {
    /// Documents with embeddings (JSONL)
    #[arg(value_name = "EMBEDDINGS_JSONL")]
    pub input: PathBuf,

    /// Directory for the graph and its exports
    #[arg(value_name = "OUT_DIR")]
    pub output_dir: PathBuf,

    /// Neighbors kept per document (overrides the config file)
    #[arg(short = 'k', long)]
    pub neighbors: Option<usize>,

    /// Neighbors written to the percentage export (overrides the config file)
    #[arg(long)]
    pub export_neighbors: Option<usize>,

    /// Worker threads, 0 for one per core (overrides the config file)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for a semantic query
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Category whose collection is searched (e.g. cs, hep-th)
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Free-text query
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Candidates retrieved from the vector index
    #[arg(long, default_value = "200")]
    pub top_k: usize,

    /// Results returned
    #[arg(short = 'n', long, default_value = "5")]
    pub top_n: usize,

    /// Rerank candidates before selection
    #[arg(short, long)]
    pub rerank: bool,

    /// Minimum rerank score a result must exceed
    #[arg(long, default_value = "0.1")]
    pub threshold: f32,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Cohere API key
    #[arg(long, env = "COHERE_API_KEY", hide_env_values = true)]
    pub cohere_api_key: Option<String>,
}

/// Arguments for an abstract lookup
#[derive(Parser, Debug, Clone)]
pub struct AbstractArgs {
    /// Category whose collection holds the paper
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Paper id
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for a related-paper lookup
#[derive(Parser, Debug, Clone)]
pub struct RelatedArgs {
    /// Graph file written by `neighbors`
    #[arg(value_name = "GRAPH_FILE")]
    pub graph: PathBuf,

    /// Paper id
    #[arg(value_name = "ID")]
    pub id: String,

    /// Maximum number of related papers to show
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
