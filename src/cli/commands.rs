//! Command implementations for the atlas CLI.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::AtlasConfig;
use crate::document::jsonl::read_jsonl;
use crate::embedding::TextEmbedder;
use crate::error::{AtlasError, Result};
use crate::query::{QueryPipeline, QueryRequest};
use crate::rerank::RelevanceScorer;
use crate::retrieval::{CandidateRetriever, InMemoryVectorIndex};
use crate::similarity::{EmbeddingMatrix, NeighborComputer, NeighborGraph};

/// File names written by `neighbors` into its output directory.
pub const GRAPH_FILE: &str = "graph.bin";
pub const EXPORT_FILE: &str = "neighbors.txt";
pub const IDS_FILE: &str = "ids.txt";

/// Execute a CLI command.
pub async fn execute_command(args: AtlasArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => AtlasConfig::from_file(path)?,
        None => AtlasConfig::default(),
    };

    match &args.command {
        Command::Neighbors(neighbors_args) => {
            compute_neighbors(neighbors_args.clone(), &config, &args).await
        }
        Command::Query(query_args) => run_query(query_args.clone(), &config, &args).await,
        Command::Abstract(abstract_args) => {
            show_abstract(abstract_args.clone(), &config, &args).await
        }
        Command::Related(related_args) => show_related(related_args.clone(), &args),
    }
}

/// Compute the neighbor graph of a JSONL collection and persist it.
///
/// Ctrl-C stops the run after the current block; rows finished so far are
/// still written before the command reports the interruption.
async fn compute_neighbors(
    args: NeighborsArgs,
    config: &AtlasConfig,
    cli_args: &AtlasArgs,
) -> Result<()> {
    let mut similarity = config.similarity.clone();
    if let Some(neighbors) = args.neighbors {
        similarity.neighbors = neighbors;
    }
    if let Some(export_neighbors) = args.export_neighbors {
        similarity.export_neighbors = export_neighbors;
    }
    if let Some(threads) = args.threads {
        similarity.num_threads = threads;
    }
    similarity.validate()?;
    let export_neighbors = similarity.export_neighbors;

    info!("Reading documents from {}", args.input.display());
    let matrix = {
        let documents = read_jsonl(&args.input)?;
        EmbeddingMatrix::from_documents(&documents)?
    };
    let documents = matrix.len();
    let computer = NeighborComputer::new(similarity)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&cancel);
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current block");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let worker_flag = Arc::clone(&cancel);
    let run = tokio::task::spawn_blocking(move || {
        computer.compute_with_cancel(&matrix, &worker_flag, |done, total| {
            debug!("{done}/{total} rows");
            Ok(())
        })
    })
    .await
    .map_err(|e| AtlasError::storage(format!("Neighbor worker failed: {e}")))??;
    watcher.abort();

    fs::create_dir_all(&args.output_dir)?;
    let graph_path = args.output_dir.join(GRAPH_FILE);
    let export_path = args.output_dir.join(EXPORT_FILE);
    let ids_path = args.output_dir.join(IDS_FILE);

    run.graph.save(&graph_path)?;
    run.graph.write_percent_export(&export_path, export_neighbors)?;
    write_ids(&ids_path, run.graph.ids())?;

    let summary = NeighborsSummary {
        documents,
        rows_computed: run.graph.rows(),
        neighbors: run.graph.width(),
        complete: run.complete,
        elapsed_ms: run.elapsed_ms,
        graph_path: graph_path.to_string_lossy().to_string(),
        export_path: export_path.to_string_lossy().to_string(),
        ids_path: ids_path.to_string_lossy().to_string(),
    };
    output_result(&summary, cli_args)?;

    if !run.complete {
        return Err(AtlasError::cancelled(format!(
            "{} of {} rows computed, partial graph written to {}",
            summary.rows_computed, documents, summary.graph_path
        )));
    }
    Ok(())
}

fn write_ids(path: &Path, ids: &[String]) -> Result<()> {
    let mut text = ids.join("\n");
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Load the collection backing `category` into a fresh in-memory index.
fn load_category(
    config: &AtlasConfig,
    category: &str,
) -> Result<(Arc<InMemoryVectorIndex>, CandidateRetriever)> {
    let index = Arc::new(InMemoryVectorIndex::with_metric(config.distance_metric));
    let retriever = CandidateRetriever::new(index.clone(), config.collection_prefix.clone());

    let collection = retriever.collection_name(category)?;
    let path = config.collection_path(category);
    if !path.is_file() {
        return Err(AtlasError::collection_not_found(collection));
    }

    let count = index.load_collection(collection.as_str(), &path)?;
    debug!("Loaded {count} documents from {}", path.display());
    Ok((index, retriever))
}

#[cfg(feature = "embeddings-openai")]
fn build_embedder(config: &AtlasConfig, api_key: Option<String>) -> Result<Arc<dyn TextEmbedder>> {
    use crate::embedding::OpenAITextEmbedder;

    let embedder = OpenAITextEmbedder::new(
        api_key.unwrap_or_default(),
        config.embedding.model.clone(),
        config.embedding.dimension,
    )?
    .with_max_inputs_per_call(config.embedding.max_inputs_per_call)?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "embeddings-openai"))]
fn build_embedder(_config: &AtlasConfig, _api_key: Option<String>) -> Result<Arc<dyn TextEmbedder>> {
    Err(AtlasError::invalid_argument(
        "atlas was built without the embeddings-openai feature",
    ))
}

#[cfg(feature = "rerank-cohere")]
fn build_scorer(config: &AtlasConfig, api_key: Option<String>) -> Result<Arc<dyn RelevanceScorer>> {
    use crate::rerank::CohereRelevanceScorer;

    let scorer = CohereRelevanceScorer::new(api_key.unwrap_or_default(), config.rerank.model.clone())?;
    Ok(Arc::new(scorer))
}

#[cfg(not(feature = "rerank-cohere"))]
fn build_scorer(_config: &AtlasConfig, _api_key: Option<String>) -> Result<Arc<dyn RelevanceScorer>> {
    Err(AtlasError::invalid_argument(
        "atlas was built without the rerank-cohere feature",
    ))
}

/// Run a semantic query.
async fn run_query(args: QueryArgs, config: &AtlasConfig, cli_args: &AtlasArgs) -> Result<()> {
    let mut request = QueryRequest::new(args.query, args.category)
        .with_top_k(args.top_k)
        .with_top_n(args.top_n);
    if args.rerank {
        request = request.with_rerank(args.threshold);
    }
    request.validate()?;

    let (index, _) = load_category(config, &request.category)?;
    let embedder = build_embedder(config, args.openai_api_key)?;
    let mut pipeline = QueryPipeline::new(embedder, index, config.collection_prefix.clone());
    if request.use_rerank {
        pipeline = pipeline.with_reranker(build_scorer(config, args.cohere_api_key)?);
    }

    let start = Instant::now();
    let results = pipeline
        .run_with_timeout(&request, config.request_timeout())
        .await?;

    let output = QueryOutput {
        reranked: request.use_rerank,
        duration_ms: start.elapsed().as_millis() as u64,
        query: request.query,
        category: request.category,
        results,
    };
    output_result(&output, cli_args)
}

/// Print the stored abstract of a paper.
async fn show_abstract(args: AbstractArgs, config: &AtlasConfig, cli_args: &AtlasArgs) -> Result<()> {
    let (_, retriever) = load_category(config, &args.category)?;
    let content = retriever.lookup_abstract(&args.category, &args.id).await?;

    output_result(
        &AbstractOutput {
            id: args.id,
            category: args.category,
            content,
        },
        cli_args,
    )
}

/// Show the related papers of one id from a saved graph.
fn show_related(args: RelatedArgs, cli_args: &AtlasArgs) -> Result<()> {
    let graph = NeighborGraph::load(&args.graph)?;
    let related = graph
        .related(&args.id)
        .ok_or_else(|| AtlasError::document_not_found(args.id.clone()))?
        .into_iter()
        .take(args.limit)
        .map(|(id, similarity)| RelatedPaper {
            id: id.to_string(),
            similarity,
        })
        .collect();

    output_result(
        &RelatedOutput {
            id: args.id,
            related,
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;

    use super::*;
    use crate::document::Document;
    use crate::document::jsonl::write_jsonl;
    use crate::vector::Vector;

    fn write_collection(dir: &Path) {
        let documents = vec![
            Document::new("a", Vector::new(vec![1.0, 0.0])).with_content("alpha"),
            Document::new("b", Vector::new(vec![0.9, 0.1])).with_content("beta"),
            Document::new("c", Vector::new(vec![0.0, 1.0])).with_content("gamma"),
        ];
        write_jsonl(dir.join("arxiv_cs.jsonl"), &documents).unwrap();
    }

    fn config_for(dir: &Path) -> AtlasConfig {
        AtlasConfig {
            data_dir: dir.to_path_buf(),
            ..AtlasConfig::default()
        }
    }

    #[tokio::test]
    async fn test_neighbors_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_collection(dir.path());
        let out = dir.path().join("graph");

        let input = dir.path().join("arxiv_cs.jsonl");
        let argv: Vec<OsString> = vec![
            "atlas".into(),
            "-q".into(),
            "neighbors".into(),
            input.into_os_string(),
            out.clone().into_os_string(),
            "-k".into(),
            "2".into(),
            "--export-neighbors".into(),
            "1".into(),
        ];
        let args = AtlasArgs::try_parse_from(argv).unwrap();
        execute_command(args).await.unwrap();

        let graph = NeighborGraph::load(out.join(GRAPH_FILE)).unwrap();
        assert!(graph.is_complete());
        assert_eq!(graph.width(), 2);
        assert_eq!(graph.related("a").unwrap()[0].0, "b");

        let export = fs::read_to_string(out.join(EXPORT_FILE)).unwrap();
        assert_eq!(export.lines().count(), 3);
        assert!(export.lines().all(|line| !line.contains(';')));

        let ids = fs::read_to_string(out.join(IDS_FILE)).unwrap();
        assert_eq!(ids, "a\nb\nc\n");
    }

    #[tokio::test]
    async fn test_abstract_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_collection(dir.path());
        let config = config_for(dir.path());

        let (_, retriever) = load_category(&config, "cs").unwrap();
        assert_eq!(retriever.lookup_abstract("cs", "c").await.unwrap(), "gamma");
    }

    #[test]
    fn test_missing_collection_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let err = load_category(&config, "hep").err().unwrap();
        assert!(matches!(err, AtlasError::CollectionNotFound(ref name) if name == "arxiv_hep"));
    }

    #[test]
    fn test_invalid_category_rejected_before_disk_access() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let err = load_category(&config, "../secrets").err().unwrap();
        assert!(matches!(err, AtlasError::Validation(_)));
    }

    #[tokio::test]
    async fn test_query_validation_happens_first() {
        let args = AtlasArgs::try_parse_from([
            "atlas", "-q", "query", "cs", "anything", "--top-k", "2", "-n", "5",
        ])
        .unwrap();
        let err = execute_command(args).await.unwrap_err();
        assert!(matches!(err, AtlasError::Validation(_)));
    }
}
