//! Parallel brute-force top-K neighbor search.

use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use half::f16;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{AtlasError, Result};
use crate::similarity::config::SimilarityConfig;
use crate::similarity::graph::NeighborGraph;
use crate::similarity::matrix::EmbeddingMatrix;
use crate::util::simd;

/// Outcome of a possibly interrupted neighbor computation.
#[derive(Debug, Clone)]
pub struct NeighborComputation {
    /// Graph covering every row completed before the run stopped.
    pub graph: NeighborGraph,
    /// Whether all rows were computed.
    pub complete: bool,
    /// Wall time in milliseconds.
    pub elapsed_ms: f64,
}

/// Computes the top-K cosine neighbors of every row of an [`EmbeddingMatrix`].
///
/// Rows are processed block by block. Within a block each row is handed to a
/// worker of a dedicated thread pool; workers read the shared matrix and write
/// into disjoint slices of the output buffers, so no locking is involved.
pub struct NeighborComputer {
    config: SimilarityConfig,
    thread_pool: Arc<ThreadPool>,
}

impl NeighborComputer {
    /// Create a computer with its own thread pool.
    pub fn new(config: SimilarityConfig) -> Result<Self> {
        config.validate()?;
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(config.effective_threads())
            .thread_name(|i| format!("atlas-neighbors-{i}"))
            .build()
            .map_err(|e| AtlasError::invalid_argument(format!("Failed to build thread pool: {e}")))?;

        Ok(Self::with_thread_pool(config, Arc::new(thread_pool)))
    }

    /// Create a computer on an existing thread pool.
    pub fn with_thread_pool(config: SimilarityConfig, thread_pool: Arc<ThreadPool>) -> Self {
        Self {
            config,
            thread_pool,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Compute the full neighbor graph.
    pub fn compute(&self, matrix: &EmbeddingMatrix) -> Result<NeighborGraph> {
        let never = AtomicBool::new(false);
        let run = self.compute_with_cancel(matrix, &never, |_, _| Ok(()))?;
        Ok(run.graph)
    }

    /// Compute the neighbor graph, stopping early when `cancel` is set or the
    /// progress callback fails.
    ///
    /// The flag and callback are consulted between blocks. Rows finished before
    /// the stop are returned as a partial graph with `complete == false`, so a
    /// long run can still be persisted.
    pub fn compute_with_cancel<F>(
        &self,
        matrix: &EmbeddingMatrix,
        cancel: &AtomicBool,
        mut progress: F,
    ) -> Result<NeighborComputation>
    where
        F: FnMut(usize, usize) -> Result<()>,
    {
        let start = Instant::now();
        let n = matrix.len();
        let width = self.config.neighbors.min(n.saturating_sub(1));

        if n > u32::MAX as usize {
            return Err(AtlasError::invalid_argument(
                "Collections larger than u32::MAX rows are not supported",
            ));
        }

        info!(
            "Computing {} neighbors for {} documents ({} dims, block {}, {} threads)",
            width,
            n,
            matrix.dimension(),
            self.config.block_size,
            self.thread_pool.current_num_threads()
        );

        let mut indices = vec![0u32; n * width];
        let mut scores = vec![f16::ZERO; n * width];
        let mut rows_done = if width == 0 { n } else { 0 };

        if width > 0 {
            let block_rows = self.config.block_size;
            let mut block_start = 0;

            while block_start < n {
                if cancel.load(Ordering::Relaxed) {
                    warn!("Neighbor computation cancelled after {rows_done} of {n} rows");
                    break;
                }

                let block_end = (block_start + block_rows).min(n);
                let idx_block = &mut indices[block_start * width..block_end * width];
                let score_block = &mut scores[block_start * width..block_end * width];

                self.thread_pool.install(|| {
                    idx_block
                        .par_chunks_mut(width)
                        .zip(score_block.par_chunks_mut(width))
                        .enumerate()
                        .for_each_init(
                            || (vec![0.0f32; n], Vec::with_capacity(n)),
                            |(row_scores, order), (offset, (idx_out, score_out))| {
                                select_row_neighbors(
                                    matrix,
                                    block_start + offset,
                                    row_scores,
                                    order,
                                    idx_out,
                                    score_out,
                                );
                            },
                        );
                });

                rows_done = block_end;
                block_start = block_end;
                debug!("{:.2}% ({rows_done}/{n})", rows_done as f64 / n as f64 * 100.0);

                if let Err(e) = progress(rows_done, n) {
                    warn!("Stopping neighbor computation after {rows_done} rows: {e}");
                    break;
                }
            }
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let complete = rows_done == n;
        if complete {
            info!("Neighbor computation finished in {elapsed_ms:.1} ms");
        }

        let graph = NeighborGraph::from_parts(
            matrix.ids().to_vec(),
            width,
            rows_done,
            indices,
            scores,
        );

        Ok(NeighborComputation {
            graph,
            complete,
            elapsed_ms,
        })
    }
}

/// Fill `idx_out`/`score_out` with the best `idx_out.len()` neighbors of `row`.
///
/// Ordering is by descending similarity with ties broken by ascending index,
/// which makes the output deterministic regardless of thread scheduling. The
/// row itself is excluded by index, so an exact duplicate vector elsewhere in
/// the matrix is still reported as a neighbor.
fn select_row_neighbors(
    matrix: &EmbeddingMatrix,
    row: usize,
    row_scores: &mut [f32],
    order: &mut Vec<u32>,
    idx_out: &mut [u32],
    score_out: &mut [f16],
) {
    let width = idx_out.len();
    simd::dot_product_rows(
        matrix.row(row),
        matrix.as_slice(),
        matrix.dimension(),
        row_scores,
    );
    let row_scores: &[f32] = row_scores;

    order.clear();
    order.extend((0..row_scores.len() as u32).filter(|&j| j as usize != row));

    let by_rank = |a: &u32, b: &u32| -> CmpOrdering {
        row_scores[*b as usize]
            .total_cmp(&row_scores[*a as usize])
            .then_with(|| a.cmp(b))
    };

    if width < order.len() {
        order.select_nth_unstable_by(width - 1, by_rank);
        order.truncate(width);
    }
    order.sort_unstable_by(by_rank);

    for (slot, &target) in order.iter().enumerate() {
        idx_out[slot] = target;
        score_out[slot] = f16::from_f32(row_scores[target as usize]);
    }
}
