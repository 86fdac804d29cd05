use std::fs;
use std::sync::atomic::AtomicBool;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arxiv_atlas::error::{AtlasError, Result};
use arxiv_atlas::similarity::graph::parse_percent_export;
use arxiv_atlas::similarity::{EmbeddingMatrix, NeighborComputer, NeighborGraph, SimilarityConfig};
use arxiv_atlas::vector::Vector;

fn random_matrix(rows: usize, dimension: usize, seed: u64) -> Result<EmbeddingMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let ids = (0..rows).map(|i| format!("{i:04}")).collect();
    let vectors: Vec<Vector> = (0..rows)
        .map(|_| Vector::new((0..dimension).map(|_| rng.random_range(-1.0..1.0)).collect()))
        .collect();
    EmbeddingMatrix::from_vectors(ids, &vectors)
}

fn computer(neighbors: usize, block_size: usize, num_threads: usize) -> Result<NeighborComputer> {
    NeighborComputer::new(SimilarityConfig {
        neighbors,
        export_neighbors: neighbors.min(5),
        block_size,
        num_threads,
    })
}

fn cosine(matrix: &EmbeddingMatrix, a: usize, b: usize) -> f32 {
    matrix
        .row(a)
        .iter()
        .zip(matrix.row(b))
        .map(|(x, y)| x * y)
        .sum()
}

#[test]
fn neighbor_rows_exclude_self_and_are_sorted() -> Result<()> {
    let matrix = random_matrix(120, 32, 7)?;
    let graph = computer(10, 16, 4)?.compute(&matrix)?;

    assert!(graph.is_complete());
    assert_eq!(graph.rows(), 120);
    assert_eq!(graph.width(), 10);

    for row in 0..graph.rows() {
        let neighbors = graph.neighbors(row);
        assert!(neighbors.iter().all(|&j| j as usize != row));

        let mut unique = neighbors.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), neighbors.len());

        let scores: Vec<f32> = graph.scores(row).iter().map(|s| s.to_f32()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
    Ok(())
}

#[test]
fn neighbor_scores_match_brute_force() -> Result<()> {
    let matrix = random_matrix(60, 24, 11)?;
    let graph = computer(5, 7, 2)?.compute(&matrix)?;

    for row in 0..matrix.len() {
        let mut expected: Vec<(usize, f32)> = (0..matrix.len())
            .filter(|&j| j != row)
            .map(|j| (j, cosine(&matrix, row, j)))
            .collect();
        expected.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        for (edge, (_, score)) in graph.edges(row).zip(expected.iter()) {
            // f16 storage keeps about three significant digits.
            assert!((edge.score - score).abs() < 2e-3, "row {row}");
        }
        let best = graph.edges(row).next().map(|e| e.target as usize);
        assert!(best.is_some_and(|j| (cosine(&matrix, row, j) - expected[0].1).abs() < 2e-3));
    }
    Ok(())
}

#[test]
fn thread_count_and_block_size_do_not_change_the_graph() -> Result<()> {
    let matrix = random_matrix(90, 16, 3)?;
    let single = computer(8, 90, 1)?.compute(&matrix)?;
    let parallel = computer(8, 5, 4)?.compute(&matrix)?;

    for row in 0..matrix.len() {
        assert_eq!(single.neighbors(row), parallel.neighbors(row));
        assert_eq!(single.scores(row), parallel.scores(row));
    }
    Ok(())
}

#[test]
fn similarity_is_symmetric() -> Result<()> {
    let matrix = random_matrix(40, 8, 5)?;
    let graph = computer(39, 8, 2)?.compute(&matrix)?;

    for row in 0..graph.rows() {
        for edge in graph.edges(row) {
            let back = graph
                .edges(edge.target as usize)
                .find(|e| e.target as usize == row)
                .map(|e| e.score);
            assert_eq!(back, Some(edge.score));
        }
    }
    Ok(())
}

#[test]
fn graph_survives_save_and_load() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("graph.bin");

    let matrix = random_matrix(50, 12, 19)?;
    let graph = computer(6, 10, 2)?.compute(&matrix)?;
    graph.save(&path)?;

    let loaded = NeighborGraph::load(&path)?;
    assert_eq!(loaded.ids(), graph.ids());
    assert_eq!(loaded.width(), graph.width());
    assert_eq!(loaded.created_at(), graph.created_at());
    for row in 0..graph.rows() {
        assert_eq!(loaded.neighbors(row), graph.neighbors(row));
    }
    assert_eq!(loaded.related("0003"), graph.related("0003"));
    Ok(())
}

#[test]
fn corrupted_graph_file_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("graph.bin");

    let matrix = random_matrix(20, 4, 23)?;
    computer(3, 4, 1)?.compute(&matrix)?.save(&path)?;

    let mut bytes = fs::read(&path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, bytes)?;

    let err = NeighborGraph::load(&path).unwrap_err();
    assert!(matches!(err, AtlasError::Storage(_)));
    Ok(())
}

#[test]
fn percent_export_lists_top_neighbors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("neighbors.txt");

    let matrix = random_matrix(30, 8, 29)?;
    let graph = computer(10, 8, 2)?.compute(&matrix)?;
    graph.write_percent_export(&path, 3)?;

    let rows = parse_percent_export(&fs::read_to_string(&path)?)?;
    assert_eq!(rows.len(), 30);
    for (row, pairs) in rows.iter().enumerate() {
        assert_eq!(pairs.len(), 3);
        let expected: Vec<u32> = graph.neighbors(row)[..3].to_vec();
        let actual: Vec<u32> = pairs.iter().map(|&(j, _)| j).collect();
        assert_eq!(actual, expected);
        assert!(pairs.iter().all(|&(_, pct)| pct <= 100));
        assert!(pairs.windows(2).all(|w| w[0].1 >= w[1].1));
    }
    Ok(())
}

#[test]
fn cancelled_run_keeps_completed_rows() -> Result<()> {
    let matrix = random_matrix(64, 8, 31)?;
    let cancel = AtomicBool::new(false);
    let mut blocks = 0;

    let run = computer(4, 16, 2)?.compute_with_cancel(&matrix, &cancel, |_, _| {
        blocks += 1;
        if blocks == 2 {
            cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        }
        Ok(())
    })?;

    assert!(!run.complete);
    assert_eq!(run.graph.rows(), 32);
    assert!(!run.graph.is_complete());
    assert_eq!(run.graph.ids().len(), 64);

    let full = computer(4, 16, 2)?.compute(&matrix)?;
    for row in 0..32 {
        assert_eq!(run.graph.neighbors(row), full.neighbors(row));
    }
    Ok(())
}
