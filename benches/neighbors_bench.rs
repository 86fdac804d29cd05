use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use arxiv_atlas::similarity::{EmbeddingMatrix, NeighborComputer, SimilarityConfig};
use arxiv_atlas::util::simd;
use arxiv_atlas::vector::Vector;

fn generate_test_vectors(count: usize, dimension: usize) -> Vec<Vector> {
    (0..count)
        .map(|i| {
            Vector::new(
                (0..dimension)
                    .map(|j| ((i as f32 * 0.1 + j as f32 * 0.01).sin() * 0.5 + 0.5) * 2.0 - 1.0)
                    .collect(),
            )
        })
        .collect()
}

fn bench_dot_product(c: &mut Criterion) {
    let vectors = generate_test_vectors(2, 256);
    c.bench_function("dot_product_256", |b| {
        b.iter(|| simd::dot_product(black_box(&vectors[0].data), black_box(&vectors[1].data)))
    });
}

fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_graph");
    group.sample_size(10);

    for count in [1_000, 4_000] {
        let vectors = generate_test_vectors(count, 256);
        let ids = (0..count).map(|i| i.to_string()).collect();
        let matrix = EmbeddingMatrix::from_vectors(ids, &vectors).unwrap();
        let computer = NeighborComputer::new(SimilarityConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &matrix, |b, matrix| {
            b.iter(|| computer.compute(black_box(matrix)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dot_product, bench_neighbors);
criterion_main!(benches);
