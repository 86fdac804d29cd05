//! SIMD kernels for dense vector math.
//!
//! The similarity computer spends nearly all of its time in [`dot_product`],
//! so it is vectorized with the `wide` crate eight lanes at a time.

use wide::f32x8;

const LANES: usize = 8;

/// Dot product of two equally sized slices.
///
/// Extra trailing elements of the longer slice are ignored; callers are
/// expected to validate dimensions up front.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let a_rem = a_chunks.remainder();
    let b_rem = b_chunks.remainder();

    let mut acc = f32x8::ZERO;
    for (ca, cb) in a_chunks.zip(b_chunks) {
        let va = f32x8::new(load(ca));
        let vb = f32x8::new(load(cb));
        acc = va.mul_add(vb, acc);
    }

    let mut sum = acc.reduce_add();
    for (x, y) in a_rem.iter().zip(b_rem.iter()) {
        sum += x * y;
    }
    sum
}

/// Dot products of `query` against every row of a row-major matrix.
///
/// `out` must hold exactly `matrix.len() / dimension` elements.
pub fn dot_product_rows(query: &[f32], matrix: &[f32], dimension: usize, out: &mut [f32]) {
    for (slot, row) in out.iter_mut().zip(matrix.chunks_exact(dimension)) {
        *slot = dot_product(query, row);
    }
}

/// Squared L2 norm of a slice.
pub fn squared_norm(a: &[f32]) -> f32 {
    dot_product(a, a)
}

#[inline]
fn load(chunk: &[f32]) -> [f32; LANES] {
    let mut lanes = [0.0f32; LANES];
    lanes.copy_from_slice(chunk);
    lanes
}
