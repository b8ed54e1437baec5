//! Parallel processing helpers.

/// Multiplier for number of chunks relative to CPU threads.
/// Using 2x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 2;

/// Rows per chunk for row-parallel image loops.
///
/// Splits `height` into roughly `threads * 2` chunks, at least one row each.
#[inline]
pub fn rows_per_chunk(height: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// All unordered index pairs `(i, j)` with `i < j < n`, in lexicographic order.
pub fn unordered_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            pairs.push((i, j));
        }
    }
    pairs
}
