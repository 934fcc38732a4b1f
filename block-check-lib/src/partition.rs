//! Splitting a target list into balanced chunks for the worker pool.

use crate::error::BlockCheckError;

/// Split `items` into exactly `n` contiguous, near-equal chunks.
///
/// Chunk boundaries follow the floating average `len / n`: chunk `i` spans
/// `floor(i * avg) .. floor((i + 1) * avg)`, with the final boundary pinned
/// to `len`. Each boundary is computed independently so rounding never
/// drifts across chunks.
///
/// Guarantees:
/// - exactly `n` chunks, even when `items.len() < n` (the extra chunks are
///   empty)
/// - concatenating the chunks reproduces `items` in order, with no loss and
///   no duplication
/// - chunk sizes differ by at most one
///
/// # Errors
///
/// Returns `ConfigError` when `n == 0` — a worker pool of size zero is a
/// caller contract violation.
pub fn partition<T: Clone>(items: &[T], n: usize) -> crate::Result<Vec<Vec<T>>> {
    if n == 0 {
        return Err(BlockCheckError::config(
            "cannot partition targets across zero workers",
        ));
    }

    let len = items.len();
    let avg = len as f64 / n as f64;

    let mut chunks = Vec::with_capacity(n);
    for i in 0..n {
        let start = (i as f64 * avg) as usize;
        let end = if i + 1 == n {
            len
        } else {
            ((i + 1) as f64 * avg) as usize
        };
        chunks.push(items[start..end].to_vec());
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(chunks: &[Vec<u32>]) -> Vec<u32> {
        chunks.iter().flatten().copied().collect()
    }

    #[test]
    fn test_partition_rejects_zero_workers() {
        assert!(partition(&[1, 2, 3], 0).is_err());
    }

    #[test]
    fn test_partition_23_targets_into_10_chunks() {
        let items: Vec<u32> = (1..=23).collect();
        let chunks = partition(&items, 10).unwrap();

        assert_eq!(chunks.len(), 10);
        for chunk in &chunks {
            assert!(chunk.len() == 2 || chunk.len() == 3, "size {}", chunk.len());
        }
        assert_eq!(concat(&chunks), items);
    }

    #[test]
    fn test_partition_empty_input_yields_n_empty_chunks() {
        let chunks = partition::<u32>(&[], 5).unwrap();
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_partition_fewer_items_than_workers() {
        let chunks = partition(&[1, 2, 3], 5).unwrap();
        assert_eq!(chunks.len(), 5);
        assert_eq!(concat(&chunks), vec![1, 2, 3]);
        // With len < n each chunk holds zero or one item
        assert!(chunks.iter().all(|c| c.len() <= 1));
    }

    #[test]
    fn test_partition_single_worker_takes_everything() {
        let items: Vec<u32> = (0..7).collect();
        let chunks = partition(&items, 1).unwrap();
        assert_eq!(chunks, vec![items]);
    }

    #[test]
    fn test_partition_completeness_and_balance_across_shapes() {
        for len in [0usize, 1, 2, 9, 10, 11, 23, 100, 101, 997] {
            for n in [1usize, 2, 3, 7, 10, 64] {
                let items: Vec<u32> = (0..len as u32).collect();
                let chunks = partition(&items, n).unwrap();

                assert_eq!(chunks.len(), n, "len={} n={}", len, n);
                assert_eq!(concat(&chunks), items, "len={} n={}", len, n);

                let floor = len / n;
                let ceil = len.div_ceil(n);
                for chunk in &chunks {
                    assert!(
                        chunk.len() == floor || chunk.len() == ceil,
                        "len={} n={} chunk={}",
                        len,
                        n,
                        chunk.len()
                    );
                }
            }
        }
    }
}
