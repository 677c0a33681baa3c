//! Sorting primitives shared by the hierarchy constructors.
//!
//! The canonical binary partition tree and the argmin/argmax accumulators
//! depend on a *stable* sort of indices by key; the stability is what
//! makes the canonical BPT deterministic on equal edge weights. With the
//! `parallel` feature enabled the sort is delegated to rayon's parallel
//! stable sort, which preserves the same tie-breaking.

/// Indices `0..keys.len()` sorted by non-decreasing key, stable on ties.
pub fn stable_arg_sort_by<K, F>(n: usize, key: F) -> Vec<usize>
where
    K: PartialOrd,
    F: Fn(usize) -> K + Sync,
{
    let mut indices: Vec<usize> = (0..n).collect();
    #[cfg(feature = "parallel")]
    {
        use rayon::slice::ParallelSliceMut;
        indices.par_sort_by(|&a, &b| {
            key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    #[cfg(not(feature = "parallel"))]
    {
        indices.sort_by(|&a, &b| {
            key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    indices
}

/// Stable arg-sort of a scalar slice.
pub fn stable_arg_sort(values: &[f64]) -> Vec<usize> {
    stable_arg_sort_by(values.len(), |i| values[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_on_ties() {
        let values = [1.0, 0.0, 2.0, 1.0, 1.0, 1.0, 2.0];
        let order = stable_arg_sort(&values);
        assert_eq!(order, vec![1, 0, 3, 4, 5, 2, 6]);
    }

    #[test]
    fn test_empty() {
        assert!(stable_arg_sort(&[]).is_empty());
    }
}
