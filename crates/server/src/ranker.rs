//! Top-K selection over one row of the similarity matrix.

/// Rank the indices of `row` by descending score, leaving out every index
/// for which `skip` returns true.
///
/// The sort is stable over ascending indices, so equal scores keep the
/// smaller table index first. Returns at most `k` `(index, score)` pairs.
pub fn top_k<F>(row: &[f32], k: usize, skip: F) -> Vec<(usize, f32)>
where
    F: Fn(usize) -> bool,
{
    let mut scored: Vec<(usize, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(idx, _)| !skip(idx))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_descending_and_skips_query() {
        let row = [1.0, 0.2, 0.9, 0.5];
        let ranked = top_k(&row, 5, |i| i == 0);
        assert_eq!(ranked, vec![(2, 0.9), (3, 0.5), (1, 0.2)]);
    }

    #[test]
    fn test_ties_keep_smaller_index_first() {
        let row = [0.3, 0.7, 1.0, 0.7, 0.7];
        let ranked = top_k(&row, 2, |i| i == 2);
        assert_eq!(ranked, vec![(1, 0.7), (3, 0.7)]);
    }

    #[test]
    fn test_only_skipped_indices_are_dropped() {
        // An identical movie also scores 1.0; it stays unless skipped
        let row = [1.0, 1.0, 0.0];
        assert_eq!(top_k(&row, 5, |i| i == 1), vec![(0, 1.0), (2, 0.0)]);
        assert_eq!(top_k(&row, 5, |i| i <= 1), vec![(2, 0.0)]);
    }

    #[test]
    fn test_skip_applies_before_truncation() {
        let row = [1.0, 0.9, 0.8, 0.7];
        let ranked = top_k(&row, 2, |i| i == 0 || i == 1);
        assert_eq!(ranked, vec![(2, 0.8), (3, 0.7)]);
    }

    #[test]
    fn test_truncates_to_k() {
        let row: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        let ranked = top_k(&row, 5, |i| i == 9);
        let indices: Vec<usize> = ranked.iter().map(|&(i, _)| i).collect();
        assert_eq!(indices, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn test_single_movie_yields_nothing() {
        assert!(top_k(&[1.0], 5, |i| i == 0).is_empty());
        assert!(top_k(&[1.0, 0.5], 0, |i| i == 0).is_empty());
    }
}
