//! Pairwise cosine similarity over count vectors.
//!
//! `sim[i][j] = dot(v_i, v_j) / (|v_i| * |v_j|)`, with the diagonal pinned
//! to 1.0 and zero-norm pairs defined as 0. The per-pair arithmetic is
//! commutative (integer dot product, product of the same two norms), so the
//! matrix comes out exactly symmetric without a mirroring pass.
//!
//! This is the O(N² · nnz) step of the offline build. Rows are computed in
//! parallel with Rayon.

use crate::vectorizer::CountVector;
use data_loader::{Result, SimilarityMatrix};
use rayon::prelude::*;
use tracing::{debug, instrument};

fn cosine_from_parts(dot: u64, norm_a: f64, norm_b: f64) -> f32 {
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return 0.0;
    }
    ((dot as f64) / denom).clamp(0.0, 1.0) as f32
}

/// Cosine similarity between two vectors; 0 if either has zero norm
pub fn cosine(a: &CountVector, b: &CountVector) -> f32 {
    cosine_from_parts(a.dot(b), a.norm(), b.norm())
}

/// Compute the full N×N similarity matrix
#[instrument(skip_all, fields(movies = vectors.len()))]
pub fn similarity_matrix(vectors: &[CountVector]) -> Result<SimilarityMatrix> {
    let norms: Vec<f64> = vectors.par_iter().map(CountVector::norm).collect();
    let zero_vectors = norms.iter().filter(|&&n| n == 0.0).count();
    if zero_vectors > 0 {
        debug!("{} movies have empty count vectors", zero_vectors);
    }

    let rows: Vec<Vec<f32>> = (0..vectors.len())
        .into_par_iter()
        .map(|i| {
            (0..vectors.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        cosine_from_parts(vectors[i].dot(&vectors[j]), norms[i], norms[j])
                    }
                })
                .collect()
        })
        .collect();

    SimilarityMatrix::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::CountVectorizer;

    fn vectors(corpus: &[&str]) -> Vec<CountVector> {
        CountVectorizer::new().fit_transform(corpus).1
    }

    #[test]
    fn test_cosine_bounds() {
        let v = vectors(&["alien space", "alien space", "drama love", "!!"]);
        assert!((cosine(&v[0], &v[1]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine(&v[0], &v[2]), 0.0);
        // zero-norm vector
        assert_eq!(cosine(&v[0], &v[3]), 0.0);
        assert_eq!(cosine(&v[3], &v[3]), 0.0);
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let v = vectors(&[
            "alien space war marine",
            "alien alien space",
            "drama love romance",
            "space romance drama",
            "",
        ]);
        let matrix = similarity_matrix(&v).unwrap();
        assert_eq!(matrix.dim(), 5);

        for i in 0..5 {
            assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..5 {
                let score = matrix.get(i, j).unwrap();
                assert_eq!(score, matrix.get(j, i).unwrap());
                assert!((0.0..=1.0).contains(&score));
            }
        }
        // empty document: zero against everything else
        assert_eq!(matrix.get(4, 0), Some(0.0));
    }

    #[test]
    fn test_known_value() {
        // [2, 1] vs [1, 1]: 3 / (sqrt(5) * sqrt(2))
        let v = vectors(&["alien alien space", "alien space"]);
        let matrix = similarity_matrix(&v).unwrap();
        let expected = 3.0 / (5f64.sqrt() * 2f64.sqrt());
        assert!((matrix.get(0, 1).unwrap() as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        let matrix = similarity_matrix(&[]).unwrap();
        assert_eq!(matrix.dim(), 0);
    }
}
