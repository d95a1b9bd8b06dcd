//! Flat nearest-neighbor index over squared Euclidean distance.
//!
//! Exhaustive scan — the corpus is a handful of product and policy
//! documents, so there is nothing to gain from an approximate structure.
//! Results come back in ascending distance; ties keep insertion order
//! (the sort is stable and the scan enumerates in insertion order).

use cornerman_core::error::IndexError;
use serde::{Deserialize, Serialize};

/// In-memory flat vector index. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index from row vectors. The dimension is taken from the
    /// first vector; every other vector must match it.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let dimension = vectors.first().map(|v| v.len()).unwrap_or(0);
        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(IndexError::Corrupt(format!(
                "vector {bad} has dimension {}, expected {dimension}",
                vectors[bad].len()
            )));
        }
        Ok(Self { dimension, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The `k` nearest vectors to `query` by squared Euclidean distance,
    /// ascending, ties broken by insertion order. Returns fewer than `k`
    /// results when the index is smaller than `k`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, squared_l2(query, v)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Squared Euclidean distance, accumulated in f64 for stability.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = (*x - *y) as f64;
        sum += d * d;
    }
    sum as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        FlatIndex::build(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![2.0, 2.0],
        ])
        .unwrap()
    }

    #[test]
    fn build_infers_dimension() {
        let index = sample_index();
        assert_eq!(index.dimension(), 2);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn build_rejects_ragged_vectors() {
        let err = FlatIndex::build(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));
    }

    #[test]
    fn empty_index_searches_to_nothing() {
        let index = FlatIndex::build(vec![]).unwrap();
        assert!(index.search(&[1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn search_orders_by_ascending_distance() {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0], 4).unwrap();
        let order: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        // Distances: 0, 1, 9, 8 → order 0, 1, 3, 2.
        assert_eq!(order, vec![0, 1, 3, 2]);
        assert_eq!(hits[0].1, 0.0);
        assert_eq!(hits[1].1, 1.0);
    }

    #[test]
    fn search_truncates_to_k() {
        let index = sample_index();
        assert_eq!(index.search(&[0.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 4);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = FlatIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
        ])
        .unwrap();
        // All three are distance 1 from the origin.
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let index = sample_index();
        let err = index.search(&[1.0, 2.0, 3.0], 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn serde_roundtrip_preserves_structure() {
        let index = sample_index();
        let json = serde_json::to_string(&index).unwrap();
        let back: FlatIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dimension(), index.dimension());
        assert_eq!(back.len(), index.len());
        let hits = back.search(&[0.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].0, 0);
    }
}
