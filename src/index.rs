use crate::error::IndexError;

/// Exact (non-approximate) nearest-neighbor structure over squared
/// Euclidean distance.
///
/// Vectors are kept in one flat row-major buffer in the order they were
/// handed to [`FlatIndex::build`]; search results refer back to that order
/// by position. The index is derived state: callers rebuild it from the
/// durable store after every mutation instead of updating it in place.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
    len: usize,
}

impl FlatIndex {
    /// Build an index over `vectors`. Every vector must share the dimension
    /// of the first; a mismatch is fatal.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, IndexError> {
        let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(dim * vectors.len());
        for vector in vectors {
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    found: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }
        Ok(Self {
            dim,
            data,
            len: vectors.len(),
        })
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension shared by all indexed vectors; 0 for an empty index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return up to `k` positions sorted by ascending squared Euclidean
    /// distance to `query`. Ties break by position, so results are
    /// deterministic. An empty index yields an empty result; a query of the
    /// wrong dimension is an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if self.len == 0 || k == 0 {
            return Ok(vec![]);
        }
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                found: query.len(),
            });
        }

        let mut hits: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, row)| (position, squared_euclidean(row, query)))
            .collect();
        hits.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_distance() {
        let index = FlatIndex::build(&[
            vec![10.0, 0.0],
            vec![1.0, 0.0],
            vec![5.0, 0.0],
        ])
        .unwrap();
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert_eq!(hits[0].1, 1.0);
        assert_eq!(hits[2].1, 100.0);
    }

    #[test]
    fn test_exact_match_has_zero_distance() {
        let index = FlatIndex::build(&[vec![0.5, -0.5], vec![2.0, 2.0]]).unwrap();
        let hits = index.search(&[0.5, -0.5], 1).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn test_k_larger_than_index_returns_all() {
        let index = FlatIndex::build(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let hits = index.search(&[0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = FlatIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 2.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let err = FlatIndex::build(&[vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]).unwrap_err();
        match err {
            IndexError::DimensionMismatch { expected, found } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
        }
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = FlatIndex::build(&[vec![1.0, 2.0]]).unwrap();
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_ties_break_by_position() {
        let index = FlatIndex::build(&[vec![1.0], vec![-1.0], vec![1.0]]).unwrap();
        let hits = index.search(&[0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
