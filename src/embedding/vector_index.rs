/// Vector indexes over stored verse segments
use hnsw_rs::prelude::*;
use thiserror::Error;

use super::cosine_similarity;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Index initialization failed: {0}")]
    InitializationError(String),

    #[error("Insert failed: {0}")]
    InsertError(String),

    #[error("Search failed: {0}")]
    SearchError(String),

    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// A stored segment and its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Stored text representation of the indexed item
    pub text: String,
    /// Cosine similarity (higher is more similar)
    pub score: f32,
}

/// Nearest-neighbor search over precomputed embeddings
///
/// Populated once at startup, then only read.
pub trait VectorIndex: Send + Sync {
    /// Add a stored text with its embedding
    fn insert(&mut self, text: String, vector: &[f32]) -> Result<(), VectorIndexError>;

    /// Up to `k` stored texts with score >= `min_score`, best first
    fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<Neighbor>, VectorIndexError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimension(&self) -> usize;
}

fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), VectorIndexError> {
    if vector.len() != expected {
        return Err(VectorIndexError::InvalidDimension {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// HNSW vector index
///
/// Approximate nearest neighbor search with cosine distance. Scores are
/// reported as similarity (`1 - distance`).
pub struct HnswVectorIndex {
    index: Hnsw<'static, f32, DistCosine>,
    texts: Vec<String>,
    dimension: usize,
    ef_search: usize,
}

impl HnswVectorIndex {
    /// Create an empty index
    ///
    /// # Arguments
    /// * `dimension` - Vector dimension (must match embedding dimension)
    /// * `capacity` - Expected number of vectors
    /// * `m` - Number of connections per layer
    /// * `ef_construction` - Build-time beam width (higher = better recall, slower build)
    /// * `ef_search` - Query-time beam width
    pub fn new(
        dimension: usize,
        capacity: usize,
        m: usize,
        ef_construction: usize,
        ef_search: usize,
    ) -> Result<Self, VectorIndexError> {
        if dimension == 0 || m == 0 {
            return Err(VectorIndexError::InitializationError(format!(
                "dimension ({}) and m ({}) must be greater than 0",
                dimension, m
            )));
        }

        let index = Hnsw::<f32, DistCosine>::new(m, capacity.max(1), 16, ef_construction, DistCosine);

        Ok(Self {
            index,
            texts: Vec::with_capacity(capacity),
            dimension,
            ef_search,
        })
    }
}

impl VectorIndex for HnswVectorIndex {
    fn insert(&mut self, text: String, vector: &[f32]) -> Result<(), VectorIndexError> {
        check_dimension(self.dimension, vector)?;

        let id = self.texts.len();
        let data = vector.to_vec();
        self.index.insert((&data, id));
        self.texts.push(text);

        Ok(())
    }

    fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<Neighbor>, VectorIndexError> {
        check_dimension(self.dimension, query)?;
        if k == 0 || self.texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors = Vec::new();
        for neighbour in self.index.search(query, k, self.ef_search.max(k)) {
            let text = self.texts.get(neighbour.d_id).ok_or_else(|| {
                VectorIndexError::SearchError(format!("Unknown point id {}", neighbour.d_id))
            })?;
            let score = 1.0 - neighbour.distance;
            if score >= min_score {
                neighbors.push(Neighbor {
                    text: text.clone(),
                    score,
                });
            }
        }

        neighbors.sort_by(|a, b| b.score.total_cmp(&a.score));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn len(&self) -> usize {
        self.texts.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Exhaustive index: scores every stored vector
///
/// Exact and deterministic (ties keep insertion order). Suitable for small
/// corpora and tests.
pub struct FlatVectorIndex {
    entries: Vec<(String, Vec<f32>)>,
    dimension: usize,
}

impl FlatVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: Vec::new(),
            dimension,
        }
    }
}

impl VectorIndex for FlatVectorIndex {
    fn insert(&mut self, text: String, vector: &[f32]) -> Result<(), VectorIndexError> {
        check_dimension(self.dimension, vector)?;
        self.entries.push((text, vector.to_vec()));
        Ok(())
    }

    fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<Neighbor>, VectorIndexError> {
        check_dimension(self.dimension, query)?;

        let mut neighbors: Vec<Neighbor> = self
            .entries
            .iter()
            .map(|(text, vector)| Neighbor {
                text: text.clone(),
                score: cosine_similarity(query, vector),
            })
            .filter(|n| n.score >= min_score)
            .collect();

        neighbors.sort_by(|a, b| b.score.total_cmp(&a.score));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(dim: usize, i: usize, j: usize, tilt: f32) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[i] = 1.0 - tilt;
        v[j] = tilt;
        v
    }

    #[test]
    fn test_index_creation() {
        let index = HnswVectorIndex::new(384, 100, 16, 200, 50).unwrap();
        assert_eq!(index.dimension(), 384);
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
        assert!(HnswVectorIndex::new(0, 100, 16, 200, 50).is_err());
    }

    #[test]
    fn test_hnsw_insert_and_search() {
        let mut index = HnswVectorIndex::new(8, 10, 16, 200, 50).unwrap();
        index.insert("a".to_string(), &axis(8, 0, 1, 0.0)).unwrap();
        index.insert("b".to_string(), &axis(8, 1, 0, 0.0)).unwrap();
        index.insert("c".to_string(), &axis(8, 0, 1, 0.1)).unwrap();
        assert_eq!(index.len(), 3);

        let results = index.nearest_neighbors(&axis(8, 0, 1, 0.0), 2, 0.1).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "a");
        assert!(results[0].score > 0.99);
        assert_eq!(results[1].text, "c");
    }

    #[test]
    fn test_hnsw_empty_search() {
        let index = HnswVectorIndex::new(4, 10, 16, 200, 50).unwrap();
        assert!(index
            .nearest_neighbors(&[1.0, 0.0, 0.0, 0.0], 5, 0.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_flat_respects_floor_and_k() {
        let mut index = FlatVectorIndex::new(4);
        index.insert("x".to_string(), &[1.0, 0.0, 0.0, 0.0]).unwrap();
        index.insert("y".to_string(), &[0.0, 1.0, 0.0, 0.0]).unwrap();
        index.insert("z".to_string(), &[0.7, 0.7, 0.0, 0.0]).unwrap();

        let results = index.nearest_neighbors(&[1.0, 0.0, 0.0, 0.0], 10, 0.1).unwrap();
        let texts: Vec<&str> = results.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["x", "z"]);

        let top = index.nearest_neighbors(&[1.0, 0.0, 0.0, 0.0], 1, 0.0).unwrap();
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_dimension_validation() {
        let mut index = FlatVectorIndex::new(384);
        let result = index.insert("bad".to_string(), &[1.0; 128]);
        assert!(matches!(
            result,
            Err(VectorIndexError::InvalidDimension { expected: 384, actual: 128 })
        ));
        assert!(index.nearest_neighbors(&[1.0; 3], 1, 0.0).is_err());
    }
}
