//! Exact nearest-neighbour search over squared Euclidean distance.
//!
//! Vectors are stored back to back in one buffer and addressed by their
//! insertion position, so ids are dense and stable. The serialized form is
//! a small header (magic, dimensions, count) followed by little-endian f32s.

use crate::index::error::IndexError;

const MAGIC: &[u8; 8] = b"HDFLAT01";
const HEADER_LEN: usize = MAGIC.len() + 4 + 8;

/// Flat (brute force) L2 index
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimensions` length
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
        }
    }

    /// Length of every stored vector
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.vectors.len() / self.dimensions
        }
    }

    /// Whether the index holds no vectors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector; its id is the previous `len()`
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        let id = self.len();
        self.vectors.extend_from_slice(vector);
        Ok(id)
    }

    /// Find the `k` nearest vectors to `query`
    ///
    /// Returns `(id, squared distance)` pairs, nearest first. Equal distances
    /// are ordered by id so results are reproducible.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if self.dimensions == 0 || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimensions)
            .map(|candidate| squared_l2(query, candidate))
            .enumerate()
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize the index to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&(self.dimensions as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend(self.vectors.iter().flat_map(|f| f.to_le_bytes()));
        bytes
    }

    /// Deserialize an index written by [`FlatIndex::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(IndexError::Corrupted("missing index header".to_string()));
        }

        let mut dims = [0u8; 4];
        dims.copy_from_slice(&bytes[8..12]);
        let dimensions = u32::from_le_bytes(dims) as usize;

        let mut count = [0u8; 8];
        count.copy_from_slice(&bytes[12..HEADER_LEN]);
        let count = u64::from_le_bytes(count) as usize;

        let body = &bytes[HEADER_LEN..];
        let expected = count
            .checked_mul(dimensions)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| IndexError::Corrupted("index size overflows".to_string()))?;
        if body.len() != expected {
            return Err(IndexError::Corrupted(format!(
                "expected {} bytes of vectors, found {}",
                expected,
                body.len()
            )));
        }

        let vectors = body
            .chunks_exact(4)
            .map(|chunk| {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(chunk);
                f32::from_le_bytes(buf)
            })
            .collect();

        Ok(Self {
            dimensions,
            vectors,
        })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatIndex {
        let mut index = FlatIndex::new(2);
        index.add(&[0.0, 0.0]).unwrap();
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[5.0, 5.0]).unwrap();
        index
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = sample();
        let hits = index.search(&[0.9, 0.1], 3).unwrap();

        let ids: Vec<usize> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
        assert!((hits[0].1 - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_search_caps_at_len() {
        let index = sample();
        let hits = index.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let mut index = FlatIndex::new(1);
        index.add(&[1.0]).unwrap();
        index.add(&[-1.0]).unwrap();

        let hits = index.search(&[0.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
    }

    #[test]
    fn test_dimension_checks() {
        let mut index = FlatIndex::new(2);
        match index.add(&[1.0]) {
            Err(IndexError::DimensionMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("expected a dimension mismatch, got {:?}", other),
        }
        assert!(index.search(&[1.0, 2.0, 3.0], 1).is_err());
    }

    #[test]
    fn test_bytes_round_trip() {
        let index = sample();
        let restored = FlatIndex::from_bytes(&index.to_bytes()).unwrap();
        assert_eq!(restored, index);
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn test_rejects_truncated_bytes() {
        let bytes = sample().to_bytes();
        assert!(matches!(
            FlatIndex::from_bytes(&bytes[..bytes.len() - 1]),
            Err(IndexError::Corrupted(_))
        ));
        assert!(FlatIndex::from_bytes(b"garbage").is_err());
    }
}
