//! Flat nearest-neighbor index over fixed-dimension vectors.
//!
//! Rows are appended in insertion order and never removed; the store
//! resolves row numbers back to its item records. Distances are squared
//! Euclidean, smallest first.

use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub(crate) struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub(crate) fn dimension(&self) -> usize {
        self.dimension
    }

    pub(crate) fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Append a vector as the next row.
    pub(crate) fn push(&mut self, vector: Vec<f32>) {
        debug_assert_eq!(vector.len(), self.dimension);
        self.vectors.push(vector);
    }

    /// The `k` rows nearest to `query`, as (row, squared distance)
    /// pairs ordered ascending by distance. Ties break toward the
    /// earlier row.
    pub(crate) fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vector)| (row, squared_l2(query, vector)))
            .collect();

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hits.truncate(k);
        hits
    }

    /// Serialize to a little-endian blob: dimension, row count, then
    /// the row data.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.vectors.len() * self.dimension * 4);
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.vectors.len() as u32).to_le_bytes());
        for vector in &self.vectors {
            for value in vector {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes
    }

    /// Deserialize from a blob produced by `to_bytes`. Returns `None`
    /// if the blob is truncated or its sizes disagree.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 8 {
            return None;
        }
        let dimension = u32::from_le_bytes(bytes[0..4].try_into().ok()?) as usize;
        let count = u32::from_le_bytes(bytes[4..8].try_into().ok()?) as usize;

        let data = &bytes[8..];
        if data.len() != dimension.checked_mul(count)?.checked_mul(4)? {
            return None;
        }

        let mut vectors = Vec::with_capacity(count);
        for row in 0..count {
            let start = row * dimension * 4;
            let vector: Vec<f32> = data[start..start + dimension * 4]
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            vectors.push(vector);
        }

        Some(Self { dimension, vectors })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = FlatIndex::new(2);
        index.push(vec![10.0, 10.0]);
        index.push(vec![0.0, 1.0]);
        index.push(vec![0.0, 0.5]);

        let hits = index.search(&[0.0, 0.0], 3);
        assert_eq!(hits[0].0, 2);
        assert_eq!(hits[1].0, 1);
        assert_eq!(hits[2].0, 0);
    }

    #[test]
    fn test_search_ties_break_toward_earlier_row() {
        let mut index = FlatIndex::new(2);
        index.push(vec![1.0, 0.0]);
        index.push(vec![0.0, 1.0]); // same distance from origin

        let hits = index.search(&[0.0, 0.0], 2);
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let mut index = FlatIndex::new(1);
        for i in 0..5 {
            index.push(vec![i as f32]);
        }
        assert_eq!(index.search(&[0.0], 2).len(), 2);
        assert_eq!(index.search(&[0.0], 10).len(), 5);
    }

    #[test]
    fn test_blob_round_trip() {
        let mut index = FlatIndex::new(3);
        index.push(vec![0.1, -0.2, 0.3]);
        index.push(vec![1.0, 2.0, 3.0]);

        let restored = FlatIndex::from_bytes(&index.to_bytes()).unwrap();
        assert_eq!(restored.dimension(), 3);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.vectors, index.vectors);
    }

    #[test]
    fn test_empty_blob_round_trip() {
        let index = FlatIndex::new(4);
        let restored = FlatIndex::from_bytes(&index.to_bytes()).unwrap();
        assert_eq!(restored.dimension(), 4);
        assert_eq!(restored.len(), 0);
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let mut index = FlatIndex::new(2);
        index.push(vec![1.0, 2.0]);
        let mut bytes = index.to_bytes();
        bytes.pop();

        assert!(FlatIndex::from_bytes(&bytes).is_none());
        assert!(FlatIndex::from_bytes(&[1, 2, 3]).is_none());
    }
}
