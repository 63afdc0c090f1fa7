//! Flat (exhaustive) vector index.
//!
//! Every query is compared against every stored row, so results are exact
//! nearest neighbors by squared Euclidean distance.
//!
//! Row `i` of the index always embeds entry `i` of the corpus it was built
//! from; the index itself knows nothing about entries.

use qa_agent_core::{AppError, AppResult};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 4] = b"QAFX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// A search hit: index row and its squared distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

/// Row-major store of `rows` vectors of `dimension` floats.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    rows: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from vectors that must all share one dimension.
    ///
    /// # Errors
    /// * `AppError::DimensionMismatch` - a vector differs in length from the first
    pub fn build(vectors: &[Vec<f32>]) -> AppResult<Self> {
        let dimension = vectors.first().map_or(0, Vec::len);

        if dimension == 0 && !vectors.is_empty() {
            return Err(AppError::Knowledge(
                "Cannot index zero-dimension vectors".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in vectors {
            if vector.len() != dimension {
                return Err(AppError::DimensionMismatch {
                    expected: dimension,
                    found: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            dimension,
            rows: vectors.len(),
            data,
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Stored vector for a row.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Find the `k` rows closest to `query`.
    ///
    /// Returns `min(k, len())` neighbors ordered by ascending squared
    /// distance, ties broken by the lower row.
    ///
    /// # Errors
    /// * `AppError::EmptyIndex` - the index has no rows
    /// * `AppError::DimensionMismatch` - the query length differs from the index dimension
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<Neighbor>> {
        if self.is_empty() {
            return Err(AppError::EmptyIndex);
        }

        if query.len() != self.dimension {
            return Err(AppError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, vector)| Neighbor {
                row,
                distance: squared_l2(query, vector),
            })
            .collect();

        neighbors.sort_by(compare_neighbors);
        neighbors.truncate(k);

        Ok(neighbors)
    }

    /// Serialize to the little-endian `QAFX` binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.rows as u64).to_le_bytes());
        for &value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Parse the `QAFX` binary layout.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(AppError::Storage(format!(
                "Index file too short: {} bytes",
                bytes.len()
            )));
        }

        let (header, payload) = bytes.split_at(HEADER_LEN);

        if &header[0..4] != MAGIC {
            return Err(AppError::Storage("Not a flat index file".to_string()));
        }

        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != FORMAT_VERSION {
            return Err(AppError::Storage(format!(
                "Unsupported index format version {}",
                version
            )));
        }

        let dimension = u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;
        let mut row_bytes = [0u8; 8];
        row_bytes.copy_from_slice(&header[12..20]);
        let rows = u64::from_le_bytes(row_bytes) as usize;

        let expected_len = rows
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| AppError::Storage("Index header overflows".to_string()))?;

        if payload.len() != expected_len {
            return Err(AppError::Storage(format!(
                "Index payload is {} bytes, header promises {}",
                payload.len(),
                expected_len
            )));
        }

        if dimension == 0 && rows > 0 {
            return Err(AppError::Storage(
                "Index header declares zero-dimension rows".to_string(),
            ));
        }

        let data = payload
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            dimension,
            rows,
            data,
        })
    }

    /// Write the index to `path`, replacing any previous file.
    pub fn persist(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create index directory: {}", e))
            })?;
        }

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, self.to_bytes())
            .and_then(|_| fs::rename(&tmp_path, path))
            .map_err(|e| AppError::Storage(format!("Failed to write index {:?}: {}", path, e)))?;

        tracing::debug!(
            "Persisted flat index ({} rows, dim {}) to {:?}",
            self.rows,
            self.dimension,
            path
        );
        Ok(())
    }

    /// Read an index previously written by [`FlatIndex::persist`].
    pub fn load(path: &Path) -> AppResult<Self> {
        let bytes = fs::read(path)
            .map_err(|e| AppError::Storage(format!("Failed to read index {:?}: {}", path, e)))?;
        Self::from_bytes(&bytes)
    }
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.row.cmp(&b.row))
}

/// Sum of squared component-wise differences.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> FlatIndex {
        FlatIndex::build(&[
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let result = FlatIndex::build(&[vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]);
        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(matches!(index.search(&[1.0], 3), Err(AppError::EmptyIndex)));
    }

    #[test]
    fn test_search_orders_by_distance_then_row() {
        let index = sample();
        let hits = index.search(&[1.0, 0.0], 4).unwrap();

        let rows: Vec<usize> = hits.iter().map(|n| n.row).collect();
        // rows 1 and 3 tie at distance 0; row 0 at 1; row 2 at 5
        assert_eq!(rows, vec![1, 3, 0, 2]);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[2].distance, 1.0);
        assert_eq!(hits[3].distance, 5.0);
    }

    #[test]
    fn test_search_caps_at_row_count() {
        let index = sample();
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 4);
        assert_eq!(index.search(&[0.0, 0.0], 2).unwrap().len(), 2);
    }

    #[test]
    fn test_search_query_dimension_mismatch() {
        let index = sample();
        assert!(matches!(
            index.search(&[0.0, 0.0, 0.0], 1),
            Err(AppError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_persist_and_load_preserve_bits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/flat.index");
        let index = FlatIndex::build(&[
            vec![0.1, -3.4e-38, f32::MIN_POSITIVE],
            vec![1.0e30, -0.0, 7.25],
        ])
        .unwrap();

        index.persist(&path).unwrap();
        let loaded = FlatIndex::load(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), 3);
        for row in 0..2 {
            let original: Vec<u32> = index.row(row).unwrap().iter().map(|v| v.to_bits()).collect();
            let restored: Vec<u32> = loaded.row(row).unwrap().iter().map(|v| v.to_bits()).collect();
            assert_eq!(original, restored);
        }

        let query = [0.5, 0.5, 0.5];
        assert_eq!(index.search(&query, 2).unwrap(), loaded.search(&query, 2).unwrap());
    }

    #[test]
    fn test_from_bytes_rejects_truncated_payload() {
        let mut bytes = sample().to_bytes();
        bytes.pop();
        assert!(matches!(
            FlatIndex::from_bytes(&bytes),
            Err(AppError::Storage(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_bad_magic() {
        let mut bytes = sample().to_bytes();
        bytes[0] = b'X';
        assert!(FlatIndex::from_bytes(&bytes).is_err());
        assert!(FlatIndex::from_bytes(b"QA").is_err());
    }

    #[test]
    fn test_load_missing_file_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let result = FlatIndex::load(&temp.path().join("absent.index"));
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
