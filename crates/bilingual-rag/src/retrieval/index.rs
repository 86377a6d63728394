//! Flat Euclidean vector index with atomic snapshot persistence

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, IndexStats, RetrievalResult};

/// Snapshot file name inside the storage directory
pub const SNAPSHOT_FILE: &str = "index.bin";

const SNAPSHOT_VERSION: u32 = 1;

/// Index type reported in statistics
pub const INDEX_TYPE: &str = "flat_l2";

/// Immutable view of the index contents
///
/// Searches clone the `Arc` and work on the view without holding a lock, so a
/// concurrent insertion is never observed half-applied.
#[derive(Debug, Default)]
struct IndexState {
    dimensions: Option<usize>,
    chunks: Vec<Arc<Chunk>>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    dimensions: Option<usize>,
    chunks: Vec<&'a Chunk>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    dimensions: Option<usize>,
    chunks: Vec<Chunk>,
}

/// Exact nearest-neighbour index over chunk embeddings
///
/// Reads are lock-free with respect to writers: every mutation builds a new
/// [`IndexState`] and swaps it in. Mutations (insert, persist, load) are
/// serialized by `write_lock`.
pub struct VectorIndex {
    state: RwLock<Arc<IndexState>>,
    write_lock: Mutex<()>,
    snapshot_path: PathBuf,
    loaded: AtomicBool,
}

impl VectorIndex {
    /// Create an empty index persisting to `storage_dir/index.bin`
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            state: RwLock::new(Arc::new(IndexState::default())),
            write_lock: Mutex::new(()),
            snapshot_path: storage_dir.as_ref().join(SNAPSHOT_FILE),
            loaded: AtomicBool::new(false),
        }
    }

    /// Create an empty index from config
    pub fn open(config: &IndexConfig) -> Self {
        Self::new(&config.storage_dir)
    }

    /// Path of the snapshot file
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn current(&self) -> Arc<IndexState> {
        self.state.read().clone()
    }

    /// Number of chunks
    pub fn size(&self) -> usize {
        self.state.read().chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Dimensionality fixed by the first insertion
    pub fn dimensions(&self) -> Option<usize> {
        self.state.read().dimensions
    }

    pub fn stats(&self) -> IndexStats {
        let state = self.current();
        IndexStats {
            total_documents: state.chunks.len(),
            dimension: state.dimensions,
            index_type: INDEX_TYPE.to_string(),
        }
    }

    /// Append `chunks` as one batch
    ///
    /// The first non-empty batch of an empty index fixes its dimensionality.
    /// Every vector is checked before anything is appended, so a failing batch
    /// leaves the index untouched. Chunk ids are set to their positions.
    pub fn insert(&self, chunks: Vec<Chunk>) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.insert_locked(chunks)
    }

    fn insert_locked(&self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let current = self.current();
        let expected = match current.dimensions {
            Some(dimensions) => dimensions,
            None => chunks[0].vector.len(),
        };
        if expected == 0 {
            return Err(Error::invalid_argument("Embedding vectors must not be empty"));
        }

        for chunk in &chunks {
            if chunk.vector.len() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: chunk.vector.len(),
                });
            }
            if chunk.vector.iter().any(|x| !x.is_finite()) {
                return Err(Error::invalid_argument(format!(
                    "Embedding for a chunk of {} contains non-finite values",
                    chunk.filename
                )));
            }
        }

        let mut next = Vec::with_capacity(current.chunks.len() + chunks.len());
        next.extend(current.chunks.iter().cloned());
        let start = next.len();
        for (offset, mut chunk) in chunks.into_iter().enumerate() {
            chunk.id = (start + offset) as u64;
            next.push(Arc::new(chunk));
        }

        *self.state.write() = Arc::new(IndexState {
            dimensions: Some(expected),
            chunks: next,
        });
        Ok(())
    }

    /// Write the full index to the snapshot file
    ///
    /// The bytes go to a temporary file in the same directory which is then
    /// renamed over the previous snapshot, so a crash mid-write leaves the old
    /// snapshot intact.
    pub fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.persist_locked()
    }

    fn persist_locked(&self) -> Result<()> {
        let state = self.current();
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            dimensions: state.dimensions,
            chunks: state.chunks.iter().map(|chunk| chunk.as_ref()).collect(),
        };
        let bytes = bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())
            .map_err(|e| Error::storage(format!("Failed to encode index snapshot: {}", e)))?;

        let dir = self
            .snapshot_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let mut file = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::storage(format!("Failed to create temp snapshot: {}", e)))?;
        file.write_all(&bytes)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| Error::storage(format!("Failed to write snapshot: {}", e)))?;
        file.persist(&self.snapshot_path).map_err(|e| {
            Error::storage(format!(
                "Failed to replace {}: {}",
                self.snapshot_path.display(),
                e.error
            ))
        })?;

        tracing::debug!(
            "Persisted {} chunks ({} bytes) to {}",
            snapshot.chunks.len(),
            bytes.len(),
            self.snapshot_path.display()
        );
        Ok(())
    }

    /// Insert a batch and persist the whole index, holding the write lock across both
    ///
    /// Insertion errors are returned. A persistence failure is logged and
    /// reported as `Ok(false)`: the insertion stays in memory and the snapshot
    /// lags behind until the next successful persist.
    pub fn insert_and_persist(&self, chunks: Vec<Chunk>) -> Result<bool> {
        let _guard = self.write_lock.lock();
        self.insert_locked(chunks)?;

        match self.persist_locked() {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::error!("Index persistence failed, in-memory index is ahead: {}", e);
                Ok(false)
            }
        }
    }

    /// Restore the last persisted snapshot
    ///
    /// Only the first call per instance reads storage, later calls return the
    /// current size. A missing snapshot leaves the index empty. A corrupt or
    /// inconsistent snapshot is logged and also leaves the index empty.
    pub fn load(&self) -> usize {
        if self.loaded.load(Ordering::Acquire) {
            return self.size();
        }

        let _guard = self.write_lock.lock();
        if self.loaded.load(Ordering::Acquire) {
            return self.size();
        }

        let state = match self.read_snapshot() {
            Ok(Some(state)) => {
                tracing::info!(
                    "Loaded {} chunks from {}",
                    state.chunks.len(),
                    self.snapshot_path.display()
                );
                state
            }
            Ok(None) => {
                tracing::info!(
                    "No index snapshot at {}, starting empty",
                    self.snapshot_path.display()
                );
                IndexState::default()
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable index snapshot: {}", e);
                IndexState::default()
            }
        };

        let size = state.chunks.len();
        *self.state.write() = Arc::new(state);
        self.loaded.store(true, Ordering::Release);
        size
    }

    fn read_snapshot(&self) -> Result<Option<IndexState>> {
        let bytes = match std::fs::read(&self.snapshot_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::storage(format!(
                    "Failed to read {}: {}",
                    self.snapshot_path.display(),
                    e
                )))
            }
        };
        if bytes.is_empty() {
            return Ok(None);
        }

        let (snapshot, _): (Snapshot, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| Error::storage(format!("Failed to decode snapshot: {}", e)))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::storage(format!(
                "Unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let dimensions = match (snapshot.dimensions, snapshot.chunks.is_empty()) {
            (_, true) => None,
            (Some(dimensions), false) => Some(dimensions),
            (None, false) => {
                return Err(Error::storage("Snapshot has chunks but no dimensionality"))
            }
        };

        let mut chunks = Vec::with_capacity(snapshot.chunks.len());
        for (position, mut chunk) in snapshot.chunks.into_iter().enumerate() {
            if Some(chunk.vector.len()) != dimensions {
                return Err(Error::storage(format!(
                    "Chunk {} has {} dimensions, snapshot declares {:?}",
                    position,
                    chunk.vector.len(),
                    dimensions
                )));
            }
            chunk.id = position as u64;
            chunks.push(Arc::new(chunk));
        }

        Ok(Some(IndexState { dimensions, chunks }))
    }

    /// The `k` chunks nearest to `query`, most similar first
    ///
    /// Distance is Euclidean and the score is `1 / (1 + distance)`. Equal
    /// distances keep insertion order. An empty index yields no results.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 {
            return Err(Error::invalid_argument("k must be >= 1"));
        }

        let state = self.current();
        let Some(dimensions) = state.dimensions else {
            return Ok(Vec::new());
        };
        if query.len() != dimensions {
            return Err(Error::DimensionMismatch {
                expected: dimensions,
                actual: query.len(),
            });
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(Error::invalid_argument("Query vector contains non-finite values"));
        }

        let mut ranked: Vec<(f32, usize)> = state
            .chunks
            .par_iter()
            .enumerate()
            .map(|(position, chunk)| (euclidean_distance(query, &chunk.vector), position))
            .collect();

        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(distance, position)| RetrievalResult {
                chunk: state.chunks[position].as_ref().clone(),
                similarity_score: 1.0 / (1.0 + distance),
            })
            .collect())
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn chunk(text: &str, vector: Vec<f32>) -> Chunk {
        Chunk::new(text, Language::En, "guide.txt", vector)
    }

    fn sample_index(dir: &TempDir) -> VectorIndex {
        let index = VectorIndex::new(dir.path());
        index
            .insert(vec![
                chunk("origin", vec![0.0, 0.0]),
                chunk("near", vec![1.0, 0.0]),
                chunk("far", vec![3.0, 4.0]),
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_empty_index_search() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::new(dir.path());
        assert!(index.search(&[1.0, 2.0], 3).unwrap().is_empty());
        assert!(index.is_empty());
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn test_k_must_be_positive() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(&dir);
        assert!(matches!(
            index.search(&[0.0, 0.0], 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_scores_and_order() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(&dir);

        let results = index.search(&[0.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["origin", "near", "far"]);
        assert_eq!(results[0].similarity_score, 1.0);
        assert!((results[1].similarity_score - 0.5).abs() < 1e-6);
        assert!((results[2].similarity_score - 1.0 / 6.0).abs() < 1e-6);
        assert_eq!(results[2].chunk.id, 2);
    }

    #[test]
    fn test_k_bound() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(&dir);
        assert_eq!(index.search(&[0.0, 0.0], 1).unwrap().len(), 1);
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::new(dir.path());
        index
            .insert(vec![
                chunk("first", vec![1.0, 0.0]),
                chunk("second", vec![0.0, 1.0]),
                chunk("third", vec![-1.0, 0.0]),
            ])
            .unwrap();

        for _ in 0..5 {
            let results = index.search(&[0.0, 0.0], 3).unwrap();
            let ids: Vec<u64> = results.iter().map(|r| r.chunk.id).collect();
            assert_eq!(ids, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(&dir);

        let err = index.insert(vec![chunk("bad", vec![1.0, 2.0, 3.0])]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(index.size(), 3);

        assert!(matches!(
            index.search(&[1.0], 1),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_mixed_batch_is_rejected_whole() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::new(dir.path());
        let err = index
            .insert(vec![chunk("a", vec![1.0, 2.0]), chunk("b", vec![1.0])])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert!(index.is_empty());
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let index = sample_index(&dir);
        index.persist().unwrap();
        assert!(index.snapshot_path().exists());

        let restored = VectorIndex::new(dir.path());
        assert_eq!(restored.load(), 3);
        assert_eq!(restored.dimensions(), Some(2));

        let query = [0.5, 0.5];
        assert_eq!(
            index.search(&query, 3).unwrap(),
            restored.search(&query, 3).unwrap()
        );
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        sample_index(&dir).persist().unwrap();

        let restored = VectorIndex::new(dir.path());
        assert_eq!(restored.load(), 3);
        restored.insert(vec![chunk("extra", vec![2.0, 2.0])]).unwrap();
        assert_eq!(restored.load(), 4);
        assert_eq!(restored.size(), 4);
    }

    #[test]
    fn test_missing_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::new(dir.path().join("never-written"));
        assert_eq!(index.load(), 0);
        assert!(index.search(&[0.0], 1).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SNAPSHOT_FILE), b"not a snapshot").unwrap();

        let index = VectorIndex::new(dir.path());
        assert_eq!(index.load(), 0);
        index.insert(vec![chunk("fresh", vec![1.0])]).unwrap();
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn test_insert_and_persist_reports_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let index = VectorIndex::new(blocker.join("index"));
        let persisted = index
            .insert_and_persist(vec![chunk("kept", vec![1.0, 1.0])])
            .unwrap();
        assert!(!persisted);
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn test_parallel_batches_are_not_interleaved() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::new(dir.path());

        std::thread::scope(|scope| {
            for writer in 0..6 {
                let index = &index;
                scope.spawn(move || {
                    let name = format!("w{}", writer);
                    let batch = (0..25).map(|_| chunk(&name, vec![writer as f32, 1.0])).collect();
                    assert!(index.insert_and_persist(batch).unwrap());
                });
            }
        });

        let state = index.current();
        assert_eq!(state.chunks.len(), 150);
        for (position, chunk) in state.chunks.iter().enumerate() {
            assert_eq!(chunk.id, position as u64);
        }
        for batch in state.chunks.chunks(25) {
            assert!(batch.iter().all(|c| c.text == batch[0].text));
        }

        let reloaded = VectorIndex::new(dir.path());
        assert_eq!(reloaded.load(), 150);
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let stats = sample_index(&dir).stats();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.dimension, Some(2));
        assert_eq!(stats.index_type, INDEX_TYPE);
    }

    proptest! {
        #[test]
        fn prop_ranked_by_score(
            vectors in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 4), 1..40),
            query in prop::collection::vec(-10.0f32..10.0, 4),
            k in 1usize..50,
        ) {
            let dir = TempDir::new().unwrap();
            let index = VectorIndex::new(dir.path());
            let count = vectors.len();
            index
                .insert(vectors.into_iter().map(|v| chunk("p", v)).collect())
                .unwrap();

            let results = index.search(&query, k).unwrap();
            prop_assert_eq!(results.len(), k.min(count));
            for pair in results.windows(2) {
                prop_assert!(pair[0].similarity_score >= pair[1].similarity_score);
            }
            for result in &results {
                prop_assert!(result.similarity_score > 0.0 && result.similarity_score <= 1.0);
            }
        }
    }
}
