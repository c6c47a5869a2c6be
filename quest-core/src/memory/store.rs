//! Long-term memory: an append-only vector store over memory items.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, StoreError};
use crate::memory::index::FlatIndex;
use crate::providers::EmbeddingProvider;

const INDEX_FILE: &str = "index.bin";
const ITEMS_FILE: &str = "items.json";

/// Free-form key/value metadata attached to a memory item.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One stored memory: the remembered text, its embedding, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    /// The remembered text.
    pub text: String,
    /// The embedding the item was stored under.
    pub vector: Vec<f32>,
    /// Caller-supplied metadata, such as the entity category that
    /// triggered the memorization.
    #[serde(default)]
    pub metadata: Metadata,
    /// The item's row in the index, assigned at insertion.
    pub sequence_index: usize,
}

/// Append-only store of memory items searched by vector similarity.
///
/// Items are never updated or evicted. The store persists as two
/// artifacts under its directory: the raw index blob and the item
/// records as JSON.
#[derive(Debug)]
pub struct VectorStore<E> {
    embedder: E,
    directory: PathBuf,
    index: FlatIndex,
    items: Vec<MemoryItem>,
}

impl<E: EmbeddingProvider> VectorStore<E> {
    /// Open the store rooted at `directory`, loading any persisted
    /// state. A missing, unreadable, or inconsistent snapshot yields an
    /// empty store; opening never fails.
    pub async fn open(embedder: E, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let dimension = embedder.dimension();
        let (index, items) = match load_snapshot(&directory, dimension).await {
            Ok(Some(state)) => state,
            Ok(None) => (FlatIndex::new(dimension), Vec::new()),
            Err(reason) => {
                warn!(
                    directory = %directory.display(),
                    reason, "discarding unreadable store snapshot, starting empty"
                );
                (FlatIndex::new(dimension), Vec::new())
            }
        };
        debug!(
            directory = %directory.display(),
            items = items.len(), "opened vector store"
        );
        Self {
            embedder,
            directory,
            index,
            items,
        }
    }

    /// Embed `text`, checking the result against the store's dimension.
    async fn embed_checked(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let vector = self.embedder.embed(text).await?;
        if vector.len() != self.index.dimension() {
            return Err(ProviderError::Parse(format!(
                "embedding has {} dimensions, store expects {}",
                vector.len(),
                self.index.dimension()
            )));
        }
        Ok(vector)
    }

    /// Embed `text` and append it as a new item. On embedding failure
    /// the store is left untouched.
    pub async fn add(&mut self, text: &str, metadata: Metadata) -> Result<(), ProviderError> {
        let vector = self.embed_checked(text).await?;

        let sequence_index = self.items.len();
        self.index.push(vector.clone());
        self.items.push(MemoryItem {
            text: text.to_string(),
            vector,
            metadata,
            sequence_index,
        });
        debug!(sequence_index, "stored memory item");
        Ok(())
    }

    /// The up-to-`k` stored items most similar to `query`, nearest
    /// first. An empty store returns no items without embedding the
    /// query.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<MemoryItem>, ProviderError> {
        if self.items.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embed_checked(query).await?;
        let hits = self.index.search(&vector, k);
        Ok(hits
            .into_iter()
            .map(|(row, _)| self.items[row].clone())
            .collect())
    }

    /// The texts of the up-to-`k` items most similar to `query`, joined
    /// with newlines. An empty store yields an empty string.
    pub async fn get_context(&self, query: &str, k: usize) -> Result<String, ProviderError> {
        let items = self.search(query, k).await?;
        Ok(items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Persist the store to its directory, creating it if needed.
    pub async fn save(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(self.directory.join(INDEX_FILE), self.index.to_bytes()).await?;
        let json = serde_json::to_vec_pretty(&self.items)?;
        tokio::fs::write(self.directory.join(ITEMS_FILE), json).await?;
        debug!(
            directory = %self.directory.display(),
            items = self.items.len(), "saved vector store"
        );
        Ok(())
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Dimensionality of stored vectors.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Stored items in insertion order.
    pub fn items(&self) -> &[MemoryItem] {
        &self.items
    }
}

/// Read both persisted artifacts, checking they agree with each other
/// and with the embedder's dimension. `Ok(None)` means no snapshot
/// exists; `Err` carries the reason the snapshot was rejected.
async fn load_snapshot(
    directory: &Path,
    dimension: usize,
) -> Result<Option<(FlatIndex, Vec<MemoryItem>)>, &'static str> {
    let index_path = directory.join(INDEX_FILE);
    let items_path = directory.join(ITEMS_FILE);
    if !index_path.exists() && !items_path.exists() {
        return Ok(None);
    }

    let index_bytes = tokio::fs::read(&index_path)
        .await
        .map_err(|_| "index blob unreadable")?;
    let index = FlatIndex::from_bytes(&index_bytes).ok_or("index blob malformed")?;
    if index.dimension() != dimension {
        return Err("index dimension does not match embedder");
    }

    let items_bytes = tokio::fs::read(&items_path)
        .await
        .map_err(|_| "items file unreadable")?;
    let items: Vec<MemoryItem> =
        serde_json::from_slice(&items_bytes).map_err(|_| "items file malformed")?;

    if items.len() != index.len() {
        return Err("item count does not match index rows");
    }
    if items
        .iter()
        .enumerate()
        .any(|(row, item)| item.sequence_index != row)
    {
        return Err("item sequence numbering is inconsistent");
    }

    Ok(Some((index, items)))
}
