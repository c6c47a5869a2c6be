//! The per-turn orchestration: recall, generate, commit.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use inference::GenerationOutcome;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, ProviderError, StoreError};
use crate::memory::short::ShortTermMemory;
use crate::memory::store::{Metadata, VectorStore};
use crate::providers::{EmbeddingProvider, EntityExtractor, GenerativeModel};

/// Bound a provider call by `limit`, surfacing expiry as a
/// [`ProviderError::Timeout`].
async fn with_timeout<T>(
    limit: Duration,
    future: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(limit)),
    }
}

/// Accumulates context lines, keeping only the first appearance of
/// each.
#[derive(Debug, Default)]
struct ContextSet {
    seen: HashSet<String>,
    lines: Vec<String>,
}

impl ContextSet {
    fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            return;
        }
        if self.seen.insert(line.clone()) {
            self.lines.push(line);
        }
    }

    fn join(&self) -> String {
        self.lines.join("\n")
    }
}

/// The dialogue memory engine.
///
/// Holds both memory tiers and drives the per-turn cycle: recall
/// related memories for the player's statement, generate the game
/// master's response against them, then commit the response to both
/// tiers.
#[derive(Debug)]
pub struct Engine<G, X, E> {
    config: EngineConfig,
    master: G,
    extractor: X,
    short_memory: ShortTermMemory,
    store: VectorStore<E>,
}

impl<G, X, E> Engine<G, X, E>
where
    G: GenerativeModel,
    X: EntityExtractor,
    E: EmbeddingProvider,
{
    /// Assemble an engine, opening (or creating) the long-term store
    /// under the configured directory.
    pub async fn new(config: EngineConfig, master: G, extractor: X, embedder: E) -> Self {
        let short_memory = ShortTermMemory::new(config.short_memory_size);
        let store = VectorStore::open(embedder, config.store_dir.clone()).await;
        Self {
            config,
            master,
            extractor,
            short_memory,
            store,
        }
    }

    /// Recall the stored texts most similar to `text`, nearest first,
    /// capped at the configured recall limit.
    pub async fn remind(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        let items = with_timeout(
            self.config.provider_timeout,
            self.store.search(text, self.config.remind_limit),
        )
        .await?;
        Ok(items.into_iter().map(|item| item.text).collect())
    }

    /// Split `text` into sentences and store each sentence once per
    /// entity span found in it. Failures on one sentence or span are
    /// logged and do not stop the rest. Returns how many items were
    /// stored.
    pub async fn memorize(&mut self, text: &str) -> usize {
        let mut stored = 0;
        for segment in text.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let spans = match with_timeout(
                self.config.provider_timeout,
                self.extractor.extract(segment),
            )
            .await
            {
                Ok(spans) => spans,
                Err(err) => {
                    warn!(segment, error = %err, "entity extraction failed, skipping segment");
                    continue;
                }
            };

            for span in spans {
                let mut metadata = Metadata::new();
                metadata.insert("category".into(), span.category.as_str().into());
                metadata.insert("span_text".into(), span.text.clone().into());

                match with_timeout(
                    self.config.provider_timeout,
                    self.store.add(segment, metadata),
                )
                .await
                {
                    Ok(()) => stored += 1,
                    Err(err) => {
                        warn!(segment, error = %err, "failed to store memory item");
                    }
                }
            }
        }
        debug!(stored, "memorized text");
        stored
    }

    /// Run one dialogue turn: build context from the short-term buffer
    /// plus recalled long-term memories, generate the response, then
    /// commit it to the short-term buffer and the long-term store.
    ///
    /// The player's statement itself is never committed; only the
    /// generated response enters memory. If generation fails, neither
    /// tier changes.
    pub async fn dialog(&mut self, statement: &str) -> Result<GenerationOutcome, EngineError> {
        let mut context = ContextSet::default();
        for record in self.short_memory.get(None) {
            context.push(record.text.clone());
        }

        let spans = with_timeout(
            self.config.provider_timeout,
            self.extractor.extract(statement),
        )
        .await?;
        debug!(entities = spans.len(), "extracted entities from statement");
        for span in &spans {
            for line in self.remind(&span.text).await? {
                context.push(line);
            }
        }
        let context = context.join();
        debug!(context_len = context.len(), "generating response");

        let outcome = with_timeout(
            self.config.provider_timeout,
            self.master
                .generate(&context, statement, &self.config.generation),
        )
        .await?;

        self.short_memory.add(outcome.text.clone());
        let response = outcome.text.clone();
        self.memorize(&response).await;
        Ok(outcome)
    }

    /// Persist the long-term store.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.store.save().await
    }

    pub fn master(&self) -> &G {
        &self.master
    }

    pub fn short_memory(&self) -> &ShortTermMemory {
        &self.short_memory
    }

    pub fn store(&self) -> &VectorStore<E> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
