//! Deterministic provider doubles for tests.
//!
//! Mirrors the scripted-queue style used for exercising the engine:
//! mocks are constructed with canned behavior up front and record what
//! they were asked afterwards.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use inference::{GenerationOptions, GenerationOutcome};

use crate::entity::{EntityCategory, EntitySpan};
use crate::error::ProviderError;
use crate::providers::{EmbeddingProvider, EntityExtractor, GenerativeModel};

/// Deterministic embedder: hashes each word into a bucket of the
/// vector, so texts sharing words land near each other.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

fn fnv1a(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            let bucket = (fnv1a(&word) as usize) % self.dimension;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

/// Embedder whose every call fails with a network error.
#[derive(Debug, Clone)]
pub struct FailingEmbedder {
    dimension: usize,
}

impl FailingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        Err(ProviderError::Network("embedder offline".into()))
    }
}

/// Extractor driven by a word-to-category table. Input words are
/// matched case-insensitively; spans keep the input's casing and
/// order. Optionally fails on inputs containing a marker substring.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    entities: HashMap<String, EntityCategory>,
    fail_on: Option<String>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `word` (case-insensitive) with `category`.
    pub fn with_entity(mut self, word: &str, category: EntityCategory) -> Self {
        self.entities.insert(word.to_lowercase(), category);
        self
    }

    /// Fail extraction for any input containing `marker`.
    pub fn with_failure_on(mut self, marker: &str) -> Self {
        self.fail_on = Some(marker.to_string());
        self
    }
}

#[async_trait]
impl EntityExtractor for MockExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ProviderError> {
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(ProviderError::Api {
                    status: 500,
                    message: "extractor refused input".into(),
                });
            }
        }
        Ok(text
            .split_whitespace()
            .filter_map(|word| {
                let key: String = word
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase();
                self.entities
                    .get(&key)
                    .map(|category| EntitySpan::new(word.trim_matches(|c: char| !c.is_alphanumeric()), *category))
            })
            .collect())
    }
}

/// Extractor that sleeps before answering, for timeout tests.
#[derive(Debug, Clone)]
pub struct SlowExtractor {
    delay: Duration,
}

impl SlowExtractor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl EntityExtractor for SlowExtractor {
    async fn extract(&self, _text: &str) -> Result<Vec<EntitySpan>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

/// Generative model that replays a scripted queue of responses and
/// records every (context, statement) pair it was asked.
#[derive(Debug, Default)]
pub struct MockMaster {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockMaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next scripted response.
    pub fn with_response(self, text: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(text.to_string());
        self
    }

    /// The (context, statement) pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockMaster {
    async fn generate(
        &self,
        context: &str,
        statement: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationOutcome, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((context.to_string(), statement.to_string()));
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "The tale continues.".to_string());
        Ok(GenerationOutcome {
            text,
            meta: serde_json::Map::new(),
        })
    }
}

/// Generative model whose every call fails.
#[derive(Debug, Default)]
pub struct FailingMaster;

#[async_trait]
impl GenerativeModel for FailingMaster {
    async fn generate(
        &self,
        _context: &str,
        _statement: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationOutcome, ProviderError> {
        Err(ProviderError::Api {
            status: 503,
            message: "model unavailable".into(),
        })
    }
}
