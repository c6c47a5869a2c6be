//! Trait seams for the external inference collaborators.
//!
//! The engine only ever talks to these traits; the `inference` crate's
//! HTTP clients implement them for production use and `testing` holds
//! deterministic mocks.

use crate::entity::{EntityCategory, EntitySpan};
use crate::error::ProviderError;
use async_trait::async_trait;
use inference::{GenerationOptions, GenerationOutcome};

/// Turns text into a fixed-dimension vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimensionality of every vector this provider produces, fixed at
    /// construction time.
    fn dimension(&self) -> usize;

    /// Embed `text` into a vector of `dimension()` floats.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Turns a sentence into an ordered sequence of entity spans.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ProviderError>;
}

/// Turns a (context, statement) pair into a narrative continuation.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        context: &str,
        statement: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutcome, ProviderError>;
}

#[async_trait]
impl EmbeddingProvider for inference::EmbeddingClient {
    fn dimension(&self) -> usize {
        inference::EmbeddingClient::dimension(self)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(inference::EmbeddingClient::embed(self, text).await?)
    }
}

#[async_trait]
impl EntityExtractor for inference::ExtractorClient {
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ProviderError> {
        let entities = inference::ExtractorClient::extract(self, text).await?;
        Ok(entities
            .into_iter()
            .map(|e| EntitySpan::new(e.text, EntityCategory::from_str_value(&e.category)))
            .collect())
    }
}

#[async_trait]
impl GenerativeModel for inference::MasterClient {
    async fn generate(
        &self,
        context: &str,
        statement: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutcome, ProviderError> {
        Ok(inference::MasterClient::generate(self, context, statement, options).await?)
    }
}
