//! Retrieval-augmented dialogue memory engine for an AI game master.
//!
//! This crate provides:
//! - A fixed-capacity short-term buffer of recent turns
//! - An entity-indexed long-term vector store with save/load
//! - The per-turn recall → generate → commit orchestration
//! - Trait seams for the external inference providers
//!
//! # Quick Start
//!
//! ```ignore
//! use quest_core::{Engine, EngineConfig};
//! use inference::{EmbeddingClient, ExtractorClient, MasterClient, DEFAULT_BASE_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::new("data/campaign");
//!     let mut engine = Engine::new(
//!         config,
//!         MasterClient::new(DEFAULT_BASE_URL, "A cursed mine below the village"),
//!         ExtractorClient::new(DEFAULT_BASE_URL),
//!         EmbeddingClient::new(DEFAULT_BASE_URL, 384),
//!     )
//!     .await;
//!
//!     let response = engine.dialog("I enter the tavern").await?;
//!     println!("{}", response.text);
//!
//!     engine.save().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod memory;
pub mod providers;
pub mod testing;

// Primary public API
pub use config::EngineConfig;
pub use engine::Engine;
pub use entity::{EntityCategory, EntitySpan};
pub use error::{EngineError, ProviderError, StoreError};
pub use memory::short::{ShortTermMemory, TurnRecord};
pub use memory::store::{MemoryItem, Metadata, VectorStore};
pub use providers::{EmbeddingProvider, EntityExtractor, GenerativeModel};

// Re-export the wire types callers pass through unchanged.
pub use inference::{GenerationOptions, GenerationOutcome};
