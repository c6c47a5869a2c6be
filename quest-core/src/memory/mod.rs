//! Memory tiers for the dialogue engine.
//!
//! Short-term memory is a bounded ring of recent turn texts; long-term
//! memory is an append-only vector store searched by semantic
//! similarity.

pub mod short;
pub mod store;

mod index;
