//! Entity spans produced by the extraction model.

use serde::{Deserialize, Serialize};

/// Closed set of entity tags the extraction model can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// An organization, faction, or group.
    Organization,
    /// A spell or magical effect.
    Spell,
    /// An item, artifact, or object.
    Item,
    /// An action taken in the story.
    Action,
    /// A state or condition.
    Status,
    /// A geographic location or place.
    Location,
    /// A person or named character.
    Person,
    /// A monster or creature.
    Monster,
    /// Anything the model could not classify.
    Unknown,
}

impl EntityCategory {
    /// Convert to the wire tag used by the extraction model.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Organization => "ORG",
            EntityCategory::Spell => "SPELL",
            EntityCategory::Item => "ITEM",
            EntityCategory::Action => "ACTION",
            EntityCategory::Status => "STATUS",
            EntityCategory::Location => "LOC",
            EntityCategory::Person => "PER",
            EntityCategory::Monster => "MON",
            EntityCategory::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire tag; unrecognized tags fall back to `Unknown`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "ORG" => EntityCategory::Organization,
            "SPELL" => EntityCategory::Spell,
            "ITEM" => EntityCategory::Item,
            "ACTION" => EntityCategory::Action,
            "STATUS" => EntityCategory::Status,
            "LOC" => EntityCategory::Location,
            "PER" => EntityCategory::Person,
            "MON" => EntityCategory::Monster,
            _ => EntityCategory::Unknown,
        }
    }
}

/// A surface-form span tagged with its category.
///
/// Spans are transient per-extraction values; they are folded into a
/// Memory Item's metadata rather than stored on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    /// The surface text as it appeared in the input.
    pub text: String,
    /// The assigned category.
    pub category: EntityCategory,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, category: EntityCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}
