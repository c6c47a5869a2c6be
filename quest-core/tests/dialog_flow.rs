//! End-to-end exercises of the recall, generate, commit cycle.

use std::time::Duration;

use quest_core::testing::{
    FailingMaster, MockEmbedder, MockExtractor, MockMaster, SlowExtractor,
};
use quest_core::{Engine, EngineConfig, EngineError, EntityCategory, ProviderError};

fn config(dir: &tempfile::TempDir) -> EngineConfig {
    EngineConfig::new(dir.path())
}

#[tokio::test]
async fn test_memorize_stores_one_item_per_entity_span() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new().with_entity("dragon", EntityCategory::Monster);
    let mut engine = Engine::new(
        config(&dir),
        MockMaster::new(),
        extractor,
        MockEmbedder::new(32),
    )
    .await;

    let stored = engine
        .memorize("The dragon attacks. The party flees.")
        .await;

    assert_eq!(stored, 1);
    let items = engine.store().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "The dragon attacks");
    assert_eq!(
        items[0].metadata.get("category"),
        Some(&serde_json::Value::from("MON"))
    );
    assert_eq!(
        items[0].metadata.get("span_text"),
        Some(&serde_json::Value::from("dragon"))
    );
}

#[tokio::test]
async fn test_memorize_failure_on_one_segment_spares_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new()
        .with_entity("dragon", EntityCategory::Monster)
        .with_entity("tavern", EntityCategory::Location)
        .with_failure_on("cursed");
    let mut engine = Engine::new(
        config(&dir),
        MockMaster::new(),
        extractor,
        MockEmbedder::new(32),
    )
    .await;

    let stored = engine
        .memorize("The dragon wakes. The cursed bell tolls. The tavern burns.")
        .await;

    assert_eq!(stored, 2);
    let texts: Vec<&str> = engine
        .store()
        .items()
        .iter()
        .map(|item| item.text.as_str())
        .collect();
    assert_eq!(texts, vec!["The dragon wakes", "The tavern burns"]);
}

#[tokio::test]
async fn test_remind_returns_most_similar_texts_first() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new()
        .with_entity("dragon", EntityCategory::Monster)
        .with_entity("blacksmith", EntityCategory::Person);
    let mut engine = Engine::new(
        config(&dir).with_remind_limit(1),
        MockMaster::new(),
        extractor,
        MockEmbedder::new(64),
    )
    .await;

    engine.memorize("The blacksmith forges a sword.").await;
    engine.memorize("The dragon sleeps on gold.").await;

    let recalled = engine.remind("dragon sleeps").await.unwrap();
    assert_eq!(recalled, vec!["The dragon sleeps on gold".to_string()]);
}

#[tokio::test]
async fn test_remind_on_empty_store_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(
        config(&dir),
        MockMaster::new(),
        MockExtractor::new(),
        MockEmbedder::new(32),
    )
    .await;

    let recalled = engine.remind("hello there").await.unwrap();
    assert!(recalled.is_empty());
}

#[tokio::test]
async fn test_dialog_generates_even_with_empty_memories() {
    let dir = tempfile::tempdir().unwrap();
    let master = MockMaster::new().with_response("You stand at the gates.");
    let mut engine = Engine::new(
        config(&dir),
        master,
        MockExtractor::new(),
        MockEmbedder::new(32),
    )
    .await;

    let outcome = engine.dialog("I approach the city").await.unwrap();
    assert_eq!(outcome.text, "You stand at the gates.");

    let calls = engine.master().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "");
    assert_eq!(calls[0].1, "I approach the city");
}

#[tokio::test]
async fn test_dialog_context_holds_short_term_then_recalled() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new().with_entity("dragon", EntityCategory::Monster);
    let master = MockMaster::new()
        .with_response("A shadow passes overhead.")
        .with_response("The dragon circles back.");
    let mut engine = Engine::new(config(&dir), master, extractor, MockEmbedder::new(64)).await;

    engine.memorize("The dragon guards the mine.").await;
    engine.dialog("I walk the road").await.unwrap();
    engine.dialog("I spot the dragon").await.unwrap();

    let calls = engine.master().calls();
    let second_context = &calls[1].0;
    assert_eq!(
        second_context,
        "A shadow passes overhead.\nThe dragon guards the mine"
    );
}

#[tokio::test]
async fn test_dialog_context_deduplicates_lines() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new().with_entity("dragon", EntityCategory::Monster);
    let master = MockMaster::new()
        .with_response("The dragon guards the mine")
        .with_response("It stirs.");
    let mut engine = Engine::new(config(&dir), master, extractor, MockEmbedder::new(64)).await;

    // First turn commits the response to both tiers, so the second
    // turn sees it in short-term memory and again via recall.
    engine.dialog("I enter the mine").await.unwrap();
    engine.dialog("I watch the dragon").await.unwrap();

    let calls = engine.master().calls();
    assert_eq!(calls[1].0, "The dragon guards the mine");
}

#[tokio::test]
async fn test_dialog_commits_only_the_response() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new()
        .with_entity("alice", EntityCategory::Person)
        .with_entity("bob", EntityCategory::Person);
    let master = MockMaster::new().with_response("Bob nods in silence.");
    let mut engine = Engine::new(config(&dir), master, extractor, MockEmbedder::new(32)).await;

    engine.dialog("I greet Alice").await.unwrap();

    let short: Vec<String> = engine
        .short_memory()
        .get(None)
        .iter()
        .map(|r| r.text.clone())
        .collect();
    assert_eq!(short, vec!["Bob nods in silence.".to_string()]);

    let items = engine.store().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "Bob nods in silence");
    assert!(!items.iter().any(|item| item.text.contains("Alice")));
}

#[tokio::test]
async fn test_dialog_failure_leaves_both_tiers_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new(
        config(&dir),
        FailingMaster,
        MockExtractor::new(),
        MockEmbedder::new(32),
    )
    .await;

    let result = engine.dialog("I open the door").await;
    assert!(matches!(
        result,
        Err(EngineError::Provider(ProviderError::Api { status: 503, .. }))
    ));
    assert!(engine.short_memory().is_empty());
    assert!(engine.store().is_empty());
}

#[tokio::test]
async fn test_repeated_dialog_keeps_growing_memory() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new().with_entity("goblin", EntityCategory::Monster);
    let master = MockMaster::new()
        .with_response("A goblin appears.")
        .with_response("Another goblin joins it.");
    let mut engine = Engine::new(config(&dir), master, extractor, MockEmbedder::new(32)).await;

    engine.dialog("I scout ahead").await.unwrap();
    assert_eq!(engine.store().len(), 1);
    engine.dialog("I scout ahead").await.unwrap();
    assert_eq!(engine.store().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_extractor_surfaces_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let timeout = Duration::from_millis(100);
    let mut engine = Engine::new(
        config(&dir).with_provider_timeout(timeout),
        MockMaster::new(),
        SlowExtractor::new(Duration::from_secs(600)),
        MockEmbedder::new(32),
    )
    .await;

    let result = engine.dialog("I wait").await;
    assert!(matches!(
        result,
        Err(EngineError::Provider(ProviderError::Timeout(t))) if t == timeout
    ));
}

#[tokio::test]
async fn test_save_then_reopen_preserves_memories() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new().with_entity("dragon", EntityCategory::Monster);
    let master = MockMaster::new().with_response("The dragon lands.");
    let mut engine = Engine::new(config(&dir), master, extractor, MockEmbedder::new(64)).await;

    engine.dialog("I look up").await.unwrap();
    engine.save().await.unwrap();

    let extractor = MockExtractor::new().with_entity("dragon", EntityCategory::Monster);
    let engine = Engine::new(
        config(&dir),
        MockMaster::new(),
        extractor,
        MockEmbedder::new(64),
    )
    .await;

    assert_eq!(engine.store().len(), 1);
    let recalled = engine.remind("the dragon").await.unwrap();
    assert_eq!(recalled, vec!["The dragon lands".to_string()]);
}
