mod common;

use std::fs;
use std::path::Path;

use common::{ids, wardrobe, ScriptedChat};
use outfit_core::catalog::InMemoryCatalog;
use outfit_core::config::EngineConfig;
use outfit_core::intent::{ChatCompletion, ChatError, ChatRequest, IntentExtractor};
use outfit_core::pipeline::CompositionPipeline;
use outfit_core::replay::{
    RecordedExchange, RecordingChat, ReplayBuildConfig, ReplayBuildError, ReplayCache,
    ReplayCacheBuilder, ReplayLoadError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

fn exchanges() -> Vec<RecordedExchange> {
    vec![
        RecordedExchange::new(&ChatRequest::text("vibe: grunge"), r#"{"search_terms": ["flannel"]}"#),
        RecordedExchange::new(
            &ChatRequest::text("describe").with_image("image/jpeg", vec![1, 2, 3]),
            r#"{"title": "Jacket", "vibe_description": "Boxy"}"#,
        ),
    ]
}

#[test]
fn build_writes_manifest_index_and_responses() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("replay");

    let cache = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), &out)
        .unwrap();

    assert!(out.join("manifest.json").is_file());
    assert!(out.join("index.json").is_file());
    assert_eq!(fs::read_dir(out.join("responses")).unwrap().count(), 2);
    assert_eq!(cache.manifest.exchange_count, 2);
    assert!(cache.cache_version().starts_with("sha256:"));

    // Entries are sorted by key.
    let keys: Vec<_> = cache.manifest.exchanges.iter().map(|e| e.key.clone()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    // No temp directory is left behind.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("replay")]);
}

#[test]
fn cache_version_ignores_input_order() {
    let dir = tempdir().unwrap();
    let builder = ReplayCacheBuilder::new(ReplayBuildConfig::v0());

    let mut reversed = exchanges();
    reversed.reverse();

    let a = builder.build(exchanges(), &dir.path().join("a")).unwrap();
    let b = builder.build(reversed, &dir.path().join("b")).unwrap();
    assert_eq!(a.cache_version(), b.cache_version());

    let mut changed = exchanges();
    changed[0].response = r#"{"search_terms": ["plaid"]}"#.to_string();
    let c = builder.build(changed, &dir.path().join("c")).unwrap();
    assert_ne!(a.cache_version(), c.cache_version());
}

#[test]
fn existing_output_directory_is_refused() {
    let dir = tempdir().unwrap();
    let err = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), dir.path())
        .unwrap_err();
    assert!(matches!(err, ReplayBuildError::OutputExists(_)));
}

#[test]
fn duplicate_requests_are_refused() {
    let dir = tempdir().unwrap();
    let mut twice = exchanges();
    twice.push(twice[0].clone());

    let err = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(twice, &dir.path().join("replay"))
        .unwrap_err();
    assert!(matches!(err, ReplayBuildError::DuplicateKey(_)));
}

#[test]
fn reopened_cache_loads_verified_exchanges() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("replay");
    let built = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), &out)
        .unwrap();

    let reopened = ReplayCache::open(&out).unwrap();
    assert_eq!(reopened.cache_version(), built.cache_version());

    let mut loaded = reopened.load_exchanges().unwrap();
    let mut expected = exchanges();
    loaded.sort_by(|a, b| a.key.cmp(&b.key));
    expected.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(loaded, expected);
}

#[test]
fn tampered_response_fails_verification() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("replay");
    let cache = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), &out)
        .unwrap();

    let entry = &cache.manifest.exchanges[0];
    let path = out.join(&entry.file);
    let mut exchange: RecordedExchange =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    exchange.response.push_str(" ");
    fs::write(&path, serde_json::to_string(&exchange).unwrap()).unwrap();

    let err = ReplayCache::open(&out).unwrap().load_exchanges().unwrap_err();
    assert!(matches!(err, ReplayLoadError::DigestMismatch { .. }));
}

type IndexJson = serde_json::Map<String, serde_json::Value>;

fn rewrite_index(out: &Path, edit: impl FnOnce(&mut IndexJson)) {
    let path = out.join("index.json");
    let mut index: IndexJson = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    edit(&mut index);
    fs::write(&path, serde_json::to_string_pretty(&index).unwrap()).unwrap();
}

#[test]
fn index_pointing_at_the_wrong_file_is_refused() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("replay");
    let cache = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), &out)
        .unwrap();
    let first = &cache.manifest.exchanges[0];
    let second = &cache.manifest.exchanges[1];

    rewrite_index(&out, |index| {
        index.insert(first.key.to_string(), second.file.clone().into());
    });

    let err = ReplayCache::open(&out).unwrap_err();
    assert!(matches!(
        err,
        ReplayLoadError::IndexMismatch { ref key, .. } if *key == first.key
    ));
}

#[test]
fn index_missing_an_entry_is_refused() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("replay");
    let cache = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), &out)
        .unwrap();
    let dropped = cache.manifest.exchanges[1].key.to_string();

    rewrite_index(&out, |index| {
        index.remove(&dropped);
    });

    let err = ReplayCache::open(&out).unwrap_err();
    assert!(matches!(
        err,
        ReplayLoadError::IndexSize { expected: 2, found: 1 }
    ));
}

#[test]
fn missing_manifest_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = ReplayCache::open(dir.path()).unwrap_err();
    assert!(matches!(err, ReplayLoadError::Io(_)));
}

#[tokio::test]
async fn replay_chat_answers_recorded_requests_only() {
    let dir = tempdir().unwrap();
    let chat = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(exchanges(), &dir.path().join("replay"))
        .unwrap()
        .into_chat()
        .unwrap();

    assert_eq!(chat.len(), 2);
    let reply = chat.complete(&ChatRequest::text("vibe: grunge")).await.unwrap();
    assert_eq!(reply, r#"{"search_terms": ["flannel"]}"#);

    // Same text, different image: a different request.
    let other = ChatRequest::text("describe").with_image("image/jpeg", vec![9]);
    let err = chat.complete(&other).await.unwrap_err();
    assert!(matches!(err, ChatError::NotRecorded(_)));
}

#[tokio::test]
async fn recorded_session_replays_to_the_same_outfit() {
    let config = EngineConfig::default();
    let catalog = InMemoryCatalog::new(wardrobe());

    let live = RecordingChat::new(ScriptedChat::always(
        r#"{"search_terms": ["denim", "sneakers"]}"#,
    ));
    let recording = CompositionPipeline::new(
        IntentExtractor::new(live, config.extraction()),
        catalog.clone(),
        catalog.clone(),
        config.clone(),
    );
    let original = recording
        .vibe_outfit("weekend denim", None, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap()
        .composed()
        .unwrap();
    let recorded = recording.oracle().chat().exchanges();
    assert_eq!(recorded.len(), 1);

    let dir = tempdir().unwrap();
    let replay = ReplayCacheBuilder::new(ReplayBuildConfig::v0())
        .build(recorded, &dir.path().join("session"))
        .unwrap()
        .into_chat()
        .unwrap();
    let replaying = CompositionPipeline::new(
        IntentExtractor::new(replay, config.extraction()),
        catalog.clone(),
        catalog,
        config,
    );
    let replayed = replaying
        .vibe_outfit("weekend denim", None, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap()
        .composed()
        .unwrap();

    assert_eq!(ids(&replayed.items), ids(&original.items));
    assert_eq!(ids(&original.items), vec![1, 11, 7, 4]);
}
