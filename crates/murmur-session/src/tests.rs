//! Unit tests for the augmentation chain and turn interceptor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use murmur_llm::{ChatModel, LlmError};
use murmur_memory::{DbRuntimeSettings, MemoryStore};
use murmur_types::{ChatContext, Role, Turn};

use crate::chain::AugmentationChain;
use crate::interceptor::TurnInterceptor;
use crate::prompt::{CONTEXT_PREFIX, PRIMARY_SYSTEM_PROMPT};

/// A scripted model: replies with a fixed advisory and counts calls.
struct ScriptedModel {
    advisory: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(advisory: &str) -> Arc<Self> {
        Arc::new(Self {
            advisory: advisory.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _turns: &[Turn]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.advisory.clone())
    }
}

/// A model that always fails.
struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn complete(&self, _turns: &[Turn]) -> Result<String, LlmError> {
        Err(LlmError::MalformedResponse("scripted failure".to_string()))
    }
}

/// A model that never answers within any reasonable test timeout.
struct StalledModel;

#[async_trait]
impl ChatModel for StalledModel {
    async fn complete(&self, _turns: &[Turn]) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

fn test_store(dir: &tempfile::TempDir) -> MemoryStore {
    let path = dir.path().join("memory.db");
    MemoryStore::open(path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("store should open")
}

// ── augmentation chain ───────────────────────────────────────────────

#[tokio::test]
async fn augment_returns_advisory_and_records_two_turns() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(ScriptedModel::new("try a short walk"), store.clone());

    let advisory = chain
        .augment("user@example.com", "I feel anxious today")
        .await
        .expect("augment should succeed");
    assert_eq!(advisory, "try a short walk");

    let turns = store.read("user@example.com").unwrap();
    assert_eq!(turns.len(), 2, "exactly two appends per call");
    assert_eq!(turns[0].role, Role::Human);
    assert_eq!(turns[0].content, "I feel anxious today");
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, "try a short walk");
}

#[tokio::test]
async fn repeated_augment_appends_exactly_two_turns_each() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(ScriptedModel::new("noted"), store.clone());

    chain.augment("t", "hello").await.unwrap();
    chain.augment("t", "hello").await.unwrap();

    let turns = store.read("t").unwrap();
    assert_eq!(turns.len(), 4, "two calls must produce four rows, no more");
    let seqs: Vec<i64> = turns.iter().map(|t| t.seq).collect();
    assert_eq!(seqs, [1, 2, 3, 4]);
}

#[tokio::test]
async fn record_turn_appends_utterance_then_advisory() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(ScriptedModel::new("unused"), store.clone());

    chain
        .record_turn("t", "hello", "remember the walk")
        .await
        .expect("record should succeed");

    let turns = store.read("t").unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::Human);
    assert_eq!(turns[0].content, "hello");
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, "remember the walk");
}

#[tokio::test]
async fn fetch_advisory_does_not_write_memory() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(ScriptedModel::new("advice"), store.clone());

    let advisory = chain.fetch_advisory("t", "hello").await.unwrap();
    assert_eq!(advisory, "advice");
    assert!(store.read("t").unwrap().is_empty(), "fetch must be pure");
}

#[tokio::test]
async fn augment_sees_previously_recorded_turns() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    /// Replies with how many turns the prompt carried.
    struct CountingModel;

    #[async_trait]
    impl ChatModel for CountingModel {
        async fn complete(&self, turns: &[Turn]) -> Result<String, LlmError> {
            Ok(format!("prompt had {} turns", turns.len()))
        }
    }

    let chain = AugmentationChain::new(Arc::new(CountingModel), store.clone());

    // First call: persona + utterance.
    let first = chain.augment("t", "one").await.unwrap();
    assert_eq!(first, "prompt had 2 turns");

    // Second call: persona + 2 remembered turns + utterance.
    let second = chain.augment("t", "two").await.unwrap();
    assert_eq!(second, "prompt had 4 turns");
}

#[tokio::test]
async fn model_failure_propagates_and_leaves_memory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(Arc::new(FailingModel), store.clone());

    let err = chain.augment("t", "hello").await.unwrap_err();
    assert!(matches!(err, crate::SessionError::Llm(_)));
    assert!(store.read("t").unwrap().is_empty());
}

// ── turn interceptor ─────────────────────────────────────────────────

#[tokio::test]
async fn before_generate_rewrites_the_system_slot() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let model = ScriptedModel::new("breathe in for four counts");
    let chain = AugmentationChain::new(model, store.clone());
    let interceptor = TurnInterceptor::new(chain, Some("user@example.com".to_string()));

    let mut ctx = ChatContext::new(PRIMARY_SYSTEM_PROMPT);
    ctx.push_human("I feel anxious today");

    let augmented = interceptor.before_generate(&mut ctx).await;

    assert!(augmented);
    assert_eq!(
        ctx.system_content(),
        format!("{CONTEXT_PREFIX}\n\nbreathe in for four counts")
    );
    // The exchange itself is untouched.
    assert_eq!(ctx.turns()[1], Turn::human("I feel anxious today"));

    // The memory side effect happened transitively.
    let turns = store.read("user@example.com").unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "I feel anxious today");
    assert_eq!(turns[1].content, "breathe in for four counts");
}

#[tokio::test]
async fn unbound_partition_leaves_context_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let model = ScriptedModel::new("should never be used");
    let calls = Arc::clone(&model);
    let chain = AugmentationChain::new(model, store);
    let interceptor = TurnInterceptor::new(chain, None);

    let mut ctx = ChatContext::new(PRIMARY_SYSTEM_PROMPT);
    ctx.push_human("hello");
    let before = ctx.clone();

    let augmented = interceptor.before_generate(&mut ctx).await;

    assert!(!augmented);
    assert!(!interceptor.is_partitioned());
    assert_eq!(ctx, before);
    assert_eq!(calls.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn context_without_a_human_message_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(ScriptedModel::new("unused"), store);
    let interceptor = TurnInterceptor::new(chain, Some("t".to_string()));

    let mut ctx = ChatContext::new(PRIMARY_SYSTEM_PROMPT);
    let augmented = interceptor.before_generate(&mut ctx).await;

    assert!(!augmented);
    assert_eq!(ctx.system_content(), PRIMARY_SYSTEM_PROMPT);
}

#[tokio::test]
async fn chain_failure_keeps_the_prior_system_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(Arc::new(FailingModel), store);
    let interceptor = TurnInterceptor::new(chain, Some("t".to_string()));

    let mut ctx = ChatContext::new(PRIMARY_SYSTEM_PROMPT);
    ctx.push_human("hello");

    let augmented = interceptor.before_generate(&mut ctx).await;

    assert!(!augmented);
    assert_eq!(ctx.system_content(), PRIMARY_SYSTEM_PROMPT);
}

#[tokio::test]
async fn stalled_chain_times_out_and_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let chain = AugmentationChain::new(Arc::new(StalledModel), store);
    let interceptor =
        TurnInterceptor::new(chain, Some("t".to_string())).with_timeout(Duration::from_millis(50));

    let mut ctx = ChatContext::new(PRIMARY_SYSTEM_PROMPT);
    ctx.push_human("hello");

    let augmented = interceptor.before_generate(&mut ctx).await;

    assert!(!augmented);
    assert_eq!(ctx.system_content(), PRIMARY_SYSTEM_PROMPT);
}
