//! Mock collaborators for tests and offline development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use assessify_core::model::{QuestionSetHierarchy, SourceDoc};
use assessify_core::traits::{CacheGateway, HierarchyFetcher};

/// Fetcher backed by canned documents. Counts calls so tests can assert
/// how often the upstream was actually hit.
pub struct MockFetcher {
    hierarchy: QuestionSetHierarchy,
    questions: HashMap<String, SourceDoc>,
    fail_hierarchy: bool,
    question_set_calls: AtomicU32,
    question_calls: AtomicU32,
}

impl MockFetcher {
    pub fn new(hierarchy: QuestionSetHierarchy) -> Self {
        Self {
            hierarchy,
            questions: HashMap::new(),
            fail_hierarchy: false,
            question_set_calls: AtomicU32::new(0),
            question_calls: AtomicU32::new(0),
        }
    }

    /// Fetcher whose hierarchy read always errors.
    pub fn failing() -> Self {
        let mut fetcher = Self::new(QuestionSetHierarchy::default());
        fetcher.fail_hierarchy = true;
        fetcher
    }

    pub fn with_question(mut self, id: &str, doc: Value) -> Self {
        let doc: SourceDoc = serde_json::from_value(doc).expect("question must be a JSON object");
        self.questions.insert(id.to_string(), doc);
        self
    }

    pub fn question_set_calls(&self) -> u32 {
        self.question_set_calls.load(Ordering::SeqCst)
    }

    pub fn question_calls(&self) -> u32 {
        self.question_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HierarchyFetcher for MockFetcher {
    async fn fetch_question_set(&self, id: &str) -> anyhow::Result<QuestionSetHierarchy> {
        self.question_set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_hierarchy {
            anyhow::bail!("mock hierarchy failure for '{id}'");
        }
        Ok(self.hierarchy.clone())
    }

    async fn fetch_question(&self, id: &str) -> anyhow::Result<SourceDoc> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        self.questions
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no mock question registered for '{id}'"))
    }
}

/// Plain map-backed cache. `failing()` yields a gateway whose operations
/// all error, for exercising fail-open behaviour.
pub struct MockCache {
    entries: Mutex<HashMap<String, String>>,
    fail: bool,
}

impl MockCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        let mut cache = Self::new();
        cache.fail = true;
        cache
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl Default for MockCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheGateway for MockCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail {
            anyhow::bail!("mock cache read failure");
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_with_ttl(&self, key: &str, _ttl_secs: u64, value: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("mock cache write failure");
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
