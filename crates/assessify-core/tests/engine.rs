//! End-to-end engine tests over stub collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use assessify_core::engine::{EngineConfig, EvidenceEngine};
use assessify_core::model::{PageQuestions, QuestionSetHierarchy, SolutionInfo, SourceDoc};
use assessify_core::traits::{CacheGateway, HierarchyFetcher};

struct StubFetcher {
    hierarchy: QuestionSetHierarchy,
    questions: HashMap<String, SourceDoc>,
    question_set_calls: AtomicU32,
    question_calls: AtomicU32,
}

impl StubFetcher {
    fn new(hierarchy: Value, questions: Vec<Value>) -> Self {
        let questions = questions
            .into_iter()
            .map(|question| {
                let doc: SourceDoc = serde_json::from_value(question).unwrap();
                (doc.identifier().to_string(), doc)
            })
            .collect();
        Self {
            hierarchy: serde_json::from_value(hierarchy).unwrap(),
            questions,
            question_set_calls: AtomicU32::new(0),
            question_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl HierarchyFetcher for StubFetcher {
    async fn fetch_question_set(&self, _id: &str) -> anyhow::Result<QuestionSetHierarchy> {
        self.question_set_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.hierarchy.clone())
    }

    async fn fetch_question(&self, id: &str) -> anyhow::Result<SourceDoc> {
        self.question_calls.fetch_add(1, Ordering::Relaxed);
        self.questions
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("question not found: {id}"))
    }
}

#[derive(Default)]
struct StubCache {
    store: Mutex<HashMap<String, String>>,
    fail: bool,
}

impl StubCache {
    fn failing() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    fn value(&self, key: &str) -> Option<String> {
        self.store.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl CacheGateway for StubCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail {
            anyhow::bail!("cache unavailable");
        }
        Ok(self.store.lock().unwrap().get(key).cloned())
    }

    async fn set_with_ttl(&self, key: &str, _ttl_secs: u64, value: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("cache unavailable");
        }
        self.store
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn question(id: &str, body: &str) -> Value {
    json!({
        "identifier": id,
        "primaryCategory": "Text",
        "body": body,
        "code": format!("{}_CODE", id.to_uppercase()),
        "interactions": {
            "validation": {"required": "Yes"},
            "response1": {"type": {"number": "No"}}
        }
    })
}

fn radio_question(id: &str, options: Value) -> Value {
    json!({
        "identifier": id,
        "primaryCategory": "Multiselect Multiple Choice Question",
        "body": format!("<p>{id}</p>"),
        "responseDeclaration": {"response1": {"cardinality": "single"}},
        "interactions": {
            "validation": {"required": "Yes"},
            "response1": {"options": options}
        }
    })
}

fn two_criteria_hierarchy() -> Value {
    json!({
        "description": "School readiness",
        "children": [
            {
                "identifier": "c1",
                "code": "C1",
                "name": "Infrastructure",
                "channel": "org-01",
                "children": [
                    {"identifier": "q1"},
                    {"identifier": "q2"}
                ]
            },
            {
                "identifier": "c2",
                "code": "C2",
                "name": "Empty criteria",
                "children": []
            }
        ]
    })
}

fn engine(fetcher: Arc<StubFetcher>, cache: Arc<StubCache>) -> EvidenceEngine {
    EvidenceEngine::new(fetcher, cache, EngineConfig::default())
}

fn solution() -> SolutionInfo {
    SolutionInfo {
        kind: "observation".to_string(),
    }
}

#[tokio::test]
async fn builds_sections_and_criteria_in_source_order() {
    let fetcher = Arc::new(StubFetcher::new(
        two_criteria_hierarchy(),
        vec![question("q1", "<p>First</p>"), question("q2", "<p>Second</p>")],
    ));
    let cache = Arc::new(StubCache::default());

    let data = engine(Arc::clone(&fetcher), cache)
        .build("do_123", &solution(), true)
        .await
        .unwrap();

    // Every criteria node yields a record; only the one with children
    // yields a section.
    assert_eq!(data.submission_document_criterias.len(), 2);
    assert_eq!(data.evidence_sections.len(), 1);
    let section = &data.evidence_sections[0];
    assert_eq!(section.code, "C1");
    assert_eq!(section.name, "Infrastructure");
    assert_eq!(section.page, "p1");

    let PageQuestions::Flat(questions) = &section.page_questions else {
        panic!("expected flat page questions");
    };
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["_id"], json!("q1"));
    assert_eq!(questions[0]["questionNumber"], json!("1"));
    assert_eq!(questions[1]["_id"], json!("q2"));
    assert_eq!(questions[1]["questionNumber"], json!("2"));
    assert_eq!(questions[1]["page"], json!("p1"));

    let method = &data.evidences[0];
    assert_eq!(method.name, "Observation");
    assert_eq!(method.description, "School readiness");
    assert_eq!(method.sections[0].name, "Observation Questions");
}

#[tokio::test]
async fn repeated_cold_builds_are_identical() {
    let fetcher = Arc::new(StubFetcher::new(
        two_criteria_hierarchy(),
        vec![question("q1", "<p>First</p>"), question("q2", "<p>Second</p>")],
    ));

    let first = engine(Arc::clone(&fetcher), Arc::new(StubCache::failing()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();
    let second = engine(Arc::clone(&fetcher), Arc::new(StubCache::failing()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn warm_cache_skips_the_fetcher_entirely() {
    let fetcher = Arc::new(StubFetcher::new(
        two_criteria_hierarchy(),
        vec![question("q1", "<p>First</p>"), question("q2", "<p>Second</p>")],
    ));
    let cache = Arc::new(StubCache::default());
    let engine = engine(Arc::clone(&fetcher), Arc::clone(&cache));

    let cold = engine.build("do_123", &solution(), true).await.unwrap();
    let cached = cache.value("do_123").expect("bundle cached after build");
    assert_eq!(serde_json::to_string(&cold).unwrap(), cached);

    let set_calls = fetcher.question_set_calls.load(Ordering::Relaxed);
    let question_calls = fetcher.question_calls.load(Ordering::Relaxed);

    let warm = engine.build("do_123", &solution(), true).await.unwrap();
    assert_eq!(warm, cold);
    assert_eq!(fetcher.question_set_calls.load(Ordering::Relaxed), set_calls);
    assert_eq!(fetcher.question_calls.load(Ordering::Relaxed), question_calls);
}

#[tokio::test]
async fn cache_failures_fall_open() {
    let fetcher = Arc::new(StubFetcher::new(
        two_criteria_hierarchy(),
        vec![question("q1", "<p>First</p>"), question("q2", "<p>Second</p>")],
    ));

    let data = engine(fetcher, Arc::new(StubCache::failing()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();
    assert_eq!(data.evidence_sections.len(), 1);
}

#[tokio::test]
async fn hierarchy_failure_produces_failure_envelope() {
    struct DownFetcher;

    #[async_trait]
    impl HierarchyFetcher for DownFetcher {
        async fn fetch_question_set(&self, _id: &str) -> anyhow::Result<QuestionSetHierarchy> {
            anyhow::bail!("service unavailable")
        }

        async fn fetch_question(&self, _id: &str) -> anyhow::Result<SourceDoc> {
            anyhow::bail!("service unavailable")
        }
    }

    let engine = EvidenceEngine::new(
        Arc::new(DownFetcher),
        Arc::new(StubCache::default()),
        EngineConfig::default(),
    );
    let response = engine.build_response("do_404", &solution(), true).await;

    assert!(!response.success);
    assert_eq!(response.data, Value::Bool(false));
    assert!(response.message.contains("do_404"));
}

#[tokio::test]
async fn failing_question_aborts_page_with_indexed_error() {
    // q2 is missing from the stub; it is the second child (index 1).
    let fetcher = Arc::new(StubFetcher::new(
        two_criteria_hierarchy(),
        vec![question("q1", "<p>First</p>")],
    ));

    let error = engine(fetcher, Arc::new(StubCache::default()))
        .build("do_123", &solution(), true)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("index 1"));
}

#[tokio::test]
async fn skipping_page_questions_still_builds_criteria_and_sections() {
    let fetcher = Arc::new(StubFetcher::new(two_criteria_hierarchy(), Vec::new()));
    let cache = Arc::new(StubCache::default());

    let data = engine(Arc::clone(&fetcher), cache)
        .build("do_123", &solution(), false)
        .await
        .unwrap();

    assert_eq!(data.submission_document_criterias.len(), 2);
    assert_eq!(data.evidence_sections.len(), 1);
    assert_eq!(
        data.evidence_sections[0].page_questions,
        PageQuestions::Flat(Vec::new())
    );
    assert_eq!(fetcher.question_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn matrix_criteria_wrap_page_questions_in_one_record() {
    let hierarchy = json!({
        "description": "Matrix set",
        "children": [{
            "identifier": "c1",
            "code": "C1",
            "name": "Comments",
            "instances": {"label": "Group1"},
            "children": [
                {"identifier": "q1"},
                {"identifier": "q2"},
                {"identifier": "q3"}
            ]
        }]
    });
    let fetcher = Arc::new(StubFetcher::new(
        hierarchy,
        vec![
            question("q1", "<p>One</p>"),
            question("q2", "<p>Two</p>"),
            question("q3", "<p>Three</p>"),
        ],
    ));

    let data = engine(fetcher, Arc::new(StubCache::default()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();

    let PageQuestions::Matrix(record) = &data.evidence_sections[0].page_questions else {
        panic!("expected a matrix record");
    };
    assert_eq!(record["responseType"], json!("matrix"));
    assert_eq!(record["instanceIdentifier"], json!("Group1"));
    assert_eq!(record["instanceQuestions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn branching_target_rule_rewrites_the_branch_point() {
    let hierarchy = json!({
        "description": "Branching set",
        "children": [{
            "identifier": "c1",
            "code": "C1",
            "name": "Branching",
            "branchingLogic": {
                "q1": {"target": ["q2", "q3"]}
            },
            "children": [
                {"identifier": "q1"},
                {"identifier": "q2"},
                {"identifier": "q3"}
            ]
        }]
    });
    let fetcher = Arc::new(StubFetcher::new(
        hierarchy,
        vec![
            radio_question("q1", json!([{"value": "R1"}, {"value": "R2"}])),
            question("q2", "<p>Two</p>"),
            question("q3", "<p>Three</p>"),
        ],
    ));

    let data = engine(fetcher, Arc::new(StubCache::default()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();

    let PageQuestions::Flat(questions) = &data.evidence_sections[0].page_questions else {
        panic!("expected flat page questions");
    };
    assert_eq!(questions[0]["children"], json!(["q2", "q3"]));
    assert_eq!(
        questions[0]["options"],
        json!([{"value": "R1"}, {"value": "R2"}])
    );
}

#[tokio::test]
async fn branching_precondition_attaches_visibility_predicate() {
    let hierarchy = json!({
        "description": "Branching set",
        "children": [{
            "identifier": "c1",
            "code": "C1",
            "name": "Branching",
            "branchingLogic": {
                "q2": {
                    "preCondition": {"and": [{"eq": ["q1", 1]}]},
                    "source": ["q1"]
                }
            },
            "children": [
                {"identifier": "q1"},
                {"identifier": "q2"}
            ]
        }]
    });
    let fetcher = Arc::new(StubFetcher::new(
        hierarchy,
        vec![
            radio_question("q1", json!([{"value": "R1"}, {"value": "R2"}])),
            question("q2", "<p>Two</p>"),
        ],
    ));

    let data = engine(fetcher, Arc::new(StubCache::default()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();

    let PageQuestions::Flat(questions) = &data.evidence_sections[0].page_questions else {
        panic!("expected flat page questions");
    };
    // q1 was read earlier in the same pass, so the lookup hits the buffer.
    assert_eq!(
        questions[1]["visibleIf"],
        json!([{
            "operator": "===",
            "value": ["R2"],
            "referencedQuestionId": "q1"
        }])
    );
}

#[tokio::test]
async fn forward_branching_reference_fetches_the_later_sibling() {
    let hierarchy = json!({
        "description": "Branching set",
        "children": [{
            "identifier": "c1",
            "code": "C1",
            "name": "Branching",
            "branchingLogic": {
                "q1": {
                    "preCondition": {"and": [{"neq": ["q2", -1]}]},
                    "source": ["q2"]
                }
            },
            "children": [
                {"identifier": "q1"},
                {"identifier": "q2"}
            ]
        }]
    });
    let fetcher = Arc::new(StubFetcher::new(
        hierarchy,
        vec![
            question("q1", "<p>One</p>"),
            radio_question("q2", json!([{"value": "First"}])),
        ],
    ));

    let data = engine(Arc::clone(&fetcher), Arc::new(StubCache::default()))
        .build("do_123", &solution(), true)
        .await
        .unwrap();

    let PageQuestions::Flat(questions) = &data.evidence_sections[0].page_questions else {
        panic!("expected flat page questions");
    };
    assert_eq!(
        questions[0]["visibleIf"],
        json!([{
            "operator": "!==",
            "value": ["First"],
            "referencedQuestionId": "q2"
        }])
    );
    // q2 is fetched once for the forward lookup and once as its own page
    // entry.
    assert_eq!(fetcher.question_calls.load(Ordering::Relaxed), 3);
}
