//! Evidence Builder — orchestrates the criteria-tree traversal.
//!
//! On a cache miss the engine fetches the question-set hierarchy and walks
//! its top-level criteria nodes sequentially, in source order. Ordering is
//! load-bearing: a branching rule may reference an earlier sibling read
//! during the same pass, and question numbering is index-derived, so no
//! part of the traversal is concurrent.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::branching::{self, BranchRule};
use crate::envelope::{messages, ApiResponse};
use crate::error::EngineError;
use crate::matrix;
use crate::model::{
    CriteriaRecord, EvidenceData, EvidenceMethod, EvidenceSectionGroup, PageQuestions,
    PageSection, QuestionRecord, SolutionInfo, SourceDoc,
};
use crate::templates::{self, CriteriaRule};
use crate::traits::{CacheGateway, HierarchyFetcher};
use crate::transform;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cache entry lifetime in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 43_200,
        }
    }
}

/// The evidence engine. Cheap to clone per invocation via the shared
/// collaborator handles.
pub struct EvidenceEngine {
    fetcher: Arc<dyn HierarchyFetcher>,
    cache: Arc<dyn CacheGateway>,
    config: EngineConfig,
}

impl EvidenceEngine {
    pub fn new(
        fetcher: Arc<dyn HierarchyFetcher>,
        cache: Arc<dyn CacheGateway>,
        config: EngineConfig,
    ) -> Self {
        Self {
            fetcher,
            cache,
            config,
        }
    }

    /// Build the evidence bundle for one reference question-set identifier.
    ///
    /// Returns the cached bundle when one exists; otherwise computes it from
    /// the upstream hierarchy and writes it back with a TTL. Cache failures
    /// in either direction are logged and ignored.
    pub async fn build(
        &self,
        reference_id: &str,
        solution: &SolutionInfo,
        include_page_questions: bool,
    ) -> Result<EvidenceData, EngineError> {
        match self.cache.get(reference_id).await {
            Ok(Some(cached)) => match serde_json::from_str::<EvidenceData>(&cached) {
                Ok(data) => {
                    debug!(reference_id, "evidence served from cache");
                    return Ok(data);
                }
                Err(error) => {
                    warn!(reference_id, "discarding undecodable cache entry: {error}");
                }
            },
            Ok(None) => {}
            Err(error) => {
                warn!(reference_id, "cache read failed, treating as miss: {error:#}");
            }
        }

        let hierarchy = self
            .fetcher
            .fetch_question_set(reference_id)
            .await
            .map_err(|error| EngineError::hierarchy(reference_id, error))?;

        let mut evidence_sections = Vec::new();
        let mut criterias: Vec<CriteriaRecord> = Vec::new();

        for (position, criteria) in hierarchy.children.iter().enumerate() {
            let page = format!("p{}", position + 1);
            let children = criteria.children();

            let mut page_questions = PageQuestions::default();
            if include_page_questions && !children.is_empty() {
                let questions = self
                    .build_page_questions(criteria, &children, &page)
                    .await?;
                page_questions = match criteria.instance_label() {
                    Some(_) => PageQuestions::Matrix(Box::new(matrix::build_matrix_record(
                        criteria, questions,
                    ))),
                    None => PageQuestions::Flat(questions),
                };
            }

            // The criteria record is produced unconditionally; a section
            // only exists when the node has child questions.
            criterias.push(build_criteria_record(criteria));
            if !children.is_empty() {
                evidence_sections.push(PageSection {
                    code: criteria.str_at("code").unwrap_or_default().to_string(),
                    name: criteria.str_at("name").unwrap_or_default().to_string(),
                    page,
                    page_questions,
                });
            }
        }

        let data = assemble_bundle(solution, &hierarchy.description, evidence_sections, criterias);

        match serde_json::to_string(&data) {
            Ok(serialized) => {
                if let Err(error) = self
                    .cache
                    .set_with_ttl(reference_id, self.config.cache_ttl_secs, &serialized)
                    .await
                {
                    warn!(reference_id, "cache write failed: {error:#}");
                }
            }
            Err(error) => warn!(reference_id, "skipping cache write: {error}"),
        }

        Ok(data)
    }

    /// Build and wrap into the uniform response envelope.
    pub async fn build_response(
        &self,
        reference_id: &str,
        solution: &SolutionInfo,
        include_page_questions: bool,
    ) -> ApiResponse {
        match self
            .build(reference_id, solution, include_page_questions)
            .await
        {
            Ok(data) => ApiResponse::ok(messages::EVIDENCE_FETCHED, data),
            Err(error) => ApiResponse::failure(&error.to_string()),
        }
    }

    /// Transform the child questions of one criteria node, strictly in
    /// order. The read buffer accumulates every question fetched for this
    /// page and backs branching lookups for later siblings.
    async fn build_page_questions(
        &self,
        criteria: &SourceDoc,
        children: &[SourceDoc],
        page: &str,
    ) -> Result<Vec<QuestionRecord>, EngineError> {
        let branching = criteria
            .value_at("branchingLogic")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut read_buffer: Vec<SourceDoc> = Vec::new();
        let mut questions = Vec::with_capacity(children.len());

        for (index, child) in children.iter().enumerate() {
            let record = self
                .build_one_question(&branching, child, children, &mut read_buffer, index, page)
                .await
                .map_err(|error| EngineError::page_question(index, error))?;
            questions.push(record);
        }

        debug!(
            criteria = criteria.identifier(),
            count = questions.len(),
            "{}",
            messages::PAGE_QUESTIONS_FETCHED
        );
        Ok(questions)
    }

    async fn build_one_question(
        &self,
        branching: &Map<String, Value>,
        child: &SourceDoc,
        siblings: &[SourceDoc],
        read_buffer: &mut Vec<SourceDoc>,
        index: usize,
        page: &str,
    ) -> anyhow::Result<QuestionRecord> {
        let mut doc = self.fetcher.fetch_question(child.identifier()).await?;

        // The buffer keeps the as-fetched form: branching below mutates only
        // the local copy, so a later sibling's lookup sees this question
        // without its own branching applied. Known upstream behavior, kept
        // for compatibility.
        read_buffer.push(doc.clone());

        if !branching.is_empty() {
            if let Some(rule) = BranchRule::for_question(branching, doc.identifier()) {
                branching::apply(&rule, &mut doc, read_buffer, siblings, self.fetcher.as_ref())
                    .await;
            }
        }

        Ok(transform::transform_question(&doc, child, index, page)?)
    }
}

/// Build the flattened criteria record for one top-level node.
fn build_criteria_record(criteria: &SourceDoc) -> CriteriaRecord {
    let mut record = Map::new();
    for field in templates::criteria_template() {
        let value = match field.rule {
            CriteriaRule::Constant(value) => value,
            CriteriaRule::Source(path) => criteria
                .value_at(path)
                .cloned()
                .unwrap_or_else(|| json!("")),
            CriteriaRule::WrapSource(path) => match criteria.value_at(path) {
                Some(value) => json!([value]),
                None => json!([]),
            },
        };
        record.insert(field.name.to_string(), value);
    }
    record
}

fn assemble_bundle(
    solution: &SolutionInfo,
    description: &str,
    evidence_sections: Vec<PageSection>,
    criterias: Vec<CriteriaRecord>,
) -> EvidenceData {
    let title = capitalize(&solution.kind);
    let method = EvidenceMethod {
        code: "SF".to_string(),
        external_id: "SF".to_string(),
        name: title.clone(),
        description: description.to_string(),
        sections: vec![EvidenceSectionGroup {
            code: "SQ".to_string(),
            name: format!("{title} Questions"),
            questions: evidence_sections.clone(),
        }],
        tip: None,
        mode_of_collection: "onfield".to_string(),
        can_be_not_applicable: false,
        not_applicable: false,
        can_be_not_allowed: false,
        remarks: None,
        start_time: String::new(),
        end_time: String::new(),
        is_submitted: false,
        submissions: Vec::new(),
    };

    EvidenceData {
        evidence_sections,
        submission_document_criterias: criterias,
        evidences: vec![method],
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
