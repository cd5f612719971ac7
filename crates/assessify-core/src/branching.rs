//! Branching Resolver — interprets the declarative branching-rule language
//! attached to a criteria node.
//!
//! A rule is either target-based (the question becomes a branch point whose
//! listed targets are revealed elsewhere) or precondition-based (the
//! question gains a visibility predicate referencing a sibling's answer).
//! The two shapes are a tagged union, parsed once per question.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::model::{SourceDoc, VisibilityPredicate};
use crate::traits::HierarchyFetcher;

const OPTIONS_PATH: &str = "interactions.response1.options";

/// Comparison operator of a precondition clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOp {
    Eq,
    Neq,
}

impl PredicateOp {
    /// The operator symbol the submission system expects.
    pub fn symbol(&self) -> &'static str {
        match self {
            PredicateOp::Eq => "===",
            PredicateOp::Neq => "!==",
        }
    }
}

/// A parsed branching rule for one question.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchRule {
    /// Reveal the listed target questions when this one is answered.
    Target(Vec<String>),
    /// Show this question only when a sibling's answer matches.
    PreCondition(PreCondition),
}

/// The precondition variant: a single logical-AND clause with one operator
/// over `(source reference, option index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreCondition {
    pub op: PredicateOp,
    /// Identifier of the referenced source question (`source[0]`).
    pub source: String,
    /// Option index of the referenced question; `-1` means index 0.
    pub option_index: i64,
}

impl BranchRule {
    /// Parse one rule value from the criteria node's branching map.
    ///
    /// A non-empty `target` list wins over a precondition. Returns `None`
    /// for rules matching neither shape; those leave the question unchanged.
    pub fn parse(rule: &Value) -> Option<BranchRule> {
        if let Some(targets) = rule.get("target").and_then(Value::as_array) {
            if !targets.is_empty() {
                let targets = targets
                    .iter()
                    .filter_map(|target| target.as_str().map(str::to_string))
                    .collect();
                return Some(BranchRule::Target(targets));
            }
        }

        let clause = rule
            .get("preCondition")?
            .get("and")?
            .get(0)?
            .as_object()?;
        let (operator, operands) = clause.iter().next()?;
        let op = if operator == "eq" {
            PredicateOp::Eq
        } else {
            PredicateOp::Neq
        };
        let source = rule.get("source")?.get(0)?.as_str()?.to_string();
        let option_index = operands.get(1)?.as_i64()?;

        Some(BranchRule::PreCondition(PreCondition {
            op,
            source,
            option_index,
        }))
    }

    /// Look up and parse the rule for one question, if the branching map
    /// names it.
    pub fn for_question(branching: &Map<String, Value>, identifier: &str) -> Option<BranchRule> {
        branching.get(identifier).and_then(BranchRule::parse)
    }
}

/// Apply a rule to a question document.
///
/// Precondition lookups read the page-scoped buffer first and fall back to
/// fetching the sibling directly. Lookup failures are soft: the rule is
/// skipped with a warning and the document stays unchanged.
pub async fn apply(
    rule: &BranchRule,
    doc: &mut SourceDoc,
    read_buffer: &[SourceDoc],
    siblings: &[SourceDoc],
    fetcher: &dyn HierarchyFetcher,
) {
    match rule {
        BranchRule::Target(targets) => {
            doc.set("children", json!(targets));
            let options = doc
                .value_at(OPTIONS_PATH)
                .cloned()
                .unwrap_or_else(|| json!([]));
            doc.set("options", options);
        }
        BranchRule::PreCondition(pre) => {
            let Some(source_doc) = locate_source(pre, read_buffer, siblings, fetcher).await else {
                warn!(
                    question = doc.identifier(),
                    source = %pre.source,
                    "branching source question unresolved, skipping rule"
                );
                return;
            };

            let index = if pre.option_index == -1 {
                0
            } else {
                pre.option_index.max(0) as usize
            };
            let value = source_doc
                .value_at(OPTIONS_PATH)
                .and_then(|options| options.get(index))
                .and_then(|option| option.get("value"))
                .cloned()
                .unwrap_or(Value::Null);

            let predicate = VisibilityPredicate {
                operator: pre.op.symbol().to_string(),
                value: vec![value],
                referenced_question_id: pre.source.clone(),
            };
            doc.set("visibleIf", json!([predicate]));
        }
    }
}

async fn locate_source(
    pre: &PreCondition,
    read_buffer: &[SourceDoc],
    siblings: &[SourceDoc],
    fetcher: &dyn HierarchyFetcher,
) -> Option<SourceDoc> {
    if let Some(buffered) = read_buffer
        .iter()
        .find(|question| question.identifier() == pre.source)
    {
        return Some(buffered.clone());
    }

    // The source question appears later in the page; it has not been read
    // yet, so fetch it directly.
    let sibling = siblings
        .iter()
        .find(|sibling| sibling.identifier() == pre.source)?;
    match fetcher.fetch_question(sibling.identifier()).await {
        Ok(question) => Some(question),
        Err(error) => {
            warn!(
                source = %pre.source,
                "failed to fetch branching source question: {error:#}"
            );
            None
        }
    }
}
