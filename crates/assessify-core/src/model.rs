//! Data model for source documents and produced evidence records.
//!
//! Upstream question-set and question documents are loosely structured JSON
//! owned by the content service; we never validate them beyond defensive
//! field access. `SourceDoc` wraps such a document and offers dotted-path
//! lookups. The produced side (`EvidenceData` and friends) is typed, since
//! its shape is our contract with the submission system.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A flattened submission-facing record derived from one criteria node.
pub type CriteriaRecord = Map<String, Value>;

/// A fully transformed leaf question, keyed by template field name.
pub type QuestionRecord = Map<String, Value>;

/// A question-record-shaped wrapper for a repeatable-instance group.
pub type MatrixRecord = Map<String, Value>;

/// A source document (question-set node or question), as received upstream.
///
/// Field access is defensive throughout: a missing or differently shaped
/// field reads as absent, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDoc(pub Map<String, Value>);

impl SourceDoc {
    /// The document's `identifier`, or `""` when absent.
    pub fn identifier(&self) -> &str {
        self.str_at("identifier").unwrap_or("")
    }

    /// Look up a value by dotted path, e.g. `interactions.response1.options`.
    pub fn value_at(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Look up a string value by dotted path.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.value_at(path)?.as_str()
    }

    /// Set a top-level field, replacing any existing value.
    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// The node's `children` as source documents, in source order.
    ///
    /// Children may arrive as embedded node objects or as bare identifier
    /// strings; a bare identifier becomes a document with only `identifier`.
    pub fn children(&self) -> Vec<SourceDoc> {
        let Some(items) = self.0.get("children").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| match item {
                Value::Object(map) => SourceDoc(map.clone()),
                Value::String(id) => {
                    let mut map = Map::new();
                    map.insert("identifier".to_string(), json!(id));
                    SourceDoc(map)
                }
                _ => SourceDoc::default(),
            })
            .collect()
    }

    /// The repeatable-instance label (`instances.label`), if this node is a
    /// matrix group.
    pub fn instance_label(&self) -> Option<&str> {
        self.str_at("instances.label").filter(|label| !label.is_empty())
    }
}

/// The question-set hierarchy returned by the Hierarchy Fetcher: a
/// description plus the ordered top-level criteria nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionSetHierarchy {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub children: Vec<SourceDoc>,
}

/// Metadata of the solution the evidence is being built for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionInfo {
    /// Solution type, e.g. "observation" or "survey"; used to title the
    /// produced evidence method and its section.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A conditional-visibility predicate attached to a question record by the
/// branching resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityPredicate {
    /// `"==="` or `"!=="`.
    pub operator: String,
    /// Single-element sequence holding the referenced option's value.
    pub value: Vec<Value>,
    /// Identifier of the question whose answer controls visibility.
    pub referenced_question_id: String,
}

/// The page questions of one evidence section: either a flat ordered list or
/// a single matrix record wrapping the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageQuestions {
    Flat(Vec<QuestionRecord>),
    Matrix(Box<MatrixRecord>),
}

impl Default for PageQuestions {
    fn default() -> Self {
        PageQuestions::Flat(Vec::new())
    }
}

/// One evidence-section entry: the rendered page questions under one
/// criteria node. Only criteria with at least one child question get one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSection {
    pub code: String,
    pub name: String,
    pub page: String,
    pub page_questions: PageQuestions,
}

/// Grouping of page sections inside an evidence method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSectionGroup {
    pub code: String,
    pub name: String,
    pub questions: Vec<PageSection>,
}

/// One evidence method of the produced artifact. A build yields exactly one,
/// carrying all page sections under a single section group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceMethod {
    pub code: String,
    pub external_id: String,
    pub name: String,
    pub description: String,
    pub sections: Vec<EvidenceSectionGroup>,
    pub tip: Option<String>,
    pub mode_of_collection: String,
    pub can_be_not_applicable: bool,
    pub not_applicable: bool,
    pub can_be_not_allowed: bool,
    pub remarks: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub is_submitted: bool,
    pub submissions: Vec<Value>,
}

/// The complete produced artifact. This exact structure is what gets
/// serialized into the cache, so a warm-cache call round-trips to an equal
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceData {
    pub evidence_sections: Vec<PageSection>,
    pub submission_document_criterias: Vec<CriteriaRecord>,
    pub evidences: Vec<EvidenceMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> SourceDoc {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn dotted_path_lookup() {
        let doc = doc(json!({
            "identifier": "q1",
            "interactions": {"response1": {"options": [{"value": "R1"}]}}
        }));
        assert_eq!(doc.identifier(), "q1");
        assert!(doc.value_at("interactions.response1.options").is_some());
        assert!(doc.value_at("interactions.response2.options").is_none());
        assert!(doc.value_at("missing").is_none());
    }

    #[test]
    fn str_at_rejects_non_strings() {
        let doc = doc(json!({"count": 3, "name": "criteria"}));
        assert_eq!(doc.str_at("name"), Some("criteria"));
        assert_eq!(doc.str_at("count"), None);
    }

    #[test]
    fn children_accepts_objects_and_identifiers() {
        let doc = doc(json!({
            "children": [{"identifier": "q1", "code": "C1"}, "q2"]
        }));
        let children = doc.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].identifier(), "q1");
        assert_eq!(children[0].str_at("code"), Some("C1"));
        assert_eq!(children[1].identifier(), "q2");
    }

    #[test]
    fn instance_label_requires_non_empty() {
        let matrix = doc(json!({"instances": {"label": "Group1"}}));
        assert_eq!(matrix.instance_label(), Some("Group1"));

        let empty = doc(json!({"instances": {"label": ""}}));
        assert_eq!(empty.instance_label(), None);
        assert_eq!(SourceDoc::default().instance_label(), None);
    }

    #[test]
    fn page_questions_serialization_shape() {
        let flat = PageQuestions::Flat(vec![Map::new()]);
        assert!(serde_json::to_value(&flat).unwrap().is_array());

        let matrix = PageQuestions::Matrix(Box::default());
        assert!(serde_json::to_value(&matrix).unwrap().is_object());

        let parsed: PageQuestions = serde_json::from_value(json!([{}, {}])).unwrap();
        assert!(matches!(parsed, PageQuestions::Flat(ref list) if list.len() == 2));
    }

    #[test]
    fn evidence_data_serde_roundtrip() {
        let data = EvidenceData {
            evidence_sections: vec![PageSection {
                code: "C1".into(),
                name: "Criteria one".into(),
                page: "p1".into(),
                page_questions: PageQuestions::default(),
            }],
            submission_document_criterias: vec![Map::new()],
            evidences: vec![EvidenceMethod {
                code: "SF".into(),
                external_id: "SF".into(),
                name: "Observation".into(),
                ..Default::default()
            }],
        };
        let serialized = serde_json::to_string(&data).unwrap();
        assert!(serialized.contains("evidenceSections"));
        assert!(serialized.contains("submissionDocumentCriterias"));
        assert!(serialized.contains("externalId"));
        let back: EvidenceData = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, data);
    }
}
