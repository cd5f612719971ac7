//! Matrix Builder — wraps a page's transformed questions into a single
//! repeatable-instance record.
//!
//! The matrix record is question-record shaped and evaluated against the
//! criteria node itself. Computed rules that would read the question
//! document degrade to plain source reads here; the instance fields,
//! payload, and children are overridden by name.

use serde_json::{json, Map, Value};

use crate::model::{MatrixRecord, QuestionRecord, SourceDoc};
use crate::templates::{self, FieldRule};
use crate::transform::build_payload;

/// Build the matrix record for a criteria node marked with
/// `instances.label`, embedding the already-transformed page questions.
pub fn build_matrix_record(criteria: &SourceDoc, page_questions: Vec<QuestionRecord>) -> MatrixRecord {
    let mut record = Map::new();
    for field in templates::matrix_template() {
        let value = match field.name {
            "instanceIdentifier" => json!(criteria.instance_label().unwrap_or_default()),
            "instanceQuestions" => {
                Value::Array(page_questions.iter().cloned().map(Value::Object).collect())
            }
            "payload" => build_payload(criteria.identifier(), "matrix"),
            // Branch targets never apply to the wrapper itself.
            "children" => json!([]),
            _ => match &field.rule {
                FieldRule::Constant(value) => value.clone(),
                FieldRule::Source(path) => {
                    criteria.value_at(path).cloned().unwrap_or_else(|| json!(""))
                }
                FieldRule::Array(path) => {
                    criteria.value_at(path).cloned().unwrap_or_else(|| json!([]))
                }
                FieldRule::Computed(computed) => computed
                    .source_path()
                    .and_then(|path| criteria.value_at(path))
                    .cloned()
                    .unwrap_or_else(|| json!("")),
            },
        };
        record.insert(field.name.to_string(), value);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> SourceDoc {
        serde_json::from_value(json!({
            "identifier": "c1",
            "code": "C1_CODE",
            "name": "Comments and Reflection",
            "instances": {"label": "Group1"},
            "children": [{"identifier": "q1"}]
        }))
        .unwrap()
    }

    fn question(id: &str) -> QuestionRecord {
        let mut record = Map::new();
        record.insert("_id".to_string(), json!(id));
        record
    }

    #[test]
    fn matrix_record_has_fixed_shape() {
        let record = build_matrix_record(&criteria(), vec![question("q1"), question("q2")]);
        assert_eq!(record["responseType"], json!("matrix"));
        assert_eq!(record["validation"], json!({"required": true}));
        assert_eq!(record["instanceIdentifier"], json!("Group1"));
        assert_eq!(record["payload"]["criteriaId"], json!("c1"));
        assert_eq!(record["payload"]["responseType"], json!("matrix"));
        assert_eq!(record["children"], json!([]));
    }

    #[test]
    fn instance_questions_keep_page_order() {
        let record = build_matrix_record(&criteria(), vec![question("q1"), question("q2")]);
        let instances = record["instanceQuestions"].as_array().unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0]["_id"], json!("q1"));
        assert_eq!(instances[1]["_id"], json!("q2"));
    }

    #[test]
    fn plain_fields_read_from_the_criteria_node() {
        let record = build_matrix_record(&criteria(), Vec::new());
        assert_eq!(record["externalId"], json!("C1_CODE"));
        assert_eq!(record["_id"], json!("c1"));
        // Computed rules degrade to source reads against the criteria.
        assert_eq!(record["question"], json!(""));
    }
}
