//! Question Transformer — maps one source question document into a target
//! question record through the template registry.
//!
//! Every field of the resolved type's template is evaluated independently:
//! later fields never depend on earlier fields' output, only on the
//! already-resolved type and the source document.

use serde_json::{json, Map, Value};

use crate::error::TransformError;
use crate::model::{QuestionRecord, SourceDoc};
use crate::templates::{self, Computed, FieldRule, ValidationSpec};
use crate::typing::{self, TemplateKind};

/// Transform one question document into a question record.
///
/// `sibling` is the question's entry in its parent's `children` list, used
/// as the fallback source for plain path fields. `index` is the 0-based
/// position within that list; `page` is the parent criteria's page label.
pub fn transform_question(
    doc: &SourceDoc,
    sibling: &SourceDoc,
    index: usize,
    page: &str,
) -> Result<QuestionRecord, TransformError> {
    let kind = typing::resolve(doc)?;
    let template = templates::question_template(kind);

    let mut record = Map::new();
    for field in &template.fields {
        let value = match &field.rule {
            FieldRule::Constant(value) => value.clone(),
            FieldRule::Source(path) => doc
                .value_at(path)
                .or_else(|| sibling.value_at(path))
                .cloned()
                .unwrap_or_else(|| json!("")),
            FieldRule::Array(path) => doc.value_at(path).cloned().unwrap_or_else(|| json!([])),
            FieldRule::Computed(computed) => {
                computed_value(computed, doc, &template.validation, kind, index, page)
            }
        };
        record.insert(field.name.to_string(), value);
    }
    Ok(record)
}

fn computed_value(
    computed: &Computed,
    doc: &SourceDoc,
    validation: &ValidationSpec,
    kind: TemplateKind,
    index: usize,
    page: &str,
) -> Value {
    match computed {
        Computed::Question { body } => {
            json!(extract_paragraphs(doc.str_at(body).unwrap_or_default()))
        }
        Computed::Validation => build_validation(validation, doc),
        Computed::Payload => build_payload(doc.identifier(), kind.as_str()),
        Computed::File { presence, kind } => build_file(doc, presence, kind),
        Computed::DateFormat { pattern } => {
            doc.value_at(pattern).cloned().unwrap_or_else(|| json!(""))
        }
        Computed::Options { path } => doc.value_at(path).cloned().unwrap_or_else(|| json!([])),
        Computed::YesNoFlag { path } => json!(is_yes(doc.value_at(path))),
        Computed::Passthrough { path } => {
            doc.value_at(path).cloned().unwrap_or(Value::Bool(false))
        }
        Computed::QuestionNumber => json!((index + 1).to_string()),
        Computed::Page => json!(page),
    }
}

/// Extract the ordered `<p>…</p>` text runs from a rich-text body.
///
/// Scans for each literal `<p>` marker, takes text up to the next `</p>`,
/// and strips the first `&nbsp` from each run. A final unterminated run is
/// taken whole.
pub fn extract_paragraphs(body: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("<p>") {
        let after = &rest[start + 3..];
        match after.find("</p>") {
            Some(end) => {
                runs.push(after[..end].replacen("&nbsp", "", 1));
                rest = &after[end..];
            }
            None => {
                runs.push(after.replacen("&nbsp", "", 1));
                break;
            }
        }
    }
    runs
}

/// True when a flag value is boolean `true` or a case-insensitive `"yes"`.
pub(crate) fn is_yes(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag.eq_ignore_ascii_case("yes"),
        _ => false,
    }
}

fn build_validation(spec: &ValidationSpec, doc: &SourceDoc) -> Value {
    let mut validation = Map::new();
    validation.insert("required".to_string(), json!(is_yes(doc.value_at(spec.required))));

    if let Some(path) = spec.is_number {
        let numeric = doc
            .str_at(path)
            .is_some_and(|flag| flag.eq_ignore_ascii_case("yes"));
        validation.insert("IsNumber".to_string(), json!(numeric));
    }

    if let Some(range) = &spec.range {
        if let Some(min) = doc.value_at(range.min) {
            validation.insert("min".to_string(), min.clone());
        }
        if let Some(max) = doc.value_at(range.max) {
            validation.insert("max".to_string(), max.clone());
        }
    }

    Value::Object(validation)
}

pub(crate) fn build_payload(criteria_id: &str, response_type: &str) -> Value {
    let mut payload = match templates::payload_defaults() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    payload.insert("criteriaId".to_string(), json!(criteria_id));
    payload.insert("responseType".to_string(), json!(response_type));
    Value::Object(payload)
}

fn build_file(doc: &SourceDoc, presence: &str, kind: &str) -> Value {
    let present = match doc.value_at(presence) {
        Some(Value::Array(list)) => !list.is_empty(),
        Some(Value::String(value)) => !value.is_empty(),
        _ => false,
    };
    if !present {
        return json!("");
    }

    let mut file = match templates::file_defaults() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let required = is_yes(doc.value_at("interactions.validation.required"));
    file.insert(
        "required".to_string(),
        json!(if required { "Yes" } else { "No" }),
    );
    file.insert(
        "type".to_string(),
        doc.value_at(kind).cloned().unwrap_or_else(|| json!("")),
    );
    Value::Object(file)
}
