//! Template Registry — declarative field-mapping tables.
//!
//! Each semantic question type maps to an ordered table of field
//! descriptors. The descriptor kinds form a closed set (`Constant`,
//! `Source`, `Array`, `Computed`) so the transformer can dispatch
//! exhaustively instead of string-matching field names.
//!
//! Paths are dotted lookups into the upstream document. The tables here are
//! pure data; all behavior lives in the transformer and matrix builder.

use serde_json::{json, Value};

use crate::typing::TemplateKind;

/// How one target field is derived from the source question document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Copy the literal value verbatim.
    Constant(Value),
    /// Read the source path; fall back to the sibling metadata, then `""`.
    Source(&'static str),
    /// Read the source path; default to an empty sequence.
    Array(&'static str),
    /// Derived by a dedicated rule in the transformer.
    Computed(Computed),
}

/// The computed field rules. Each variant carries the source paths it reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Computed {
    /// Extract `<p>…</p>` runs from the rich-text body.
    Question { body: &'static str },
    /// Build the validation sub-record from the type's [`ValidationSpec`].
    Validation,
    /// Template defaults merged with `criteriaId` and `responseType`.
    Payload,
    /// File sub-record, present only when the evidence-type list is set.
    File {
        presence: &'static str,
        kind: &'static str,
    },
    /// Date-display pattern; empty for non-date types.
    DateFormat { pattern: &'static str },
    /// Response options, defaulting to an empty sequence.
    Options { path: &'static str },
    /// Boolean from a true/"yes" flag.
    YesNoFlag { path: &'static str },
    /// Raw passthrough, defaulting to `false`.
    Passthrough { path: &'static str },
    /// String form of the 1-based sibling index.
    QuestionNumber,
    /// The page label inherited from the criteria node.
    Page,
}

impl Computed {
    /// The source path this rule reads, when it has exactly one. Used by the
    /// matrix builder, where computed rules degrade to plain source reads.
    pub fn source_path(&self) -> Option<&'static str> {
        match self {
            Computed::Question { body } => Some(body),
            Computed::File { presence, .. } => Some(presence),
            Computed::DateFormat { pattern } => Some(pattern),
            Computed::Options { path }
            | Computed::YesNoFlag { path }
            | Computed::Passthrough { path } => Some(path),
            Computed::Validation
            | Computed::Payload
            | Computed::QuestionNumber
            | Computed::Page => None,
        }
    }
}

/// One field of a question template.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub rule: FieldRule,
}

impl Field {
    fn new(name: &'static str, rule: FieldRule) -> Self {
        Self { name, rule }
    }
}

/// Source paths for the validation sub-record of one template type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSpec {
    /// Path of the required flag (true/"yes").
    pub required: &'static str,
    /// Path of the numeric-response flag; text/number types only.
    pub is_number: Option<&'static str>,
    /// Paths of the numeric bounds; slider and date types only.
    pub range: Option<RangeSpec>,
}

/// Min/max bound paths. Slider and date types read different locations.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub min: &'static str,
    pub max: &'static str,
}

/// A resolved per-type template: the ordered field table plus the
/// validation paths for this type.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionTemplate {
    pub fields: Vec<Field>,
    pub validation: ValidationSpec,
}

const REQUIRED_PATH: &str = "interactions.validation.required";
const NUMBER_FLAG_PATH: &str = "interactions.response1.type.number";
const DATE_PATTERN_PATH: &str = "interactions.response1.validation.pattern";

fn base_validation() -> ValidationSpec {
    ValidationSpec {
        required: REQUIRED_PATH,
        is_number: None,
        range: None,
    }
}

/// The base question table shared by every type. `response_type` is the
/// per-type constant; `date_format` carries the pattern rule for date
/// questions and an empty constant for everything else.
fn base_fields(response_type: &'static str, date_format: FieldRule) -> Vec<Field> {
    use FieldRule::{Array, Computed as C, Constant, Source};

    vec![
        Field::new("_id", Source("identifier")),
        Field::new("question", C(Computed::Question { body: "body" })),
        Field::new("isCompleted", Constant(json!(false))),
        Field::new(
            "showRemarks",
            C(Computed::YesNoFlag {
                path: "showRemarks",
            }),
        ),
        Field::new(
            "options",
            C(Computed::Options {
                path: "interactions.response1.options",
            }),
        ),
        Field::new("sliderOptions", Array("sliderOptions")),
        Field::new("children", Array("children")),
        Field::new("questionGroup", Constant(json!(["A1"]))),
        Field::new("fileName", Array("fileName")),
        Field::new("instanceQuestions", Array("instanceQuestions")),
        Field::new("isAGeneralQuestion", Constant(json!(false))),
        Field::new(
            "autoCapture",
            C(Computed::Passthrough {
                path: "autocapture",
            }),
        ),
        Field::new("allowAudioRecording", Constant(json!(false))),
        Field::new("prefillFromEntityProfile", Constant(json!(false))),
        Field::new("entityFieldName", Constant(json!(""))),
        Field::new("isEditable", Constant(json!(true))),
        Field::new("showQuestionInPreview", Constant(json!(false))),
        Field::new("deleted", Constant(json!(false))),
        Field::new("remarks", Constant(json!(""))),
        Field::new("value", Constant(json!(""))),
        Field::new("usedForScoring", Constant(json!(""))),
        Field::new("questionType", Constant(json!("auto"))),
        Field::new("canBeNotApplicable", Constant(json!(false))),
        Field::new("visibleIf", Source("visibleIf")),
        Field::new("validation", C(Computed::Validation)),
        Field::new(
            "file",
            C(Computed::File {
                presence: "evidence.mimeType",
                kind: "evidence.type",
            }),
        ),
        Field::new("externalId", Source("code")),
        Field::new("tip", Constant(json!(""))),
        Field::new("hint", Source("hints")),
        Field::new("responseType", Constant(json!(response_type))),
        Field::new("modeOfCollection", Constant(json!("onfield"))),
        Field::new("accessibility", Constant(json!("No"))),
        Field::new("rubricLevel", Constant(json!(""))),
        Field::new("sectionHeader", Constant(json!(""))),
        Field::new("page", C(Computed::Page)),
        Field::new("questionNumber", C(Computed::QuestionNumber)),
        Field::new("updatedAt", Source("lastUpdatedOn")),
        Field::new("createdAt", Source("createdOn")),
        Field::new("__v", Constant(json!(0))),
        Field::new("createdFromQuestionId", Constant(json!(""))),
        Field::new("evidenceMethod", Constant(json!("OB"))),
        Field::new("payload", C(Computed::Payload)),
        Field::new("startTime", Constant(json!(""))),
        Field::new("endTime", Constant(json!(""))),
        Field::new("gpsLocation", Constant(json!(""))),
        Field::new("dateFormat", date_format),
        Field::new("instanceIdentifier", Constant(json!(""))),
    ]
}

/// Default values merged into the `payload` sub-record.
pub fn payload_defaults() -> Value {
    json!({
        "evidenceMethod": "OB",
        "rubricLevel": "",
    })
}

/// Default values merged into the `file` sub-record when present.
pub fn file_defaults() -> Value {
    json!({
        "minCount": 0,
        "maxCount": 10,
        "caption": "FALSE",
    })
}

/// Resolve the template for one semantic question type.
pub fn question_template(kind: TemplateKind) -> QuestionTemplate {
    let date_format = match kind {
        TemplateKind::Date => FieldRule::Computed(Computed::DateFormat {
            pattern: DATE_PATTERN_PATH,
        }),
        _ => FieldRule::Constant(json!("")),
    };

    let validation = match kind {
        TemplateKind::Text | TemplateKind::Number => ValidationSpec {
            is_number: Some(NUMBER_FLAG_PATH),
            ..base_validation()
        },
        TemplateKind::Slider => ValidationSpec {
            range: Some(RangeSpec {
                min: "interactions.response1.validation.range.min",
                max: "interactions.response1.validation.range.max",
            }),
            ..base_validation()
        },
        TemplateKind::Date => ValidationSpec {
            range: Some(RangeSpec {
                min: "interactions.validation.min",
                max: "interactions.validation.max",
            }),
            ..base_validation()
        },
        TemplateKind::Multiselect | TemplateKind::Radio => base_validation(),
    };

    QuestionTemplate {
        fields: base_fields(kind.as_str(), date_format),
        validation,
    }
}

/// The matrix table: question-record shaped, with fixed validation and
/// response type. The matrix builder overrides `instanceIdentifier`,
/// `instanceQuestions`, `payload`, and `children` itself.
pub fn matrix_template() -> Vec<Field> {
    base_fields("matrix", FieldRule::Constant(json!("")))
        .into_iter()
        .map(|field| match field.name {
            "validation" => Field::new("validation", FieldRule::Constant(json!({"required": true}))),
            _ => field,
        })
        .collect()
}

/// How one criteria field is derived from the criteria node.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaRule {
    /// Copy the literal value verbatim.
    Constant(Value),
    /// Read the source path, defaulting to `""`.
    Source(&'static str),
    /// Read the source path; wrap an existing value in a single-element
    /// sequence, else produce an empty sequence.
    WrapSource(&'static str),
}

/// One field of the criteria table.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaField {
    pub name: &'static str,
    pub rule: CriteriaRule,
}

/// The criteria table: one flattened record per top-level criteria node.
pub fn criteria_template() -> Vec<CriteriaField> {
    use CriteriaRule::{Constant, Source, WrapSource};

    fn entry(name: &'static str, rule: CriteriaRule) -> CriteriaField {
        CriteriaField { name, rule }
    }

    vec![
        entry("_id", Source("identifier")),
        entry("__v", Constant(json!(0))),
        entry("createdAt", Source("createdOn")),
        entry("createdFor", WrapSource("channel")),
        entry("criteriaType", Constant(json!("manual"))),
        entry("description", Source("description")),
        entry("externalId", Source("code")),
        entry("flag", Constant(json!(""))),
        entry("frameworkCriteriaId", Source("identifier")),
        entry("name", Source("name")),
        entry("owner", Source("consumerId")),
        entry("remarks", Constant(json!(""))),
        entry("score", Constant(json!(""))),
        entry("showRemarks", Source("showRemarks")),
        entry("timesUsed", Constant(json!(""))),
        entry("updatedAt", Source("lastUpdatedOn")),
        entry("weightage", Constant(json!(""))),
        entry("referenceQuestionSetId", Source("identifier")),
        entry("rubric", Constant(json!({}))),
    ]
}
