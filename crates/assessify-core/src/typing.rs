//! Template-Type Resolver — maps a question's category metadata to a
//! template key.

use std::fmt;
use std::str::FromStr;

use crate::error::TransformError;
use crate::model::SourceDoc;

const NUMBER_FLAG_PATH: &str = "interactions.response1.type.number";
const CARDINALITY_PATH: &str = "responseDeclaration.response1.cardinality";

/// The closed set of template keys the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Text,
    Number,
    Slider,
    Date,
    Multiselect,
    Radio,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::Text,
        TemplateKind::Number,
        TemplateKind::Slider,
        TemplateKind::Date,
        TemplateKind::Multiselect,
        TemplateKind::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Text => "text",
            TemplateKind::Number => "number",
            TemplateKind::Slider => "slider",
            TemplateKind::Date => "date",
            TemplateKind::Multiselect => "multiselect",
            TemplateKind::Radio => "radio",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(TemplateKind::Text),
            "number" => Ok(TemplateKind::Number),
            "slider" => Ok(TemplateKind::Slider),
            "date" => Ok(TemplateKind::Date),
            "multiselect" => Ok(TemplateKind::Multiselect),
            "radio" => Ok(TemplateKind::Radio),
            other => Err(TransformError::UnknownTemplate(other.to_string())),
        }
    }
}

/// Resolve the template key for one question document.
///
/// "text" questions split into text/number on the numeric-response flag;
/// multiselect multiple-choice questions split into radio/multiselect on
/// response cardinality. Any other category is lower-cased and must name a
/// registered template directly.
pub fn resolve(doc: &SourceDoc) -> Result<TemplateKind, TransformError> {
    let category = doc
        .str_at("primaryCategory")
        .unwrap_or_default()
        .to_lowercase();

    match category.as_str() {
        "text" => {
            let numeric = doc
                .str_at(NUMBER_FLAG_PATH)
                .is_some_and(|flag| flag.eq_ignore_ascii_case("yes"));
            Ok(if numeric {
                TemplateKind::Number
            } else {
                TemplateKind::Text
            })
        }
        "multiselect multiple choice question" => {
            let single = doc
                .str_at(CARDINALITY_PATH)
                .is_some_and(|cardinality| cardinality.eq_ignore_ascii_case("single"));
            Ok(if single {
                TemplateKind::Radio
            } else {
                TemplateKind::Multiselect
            })
        }
        other => other.parse(),
    }
}
