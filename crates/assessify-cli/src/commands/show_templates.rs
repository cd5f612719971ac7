//! The `assessify show-templates` command.

use anyhow::Result;
use comfy_table::Table;

use assessify_core::templates::{question_template, Computed, FieldRule};
use assessify_core::typing::TemplateKind;

pub fn execute(type_key: Option<String>) -> Result<()> {
    let kinds: Vec<TemplateKind> = match type_key {
        Some(key) => vec![key.parse()?],
        None => TemplateKind::ALL.to_vec(),
    };

    for kind in kinds {
        let template = question_template(kind);

        let mut table = Table::new();
        table.set_header(vec!["Field", "Rule"]);
        for field in &template.fields {
            table.add_row(vec![field.name.to_string(), describe(&field.rule)]);
        }

        println!("Type: {kind} ({} fields)", template.fields.len());
        println!("{table}");
        println!();
    }

    Ok(())
}

fn describe(rule: &FieldRule) -> String {
    match rule {
        FieldRule::Constant(value) => format!("constant {value}"),
        FieldRule::Source(path) => format!("source {path}"),
        FieldRule::Array(path) => format!("source {path} (default [])"),
        FieldRule::Computed(computed) => match computed {
            Computed::Question { body } => format!("paragraphs of {body}"),
            Computed::Validation => "validation sub-record".to_string(),
            Computed::Payload => "payload sub-record".to_string(),
            Computed::File { presence, .. } => format!("file sub-record when {presence} is set"),
            Computed::DateFormat { pattern } => format!("date pattern from {pattern}"),
            Computed::Options { path } => format!("options from {path}"),
            Computed::YesNoFlag { path } => format!("yes/no flag at {path}"),
            Computed::Passthrough { path } => format!("passthrough of {path}"),
            Computed::QuestionNumber => "1-based position on the page".to_string(),
            Computed::Page => "page label".to_string(),
        },
    }
}
