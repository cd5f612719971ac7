pub mod build;
pub mod show_templates;
