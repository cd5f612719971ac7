//! assessify-core — Question-set to assessment-evidence transformation engine.
//!
//! This crate turns a hierarchical question-set document (fetched from an
//! external content service) into the normalized evidence structure the
//! submission system consumes, applying branching rules, per-type field
//! templates, and matrix (repeatable-instance) handling along the way.

pub mod branching;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod matrix;
pub mod model;
pub mod templates;
pub mod traits;
pub mod transform;
pub mod typing;
