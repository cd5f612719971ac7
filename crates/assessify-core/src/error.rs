//! Engine and transformation error types.
//!
//! Cache failures never surface here: the engine treats them as a miss or a
//! skipped write. These errors cover the two fatal paths — hierarchy fetch
//! failure and a per-question failure inside a page.

use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the evidence engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The question-set hierarchy could not be fetched. Fatal for the whole
    /// invocation.
    #[error("failed to read question set hierarchy for '{reference_id}': {source}")]
    Hierarchy {
        reference_id: String,
        #[source]
        source: BoxedError,
    },

    /// A question inside a page failed to fetch or transform. Aborts the
    /// remaining siblings of that page.
    #[error("error processing child at index {index}: {source}")]
    PageQuestion {
        index: usize,
        #[source]
        source: BoxedError,
    },
}

impl EngineError {
    pub fn hierarchy(reference_id: &str, source: anyhow::Error) -> Self {
        EngineError::Hierarchy {
            reference_id: reference_id.to_string(),
            source: source.into(),
        }
    }

    pub fn page_question(index: usize, source: anyhow::Error) -> Self {
        EngineError::PageQuestion {
            index,
            source: source.into(),
        }
    }
}

/// Errors produced while transforming a single question document.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The resolved category names no registered template.
    #[error("no question template registered for category '{0}'")]
    UnknownTemplate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_question_error_names_the_index() {
        let err = EngineError::page_question(3, anyhow::anyhow!("boom"));
        assert_eq!(
            err.to_string(),
            "error processing child at index 3: boom"
        );
    }

    #[test]
    fn hierarchy_error_names_the_reference() {
        let err = EngineError::hierarchy("do_123", anyhow::anyhow!("upstream down"));
        assert!(err.to_string().contains("do_123"));
    }
}
