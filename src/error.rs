//! Error taxonomy shared by all modules.
//!
//! Every fatal condition names the failing invariant and the offending entity
//! (state index, vector entry, line, path). Partial results are never returned
//! as if complete: structural, unsupported and duplicate errors abort the whole
//! operation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Lengths or shapes that must agree do not: vector vs. network size,
    /// local state vs. declared parameters, malformed text input.
    #[error("structural mismatch in {context}: {message}")]
    StructuralMismatch { context: String, message: String },

    /// A construct the algorithms are not defined for, e.g. a multi-action
    /// with more than one action.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Non-unique equation, parameter or variable names.
    #[error("duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error("I/O failure on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error surfaced by a collaborator (component generator, loader)
    /// during exploration.
    #[error("fatal error in {context}: {source}")]
    Fatal {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// A data expression could not be evaluated to a value.
    #[error("evaluation failure: {0}")]
    Evaluation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn mismatch(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::StructuralMismatch {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedConstruct(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Error::DuplicateDefinition(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps `self` as a fatal collaborator error. Already fatal errors are
    /// not wrapped twice.
    pub fn fatal(self, context: impl Into<String>) -> Self {
        match self {
            Error::Fatal { .. } => self,
            other => Error::Fatal {
                context: context.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, looking through `Fatal` wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Fatal { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_wraps_once() {
        let e = Error::unsupported("multi-action a|b").fatal("component 1");
        let e = e.fatal("state 3");
        match &e {
            Error::Fatal { context, .. } => assert_eq!(context, "component 1"),
            _ => panic!("expected fatal error"),
        }
        assert!(matches!(e.root(), Error::UnsupportedConstruct(_)));
    }

    #[test]
    fn test_display_names_entity() {
        let e = Error::mismatch("vector line 4", "expected 2 tags, found 3");
        assert_eq!(
            e.to_string(),
            "structural mismatch in vector line 4: expected 2 tags, found 3"
        );
    }
}
