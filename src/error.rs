/// Errors raised while parsing and compiling URL patterns
use thiserror::Error;

/// A malformed URL pattern or host template.
///
/// These are programming errors in the service table. The resolver skips the
/// offending service and keeps the rest usable.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unbalanced group: unclosed '(' at offset {offset} in {pattern:?}")]
    UnclosedGroup { pattern: String, offset: usize },

    #[error("unbalanced group: unexpected ')' at offset {offset} in {pattern:?}")]
    UnexpectedGroupEnd { pattern: String, offset: usize },

    #[error("dangling escape at end of {pattern:?}")]
    DanglingEscape { pattern: String },

    #[error("capture {name:?} appears more than once in {pattern:?}")]
    DuplicateCapture { pattern: String, name: String },

    #[error("host template {template:?} may only contain literals and captures")]
    InvalidHost { template: String },

    #[error("pattern {pattern:?} failed to compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
