use thiserror::Error;

/// Errors raised while assembling a trait heatmap.
///
/// Absence of data (no loci on a chromosome, no marker near a trait) is never
/// an error; it shows up as placeholders in the results instead.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// Export mode other than `val`, `var`, `N` or `all`
    #[error("Type `{0}` is incorrect")]
    InvalidFieldMode(String),

    /// A merge tree node that is neither a leaf nor a pair of subtrees
    #[error("Malformed merge tree: {0}")]
    MalformedMergeTree(String),

    /// Malformed tabular input
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Request that cannot be processed, e.g. no traits
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure reported by a collaborator, passed through unchanged
    #[error("{0}")]
    Collaborator(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HeatmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = HeatmapError::InvalidFieldMode("foo".to_string());
        assert_eq!(err.to_string(), "Type `foo` is incorrect");

        let err = HeatmapError::Parse {
            line: 3,
            message: "missing column `LRS`".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error at line 3: missing column `LRS`");
    }
}
