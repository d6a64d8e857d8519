use thiserror::Error;

/// Errors that can occur while resolving an `aws:` reference.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid AWS format for variable {reference}")]
    Format { reference: String },

    #[error("Cannot parse AWS type from {rest}")]
    UnknownService { rest: String },

    #[error("Unsupported EC2 value. {kind}")]
    UnsupportedSubKind { kind: String },

    #[error("invalid {service} key '{key}': {reason}")]
    InvalidKey {
        service: &'static str,
        key: String,
        reason: &'static str,
    },

    #[error("Could not find {what} with name {key}")]
    NotFound { what: &'static str, key: String },

    #[error("Expected exactly one DB instance for key {key}. Got {count}")]
    Ambiguous { key: String, count: usize },

    #[error("Error resolving {reference}. Key '{property}' not found. Candidates are {}", .candidates.join(","))]
    Extraction {
        reference: String,
        property: String,
        candidates: Vec<String>,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ResolveError {
    /// Whether non-strict mode may turn this error into a `null` result.
    ///
    /// Only lookup failures degrade: the object is missing, or the provider
    /// call itself failed. Malformed references, multiplicity violations and
    /// missing properties always abort.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Transport(_))
    }
}

/// Convenience alias for results using `ResolveError`.
pub type Result<T> = std::result::Result<T, ResolveError>;
