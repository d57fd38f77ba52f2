/// How a pipeline failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The artifacts are unusable; no predictions are possible.
    Fatal,
    /// The request was incomplete or malformed and can be resubmitted.
    Input,
    /// The classifier produced output outside the known label space, or was
    /// handed a row it cannot score.
    Invariant,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Artifact load failure: {0}")]
    ArtifactLoad(String),
    #[error("Schema mismatch: required field `{field}` is absent")]
    SchemaMismatch { field: String },
    #[error("Invalid numeric value for `{field}`: {value:?}")]
    InvalidNumericValue { field: String, value: String },
    #[error("Unknown class index {index} returned by classifier")]
    UnknownClassIndex { index: usize },
    #[error("Classifier returned {actual} probabilities, expected {expected}")]
    ClassCountMismatch { expected: usize, actual: usize },
    #[error("Classifier returned invalid probabilities {probabilities:?}")]
    InvalidProbabilities { probabilities: Vec<f64> },
    #[error("Prepared row has {actual} values, schema expects {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}

impl PipelineError {
    pub(crate) fn artifact(message: impl Into<String>) -> Self {
        PipelineError::ArtifactLoad(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::ArtifactLoad(_) => ErrorCategory::Fatal,
            PipelineError::SchemaMismatch { .. } | PipelineError::InvalidNumericValue { .. } => {
                ErrorCategory::Input
            }
            PipelineError::UnknownClassIndex { .. }
            | PipelineError::ClassCountMismatch { .. }
            | PipelineError::InvalidProbabilities { .. }
            | PipelineError::FeatureCountMismatch { .. } => ErrorCategory::Invariant,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ArtifactLoad(_) => "artifact_load_failure",
            PipelineError::SchemaMismatch { .. } => "schema_mismatch",
            PipelineError::InvalidNumericValue { .. } => "invalid_numeric_value",
            PipelineError::UnknownClassIndex { .. } => "unknown_class_index",
            PipelineError::ClassCountMismatch { .. } => "class_count_mismatch",
            PipelineError::InvalidProbabilities { .. } => "invalid_probabilities",
            PipelineError::FeatureCountMismatch { .. } => "feature_count_mismatch",
        }
    }
}
