//! Domain error types.

/// Top-level error type for barsim.
#[derive(Debug, thiserror::Error)]
pub enum BarsimError {
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("invalid feed: {reason}")]
    Feed { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("strategy error: {reason}")]
    Strategy { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BarsimError> for std::process::ExitCode {
    fn from(err: &BarsimError) -> Self {
        let code: u8 = match err {
            BarsimError::Io(_) => 1,
            BarsimError::ConfigParse { .. }
            | BarsimError::ConfigMissing { .. }
            | BarsimError::ConfigInvalid { .. } => 2,
            BarsimError::Data { .. } | BarsimError::Feed { .. } => 3,
            BarsimError::InvalidOrder { .. } => 4,
            BarsimError::Strategy { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
