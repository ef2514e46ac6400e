//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for bandtrader.
#[derive(Debug, thiserror::Error)]
pub enum BandtraderError {
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

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("bar {index} at {current} does not follow previous bar at {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("bar at {timestamp} has undefined indicator {field}")]
    MissingIndicator {
        timestamp: NaiveDateTime,
        field: &'static str,
    },

    #[error("bar at {timestamp} has invalid {field} price")]
    InvalidPrice {
        timestamp: NaiveDateTime,
        field: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BandtraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BandtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data(reason: impl Into<String>) -> Self {
        BandtraderError::DataSource {
            reason: reason.into(),
        }
    }

    /// True for errors raised because the bar sequence broke the engine's
    /// input contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            BandtraderError::NonMonotonicTimestamp { .. }
                | BandtraderError::MissingIndicator { .. }
                | BandtraderError::InvalidPrice { .. }
        )
    }
}

impl From<&BandtraderError> for std::process::ExitCode {
    fn from(err: &BandtraderError) -> Self {
        let code: u8 = match err {
            BandtraderError::Io(_) => 1,
            BandtraderError::ConfigParse { .. }
            | BandtraderError::ConfigMissing { .. }
            | BandtraderError::ConfigInvalid { .. } => 2,
            BandtraderError::DataSource { .. } => 3,
            BandtraderError::NonMonotonicTimestamp { .. }
            | BandtraderError::MissingIndicator { .. }
            | BandtraderError::InvalidPrice { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
