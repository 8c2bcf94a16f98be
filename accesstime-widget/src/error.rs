//! Errors surfaced by the widget components.

use accesstime::AccessTimeError;
use accesstime_evm::ChainError;
use accesstime_http::ProjectApiError;

/// Failure of a widget action or of loading the widget configuration.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// The action was rejected before reaching the chain.
    #[error(transparent)]
    Rejected(#[from] AccessTimeError),
    /// A chain read or transaction failed.
    #[error(transparent)]
    Chain(ChainError),
    /// The project API failed.
    #[error(transparent)]
    Api(#[from] ProjectApiError),
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`crate::config::WidgetConfig`].
    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),
    /// A configuration value is invalid.
    #[error("Invalid config: {0}")]
    Config(String),
}

impl From<ChainError> for WidgetError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::Rejected(e) => Self::Rejected(e),
            e => Self::Chain(e),
        }
    }
}

impl WidgetError {
    /// The precondition that rejected the action, if that is what failed.
    #[must_use]
    pub const fn rejection(&self) -> Option<AccessTimeError> {
        match self {
            Self::Rejected(e) => Some(*e),
            _ => None,
        }
    }
}
