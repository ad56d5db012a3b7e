use crate::storage::StorageError;
use thiserror::Error;

pub type SchemeResult<T> = std::result::Result<T, SchemeError>;

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("ambient color scheme signal is unavailable: {reason}")]
    PlatformUnsupported { reason: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Usage(String),
}

impl SchemeError {
    pub(crate) fn platform_unsupported(reason: impl Into<String>) -> Self {
        Self::PlatformUnsupported {
            reason: reason.into(),
        }
    }
}
