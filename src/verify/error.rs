use thiserror::Error;

use crate::config::ConfigError;
use crate::mx::Error as MxError;

/// Errors raised while setting up a [`Verifier`](super::Verifier). Running a
/// verification never fails; see [`VerificationResult`](super::VerificationResult).
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mx(#[from] MxError),
}

/// Rejections of a bulk request as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    #[error("no addresses to verify")]
    Empty,
    #[error("{count} addresses exceed the bulk limit of {max}")]
    TooMany { count: usize, max: usize },
}
