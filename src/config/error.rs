use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite, non-negative number of seconds (got {value})")]
    InvalidSeconds { name: &'static str, value: f64 },
    #[error("{name} must be a finite, non-negative number of milliseconds (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("{name} must be greater than zero")]
    ZeroTimeout { name: &'static str },
    #[error("maximum bulk size must be at least 1")]
    ZeroBulk,
    #[error("fallback sender '{0}' is not an address")]
    InvalidSender(String),
}
