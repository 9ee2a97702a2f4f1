use thiserror::Error;

/// Reasons an input string cannot be split into a local part and a domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address has no '@'")]
    MissingAt,
    #[error("local part is empty")]
    EmptyLocalPart,
    #[error("domain is empty")]
    EmptyDomain,
    #[error("address contains a control character")]
    ControlCharacter,
}
