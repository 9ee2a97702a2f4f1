//! Minimal address parsing: just enough to find the domain to probe.

mod error;

pub use error::AddressError;

/// A bare mailbox and its lowercase domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// The address as it goes into `RCPT TO:<...>`.
    pub mailbox: String,
    pub domain: String,
}

/// Splits `raw` into mailbox and domain.
///
/// Accepts either a bare address or the `Display Name <addr>` form. The split
/// happens on the last `@`, so quoted local parts containing `@` keep working.
pub fn parse(raw: &str) -> Result<ParsedAddress, AddressError> {
    let mailbox = strip_display_name(raw.trim());
    if mailbox.chars().any(char::is_control) {
        return Err(AddressError::ControlCharacter);
    }
    let (local, domain) = mailbox.rsplit_once('@').ok_or(AddressError::MissingAt)?;
    if local.trim().is_empty() {
        return Err(AddressError::EmptyLocalPart);
    }
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(AddressError::EmptyDomain);
    }
    Ok(ParsedAddress {
        mailbox: mailbox.to_string(),
        domain: domain.to_lowercase(),
    })
}

/// Extracts the lowercase domain from `raw`.
pub fn parse_domain(raw: &str) -> Result<String, AddressError> {
    parse(raw).map(|parsed| parsed.domain)
}

fn strip_display_name(input: &str) -> &str {
    match (input.rfind('<'), input.ends_with('>')) {
        (Some(start), true) => input[start + 1..input.len() - 1].trim(),
        _ => input,
    }
}
