use std::time::Duration;

use trust_dns_resolver::{Resolver, error::ResolveError, system_conf};

use super::{Error, MxRecord, MxStatus};

/// MX records of `domain` from the system resolver, most preferred first.
/// Unlike [`mx_hosts`], resolution errors are returned to the caller.
pub fn check_mx(domain: &str, timeout: Duration) -> Result<MxStatus, Error> {
    let ascii = ascii_domain(domain)?;
    let resolver = build_resolver(timeout)?;
    sorted_records(&resolver, &ascii)
}

/// Builds a resolver from the system configuration with a single attempt per
/// query, so `timeout` bounds each lookup.
pub fn build_resolver(timeout: Duration) -> Result<Resolver, Error> {
    let (config, mut opts) = system_conf::read_system_conf().map_err(Error::system_config)?;
    opts.timeout = timeout;
    opts.attempts = 1;
    Resolver::new(config, opts).map_err(Error::resolver_init)
}

/// Mail exchangers for `domain`, most preferred first.
///
/// Never fails: NXDOMAIN, timeouts, SERVFAIL and empty answers all come back
/// as an empty list.
pub fn mx_hosts<R>(resolver: &R, domain: &str) -> Vec<String>
where
    R: LookupMx + ?Sized,
{
    match ascii_domain(domain).and_then(|ascii| sorted_records(resolver, &ascii)) {
        Ok(status) => {
            let hosts = status.hosts();
            tracing::debug!(domain, hosts = ?hosts, "resolved mail exchangers");
            hosts
        }
        Err(err) => {
            tracing::debug!(domain, error = %err, "MX resolution failed");
            Vec::new()
        }
    }
}

pub(crate) fn sorted_records<R>(resolver: &R, ascii: &str) -> Result<MxStatus, Error>
where
    R: LookupMx + ?Sized,
{
    let mut found = resolver.lookup_mx(ascii).map_err(Error::lookup)?;
    found.sort();
    found.dedup();
    Ok(match found.is_empty() {
        true => MxStatus::NoRecords,
        false => MxStatus::Records(found),
    })
}

/// Trimmed, IDNA-encoded form of `domain`.
pub(crate) fn ascii_domain(domain: &str) -> Result<String, Error> {
    match domain.trim() {
        "" => Err(Error::EmptyDomain),
        name => idna::domain_to_ascii(name).map_err(Error::idna),
    }
}

/// Exchange name without the root dot, lowercased.
pub(crate) fn exchange_name(raw: &str) -> String {
    raw.trim_end_matches('.').to_ascii_lowercase()
}

/// Source of MX answers. Implemented for the trust-dns [`Resolver`]; tests
/// plug in a stub.
pub trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let answer = self.mx_lookup(domain)?;
        Ok(answer
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), exchange_name(&mx.exchange().to_utf8())))
            .collect())
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (self.on_lookup)(domain)
    }
}
