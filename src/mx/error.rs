use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("no domain to look up")]
    EmptyDomain,
    #[error("cannot encode domain as ASCII (IDNA)")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("cannot read system DNS configuration: {source}")]
    SystemConfig {
        #[source]
        source: std::io::Error,
    },
    #[error("cannot start DNS resolver: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX query failed: {source}")]
    Lookup {
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn system_config(source: std::io::Error) -> Self {
        Self::SystemConfig { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(source: ResolveError) -> Self {
        Self::Lookup { source }
    }
}
