use super::{MxRecord, MxStatus, resolver};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

type LookupResult = Result<Vec<MxRecord>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult + Send + Sync;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + Send + Sync + 'static,
    {
        Self {
            on_lookup: Box::new(f),
        }
    }

    /// Resolver that answers every query with `records`.
    pub(crate) fn with_records(records: Vec<MxRecord>) -> Self {
        Self::new(move |_| Ok(records.clone()))
    }

    /// Resolver that fails every query.
    pub(crate) fn failing() -> Self {
        Self::new(|_| Err(ResolveErrorKind::Message("SERVFAIL").into()))
    }
}

#[test]
fn blank_domain_is_refused_before_lookup() {
    let err = resolver::ascii_domain("  ").unwrap_err();
    assert!(matches!(err, super::Error::EmptyDomain));
}

#[test]
fn duplicate_answers_collapse_in_preference_order() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![
            MxRecord::new(20, "b.mx.example.com"),
            MxRecord::new(10, "a.mx.example.com"),
            MxRecord::new(20, "b.mx.example.com"),
            MxRecord::new(10, "a.mx.example.com"),
        ])
    });

    let status = resolver::sorted_records(&stub, "example.com").expect("answer");
    assert_eq!(
        status.records(),
        &[
            MxRecord::new(10, "a.mx.example.com"),
            MxRecord::new(20, "b.mx.example.com"),
        ]
    );
}

#[test]
fn empty_answer_is_no_records() {
    let stub = StubResolver::with_records(Vec::new());
    let status = resolver::sorted_records(&stub, "example.com").expect("answer");
    assert_eq!(status, MxStatus::NoRecords);
}

#[test]
fn lookup_errors_surface_from_sorted_records() {
    let err = resolver::sorted_records(&StubResolver::failing(), "example.com").unwrap_err();
    assert!(matches!(err, super::Error::Lookup { .. }));
}

#[test]
fn exchange_name_drops_root_dot() {
    assert_eq!(resolver::exchange_name("ASPMX.L.Google.COM."), "aspmx.l.google.com");
    assert_eq!(resolver::exchange_name("."), "");
}

#[test]
fn mx_hosts_orders_by_preference() {
    let stub = StubResolver::with_records(vec![
        MxRecord::new(30, "alt2.aspmx.l.google.com"),
        MxRecord::new(1, "aspmx.l.google.com"),
        MxRecord::new(5, "alt1.aspmx.l.google.com"),
    ]);
    let hosts = resolver::mx_hosts(&stub, "example.com");
    assert_eq!(
        hosts,
        vec![
            "aspmx.l.google.com".to_string(),
            "alt1.aspmx.l.google.com".to_string(),
            "alt2.aspmx.l.google.com".to_string(),
        ]
    );
}

#[test]
fn mx_hosts_swallows_lookup_errors() {
    let hosts = resolver::mx_hosts(&StubResolver::failing(), "example.com");
    assert!(hosts.is_empty());
}

#[test]
fn mx_hosts_skips_null_mx() {
    let stub = StubResolver::with_records(vec![MxRecord::new(0, "")]);
    assert!(resolver::mx_hosts(&stub, "example.com").is_empty());
}

#[test]
fn mx_hosts_converts_idn_domains() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "xn--bcher-kva.example");
        Ok(vec![MxRecord::new(10, "mx.xn--bcher-kva.example")])
    });
    let hosts = resolver::mx_hosts(&stub, "bücher.example");
    assert_eq!(hosts, vec!["mx.xn--bcher-kva.example".to_string()]);
}

#[test]
fn mx_hosts_empty_domain_yields_nothing() {
    let stub = StubResolver::new(|_| panic!("lookup must not run for an empty domain"));
    assert!(resolver::mx_hosts(&stub, "   ").is_empty());
}

#[test]
fn unreadable_system_config_keeps_io_source() {
    use std::error::Error as _;

    let err = super::Error::system_config(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "/etc/resolv.conf missing",
    ));
    assert!(matches!(err, super::Error::SystemConfig { .. }));
    let source = err.source().expect("source");
    assert!(source.downcast_ref::<std::io::Error>().is_some());
    assert!(err.to_string().contains("resolv.conf"));
}
