//! The verification procedure: parse, resolve, open one SMTP session, then
//! run up to three recipient checks and decide.
//!
//! 1. `RCPT` the target. Refused means invalid.
//! 2. `RCPT` a random impostor at the same domain. Refused means the domain
//!    is not catch-all, so the target is valid.
//! 3. Otherwise `RCPT` a second impostor and compare the target's mean
//!    latency with the impostors' mean. A gap at or above the provider's
//!    threshold means valid; anything smaller means invalid. Both outcomes
//!    are flagged catch-all.

mod bulk;
mod error;
mod types;

pub use error::{BulkError, VerifyError};
pub use types::{Deliverability, FailureKind, Validity, VerificationResult};

use std::thread;

use trust_dns_resolver::Resolver;

use crate::address;
use crate::config::VerifierConfig;
use crate::mx::{self, LookupMx, MxBrand};
use crate::probe::{
    ProbeError, ProbeSession, RecipientProbe, SessionOptions, impostor_address,
};

/// Opens the SMTP session a verification runs on.
pub trait OpenSession {
    type Session: RecipientProbe;

    fn open(&self, host: &str, options: &SessionOptions) -> Result<Self::Session, ProbeError>;

    /// Tears the session down once the verification is over.
    fn close(&self, session: Self::Session);
}

/// Plain TCP sessions on the configured port.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl OpenSession for TcpConnector {
    type Session = ProbeSession;

    fn open(&self, host: &str, options: &SessionOptions) -> Result<ProbeSession, ProbeError> {
        ProbeSession::open(host, options)
    }

    fn close(&self, session: ProbeSession) {
        session.close();
    }
}

/// Runs verifications against live DNS and SMTP. Holds no per-verification
/// state, so one instance can be shared across threads.
pub struct Verifier<R = Resolver, C = TcpConnector> {
    config: VerifierConfig,
    session_options: SessionOptions,
    resolver: R,
    connector: C,
}

impl Verifier {
    /// Validates `config` and builds a system resolver bounded by its DNS
    /// timeout.
    pub fn new(config: VerifierConfig) -> Result<Self, VerifyError> {
        let config = config.validate()?;
        let resolver = mx::build_resolver(config.dns_timeout)?;
        Ok(Self::with_parts(config, resolver, TcpConnector))
    }
}

impl<R, C> Verifier<R, C>
where
    R: LookupMx,
    C: OpenSession,
{
    pub fn with_parts(config: VerifierConfig, resolver: R, connector: C) -> Self {
        let session_options = config.session_options();
        Self {
            config,
            session_options,
            resolver,
            connector,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verifies one address. `repeats` overrides the configured repeat count
    /// and is clamped to at least 1.
    ///
    /// Never fails: every terminal condition maps to an invalid,
    /// undeliverable result carrying whatever was learned before it.
    pub fn verify(&self, email: &str, repeats: Option<u32>) -> VerificationResult {
        let result = self.run(email, repeats.unwrap_or(self.config.repeats).max(1));
        tracing::info!(
            email,
            domain = result.domain(),
            mx_host = result.mx_host(),
            mx_brand = result.mx_brand().map(|b| b.as_str()),
            result = %result.result(),
            catch_all = result.catch_all(),
            failure = result.failure().map(tracing::field::display),
            "verification finished"
        );
        result
    }

    fn run(&self, email: &str, repeats: u32) -> VerificationResult {
        let parsed = match address::parse(email) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(email, error = %err, "address rejected");
                return VerificationResult::malformed(email);
            }
        };
        let domain = parsed.domain;

        let Some(host) = mx::mx_hosts(&self.resolver, &domain).into_iter().next() else {
            return VerificationResult::no_mail_exchanger(email, domain);
        };
        let brand = mx::classify(&host);

        let mut session = match self.connector.open(&host, &self.session_options) {
            Ok(session) => session,
            Err(err) => {
                tracing::debug!(email, host, error = %err, "session could not be opened");
                return VerificationResult::failed(
                    email,
                    domain,
                    host,
                    brand,
                    FailureKind::Connection,
                );
            }
        };
        let decision = self.decide(&mut session, &parsed.mailbox, &domain, brand, repeats);
        self.connector.close(session);

        match decision {
            Ok(verdict) => VerificationResult::decided(
                email,
                domain,
                host,
                brand,
                verdict.validity,
                verdict.catch_all,
            ),
            Err(err) => {
                tracing::debug!(email, host, error = %err, "probe aborted");
                VerificationResult::failed(email, domain, host, brand, FailureKind::Protocol)
            }
        }
    }

    fn decide<P>(
        &self,
        session: &mut P,
        mailbox: &str,
        domain: &str,
        brand: MxBrand,
        repeats: u32,
    ) -> Result<Verdict, ProbeError>
    where
        P: RecipientProbe + ?Sized,
    {
        let mut pause = || thread::sleep(self.config.jitter_delay());

        let target = session.sample(mailbox, repeats, &mut pause)?;
        if !target.accepted_any {
            return Ok(Verdict::invalid());
        }

        let first_impostor = impostor_address(domain);
        let first = session.sample(&first_impostor, repeats, &mut pause)?;
        if !first.accepted_any {
            return Ok(Verdict {
                validity: Validity::Valid,
                catch_all: false,
            });
        }

        let mut second_impostor = impostor_address(domain);
        while second_impostor == first_impostor {
            second_impostor = impostor_address(domain);
        }
        let second = session.sample(&second_impostor, repeats, &mut pause)?;

        let threshold = self.config.threshold_for(brand);
        let valid = catch_all_verdict(
            target.mean_latency_ms,
            first.mean_latency_ms,
            second.mean_latency_ms,
            threshold,
        );
        tracing::debug!(
            domain,
            target_ms = target.mean_latency_ms,
            first_ms = first.mean_latency_ms,
            second_ms = second.mean_latency_ms,
            threshold,
            valid,
            "catch-all timing comparison"
        );
        Ok(Verdict {
            validity: if valid {
                Validity::Valid
            } else {
                Validity::Invalid
            },
            catch_all: true,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Verdict {
    validity: Validity,
    catch_all: bool,
}

impl Verdict {
    fn invalid() -> Self {
        Self {
            validity: Validity::Invalid,
            catch_all: false,
        }
    }
}

/// Timing rule for catch-all domains: the target is a real mailbox when its
/// mean latency differs from the impostors' mean by at least `threshold_ms`.
pub fn catch_all_verdict(
    target_ms: f64,
    first_impostor_ms: f64,
    second_impostor_ms: f64,
    threshold_ms: f64,
) -> bool {
    let impostor_mean = (first_impostor_ms + second_impostor_ms) / 2.0;
    (target_ms - impostor_mean).abs() >= threshold_ms
}

/// Verifies one address with a fresh [`Verifier`] built from `config`.
pub fn verify_email(
    email: &str,
    config: &VerifierConfig,
) -> Result<VerificationResult, VerifyError> {
    let verifier = Verifier::new(config.clone())?;
    Ok(verifier.verify(email, None))
}
