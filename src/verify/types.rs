use std::fmt;

use crate::mx::MxBrand;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deliverability {
    Deliverable,
    Undeliverable,
}

impl Deliverability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliverable => "deliverable",
            Self::Undeliverable => "undeliverable",
        }
    }
}

impl From<Validity> for Deliverability {
    fn from(validity: Validity) -> Self {
        match validity {
            Validity::Valid => Self::Deliverable,
            Validity::Invalid => Self::Undeliverable,
        }
    }
}

impl fmt::Display for Deliverability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal condition that cut a verification short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MalformedAddress,
    NoMailExchanger,
    /// Connect, greeting, EHLO/HELO, STARTTLS or sender envelope failed.
    Connection,
    /// The session broke while recipient checks were running.
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MalformedAddress => "malformed address",
            Self::NoMailExchanger => "no mail exchanger",
            Self::Connection => "connection failed",
            Self::Protocol => "protocol error",
        })
    }
}

/// Outcome of one verification. Built only through the constructors below,
/// so `deliverability` always mirrors `result`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    email: String,
    domain: Option<String>,
    mx_host: Option<String>,
    mx_brand: Option<MxBrand>,
    result: Validity,
    #[cfg_attr(feature = "with-serde", serde(rename = "catch-all"))]
    catch_all: bool,
    deliverability: Deliverability,
    #[cfg_attr(feature = "with-serde", serde(skip))]
    failure: Option<FailureKind>,
}

impl VerificationResult {
    fn build(
        email: &str,
        domain: Option<String>,
        mx: Option<(String, MxBrand)>,
        result: Validity,
        catch_all: bool,
        failure: Option<FailureKind>,
    ) -> Self {
        let (mx_host, mx_brand) = match mx {
            Some((host, brand)) => (Some(host), Some(brand)),
            None => (None, None),
        };
        Self {
            email: email.to_string(),
            domain,
            mx_host,
            mx_brand,
            result,
            catch_all,
            deliverability: result.into(),
            failure,
        }
    }

    pub(crate) fn malformed(email: &str) -> Self {
        Self::build(
            email,
            None,
            None,
            Validity::Invalid,
            false,
            Some(FailureKind::MalformedAddress),
        )
    }

    pub(crate) fn no_mail_exchanger(email: &str, domain: String) -> Self {
        Self::build(
            email,
            Some(domain),
            None,
            Validity::Invalid,
            false,
            Some(FailureKind::NoMailExchanger),
        )
    }

    pub(crate) fn failed(
        email: &str,
        domain: String,
        host: String,
        brand: MxBrand,
        failure: FailureKind,
    ) -> Self {
        Self::build(
            email,
            Some(domain),
            Some((host, brand)),
            Validity::Invalid,
            false,
            Some(failure),
        )
    }

    pub(crate) fn decided(
        email: &str,
        domain: String,
        host: String,
        brand: MxBrand,
        result: Validity,
        catch_all: bool,
    ) -> Self {
        Self::build(
            email,
            Some(domain),
            Some((host, brand)),
            result,
            catch_all,
            None,
        )
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn mx_host(&self) -> Option<&str> {
        self.mx_host.as_deref()
    }

    pub fn mx_brand(&self) -> Option<MxBrand> {
        self.mx_brand
    }

    pub fn result(&self) -> Validity {
        self.result
    }

    pub fn catch_all(&self) -> bool {
        self.catch_all
    }

    pub fn deliverability(&self) -> Deliverability {
        self.deliverability
    }

    pub fn is_deliverable(&self) -> bool {
        self.deliverability == Deliverability::Deliverable
    }

    /// Why the run stopped early, if it did. Not part of the serialized form.
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }
}
