#![forbid(unsafe_code)]
//! mailprobe_lib: SMTP `RCPT TO` probing with timing-based catch-all detection.
//!
//! Nothing is ever delivered: the engine opens one session against the most
//! preferred MX host, asks it about the target address and, when needed, about
//! random impostor addresses at the same domain, then classifies the target
//! as valid or invalid. See [`Verifier`].

pub mod address;
pub mod config;
pub mod mx;
pub mod probe;
pub mod verify;

#[cfg(feature = "with-csv")]
pub mod intake;

pub use address::{AddressError, ParsedAddress, parse_domain};
pub use config::{ConfigError, VerifierConfig};
pub use mx::{Error as MxError, MxBrand, MxRecord, MxStatus, check_mx, classify};
pub use probe::{ProbeError, ProbeOutcome, ProbeSample, ProbeSession, impostor_address};
pub use verify::{
    BulkError, Deliverability, FailureKind, TcpConnector, Validity, VerificationResult, Verifier,
    VerifyError, catch_all_verdict, verify_email,
};

#[cfg(feature = "with-csv")]
pub use intake::{IntakeError, read_address_column};
