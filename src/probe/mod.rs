//! SMTP envelope probing.
//!
//! A [`ProbeSession`] owns one connection to one mail exchanger and issues
//! timed `RCPT TO` checks over it. Nothing past the envelope is ever sent.

mod error;
mod impostor;
mod session;
mod stream;
mod types;

pub use error::ProbeError;
pub use impostor::impostor_address;
pub use session::{ProbeSession, RecipientProbe, SessionOptions, SessionState};
pub use types::{ProbeOutcome, ProbeSample, SmtpReply};
