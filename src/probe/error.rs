use std::io;
use std::time::Duration;

use thiserror::Error;

use super::SessionState;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("no socket address available for {host}")]
    NoAddress { host: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    #[error("TLS setup failed: {source}")]
    Tls {
        #[source]
        source: native_tls::Error,
    },
    #[error("{host} greeted with {code}")]
    Greeting { host: String, code: u16 },
    #[error("{host} refused EHLO/HELO with {code}")]
    Helo { host: String, code: u16 },
    #[error("{host} refused STARTTLS with {code}")]
    StartTls { host: String, code: u16 },
    #[error("{host} rejected the sender envelope with {code}")]
    SenderRejected { host: String, code: u16 },
    #[error("recipient check attempted on a {state:?} session")]
    NotReady { state: SessionState },
    #[error("no complete reply within {timeout:?}")]
    ReplyTimeout { timeout: Duration },
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ProbeError {
    pub(crate) fn io(source: io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
