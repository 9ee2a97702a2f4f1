use std::net::{SocketAddr, ToSocketAddrs};
use std::time::{Duration, Instant};

use native_tls::TlsConnector;

use super::error::ProbeError;
use super::stream::SmtpStream;
use super::types::{ProbeOutcome, ProbeSample, SmtpReply};

/// Connection-level settings for a [`ProbeSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub helo_name: String,
    /// Sender used when the null reverse-path `<>` is refused.
    pub fallback_sender: String,
    pub starttls: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: 25,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            helo_name: "probe.local".to_string(),
            fallback_sender: "probe@probe.local".to_string(),
            starttls: false,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// TCP (or TLS) is up, the envelope is not open yet.
    Connected,
    /// Sender accepted; recipient checks may be issued.
    Ready,
    Closed,
}

/// Anything that can answer `RCPT TO` for one address at a time.
pub trait RecipientProbe {
    fn rcpt(&mut self, address: &str) -> Result<ProbeOutcome, ProbeError>;

    /// Checks `address` `repeats` times (at least once), calling `pause`
    /// between consecutive repeats only.
    fn sample(
        &mut self,
        address: &str,
        repeats: u32,
        pause: &mut dyn FnMut(),
    ) -> Result<ProbeSample, ProbeError> {
        let repeats = repeats.max(1);
        let mut outcomes = Vec::with_capacity(repeats as usize);
        for round in 0..repeats {
            if round > 0 {
                pause();
            }
            outcomes.push(self.rcpt(address)?);
        }
        Ok(ProbeSample::from_outcomes(&outcomes))
    }
}

/// One SMTP conversation with one mail exchanger, used for exactly one
/// verification. Dropping an unclosed session shuts the socket down.
#[derive(Debug)]
pub struct ProbeSession {
    host: String,
    stream: SmtpStream,
    state: SessionState,
}

impl ProbeSession {
    /// Connects to `host`, greets it and opens an envelope so that the
    /// session is [`SessionState::Ready`].
    pub fn open(host: &str, options: &SessionOptions) -> Result<Self, ProbeError> {
        let addrs = resolve_socket_addrs(host, options.port)?;
        let stream = SmtpStream::connect_any(
            host,
            &addrs,
            options.connect_timeout,
            options.command_timeout,
        )?;
        let mut session = Self {
            host: host.to_string(),
            stream,
            state: SessionState::Connected,
        };
        session.handshake(options)?;
        Ok(session)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn handshake(&mut self, options: &SessionOptions) -> Result<(), ProbeError> {
        let greeting = self.stream.read_reply()?;
        self.record_reply(&greeting);
        if !greeting.is_positive_completion() {
            return Err(ProbeError::Greeting {
                host: self.host.clone(),
                code: greeting.code,
            });
        }

        self.greet(&options.helo_name)?;
        if options.starttls {
            self.starttls()?;
            self.greet(&options.helo_name)?;
        }
        self.announce_sender(&options.fallback_sender)?;
        self.state = SessionState::Ready;
        Ok(())
    }

    fn greet(&mut self, helo_name: &str) -> Result<(), ProbeError> {
        let ehlo = self.command(&format!("EHLO {helo_name}"))?;
        if ehlo.is_positive_completion() {
            return Ok(());
        }
        let helo = self.command(&format!("HELO {helo_name}"))?;
        if helo.is_positive_completion() {
            return Ok(());
        }
        Err(ProbeError::Helo {
            host: self.host.clone(),
            code: helo.code,
        })
    }

    fn starttls(&mut self) -> Result<(), ProbeError> {
        let connector = TlsConnector::new().map_err(|source| ProbeError::Tls { source })?;
        let reply = self.command("STARTTLS")?;
        if !reply.is_positive_completion() {
            return Err(ProbeError::StartTls {
                host: self.host.clone(),
                code: reply.code,
            });
        }
        let host = self.host.clone();
        self.stream.upgrade_tls(&host, &connector)
    }

    fn announce_sender(&mut self, fallback_sender: &str) -> Result<(), ProbeError> {
        let null_sender = self.command("MAIL FROM:<>")?;
        if null_sender.is_positive_completion() {
            return Ok(());
        }
        tracing::debug!(
            host = %self.host,
            code = null_sender.code,
            "null sender refused, retrying with placeholder"
        );
        let placeholder = self.command(&format!("MAIL FROM:<{fallback_sender}>"))?;
        if placeholder.is_positive_completion() {
            return Ok(());
        }
        Err(ProbeError::SenderRejected {
            host: self.host.clone(),
            code: placeholder.code,
        })
    }

    /// Sends `QUIT`, falling back to an abrupt shutdown when the server does
    /// not answer.
    pub fn close(mut self) {
        self.quit();
    }

    fn quit(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        match self.command("QUIT") {
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(host = %self.host, error = %err, "QUIT failed, dropping connection");
                self.stream.shutdown();
            }
        }
    }

    fn command(&mut self, command: &str) -> Result<SmtpReply, ProbeError> {
        tracing::trace!(host = %self.host, "C: {command}");
        self.stream.send_command(command)?;
        let reply = self.stream.read_reply()?;
        self.record_reply(&reply);
        Ok(reply)
    }

    fn record_reply(&self, reply: &SmtpReply) {
        tracing::trace!(host = %self.host, "S: {} {}", reply.code, reply.message());
    }
}

impl RecipientProbe for ProbeSession {
    /// Timed from just before the command is written until the full reply
    /// has been read.
    fn rcpt(&mut self, address: &str) -> Result<ProbeOutcome, ProbeError> {
        if self.state != SessionState::Ready {
            return Err(ProbeError::NotReady { state: self.state });
        }
        let command = format!("RCPT TO:<{address}>");
        let started = Instant::now();
        self.stream.send_command(&command)?;
        let reply = self.stream.read_reply()?;
        let elapsed = started.elapsed();

        tracing::trace!(host = %self.host, "C: {command}");
        self.record_reply(&reply);
        Ok(ProbeOutcome::from_reply(&reply, elapsed))
    }
}

impl Drop for ProbeSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            self.stream.shutdown();
        }
    }
}

fn resolve_socket_addrs(host: &str, port: u16) -> Result<Vec<SocketAddr>, ProbeError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ProbeError::Resolve {
            host: host.to_string(),
            source,
        })?
        .collect();
    if addrs.is_empty() {
        return Err(ProbeError::NoAddress {
            host: host.to_string(),
        });
    }
    Ok(addrs)
}
