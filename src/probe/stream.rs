use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use native_tls::{HandshakeError, TlsConnector, TlsStream};

use super::error::ProbeError;
use super::types::SmtpReply;

/// RFC 5321 limit for one reply line, CRLF included.
pub(crate) const MAX_REPLY_LINE: usize = 512;

#[derive(Debug)]
enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    Closed,
}

impl Transport {
    fn socket(&self) -> Option<&TcpStream> {
        match self {
            Self::Plain(stream) => Some(stream),
            Self::Tls(stream) => Some(stream.get_ref()),
            Self::Closed => None,
        }
    }
}

/// Line-oriented SMTP transport over TCP, optionally upgraded to TLS.
///
/// Every reply must arrive in full within `command_timeout`, however the
/// server paces its bytes.
#[derive(Debug)]
pub(crate) struct SmtpStream {
    transport: Transport,
    pending: Vec<u8>,
    command_timeout: Duration,
}

impl SmtpStream {
    /// Tries each address in turn and keeps the first connection that opens.
    pub(crate) fn connect_any(
        host: &str,
        addrs: &[SocketAddr],
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(socket) => {
                    socket
                        .set_write_timeout(Some(command_timeout))
                        .map_err(ProbeError::io)?;
                    return Ok(Self {
                        transport: Transport::Plain(socket),
                        pending: Vec::new(),
                        command_timeout,
                    });
                }
                Err(err) => {
                    tracing::debug!(host, %addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }
        let host = host.to_string();
        Err(match last_err {
            Some(source) => ProbeError::Connect { host, source },
            None => ProbeError::NoAddress { host },
        })
    }

    pub(crate) fn upgrade_tls(
        &mut self,
        domain: &str,
        connector: &TlsConnector,
    ) -> Result<(), ProbeError> {
        let socket = match std::mem::replace(&mut self.transport, Transport::Closed) {
            Transport::Plain(socket) => socket,
            Transport::Tls(stream) => {
                self.transport = Transport::Tls(stream);
                return Ok(());
            }
            Transport::Closed => return Err(ProbeError::protocol("stream already closed")),
        };
        // Bytes read before the handshake belong to the plaintext session.
        self.pending.clear();
        socket
            .set_read_timeout(Some(self.command_timeout))
            .map_err(ProbeError::io)?;
        let tls = tls_handshake(connector, domain, socket)?;
        self.transport = Transport::Tls(Box::new(tls));
        Ok(())
    }

    /// Writes `command` followed by CRLF. A command that itself contains a
    /// line break is refused before anything is sent.
    pub(crate) fn send_command(&mut self, command: &str) -> Result<(), ProbeError> {
        if command.contains(['\r', '\n']) {
            return Err(ProbeError::protocol(format!(
                "refusing to send command with embedded line break: {command:?}"
            )));
        }
        let mut wire = Vec::with_capacity(command.len() + 2);
        wire.extend_from_slice(command.as_bytes());
        wire.extend_from_slice(b"\r\n");

        let written = match &mut self.transport {
            Transport::Plain(stream) => stream.write_all(&wire).and_then(|()| stream.flush()),
            Transport::Tls(stream) => stream.write_all(&wire).and_then(|()| stream.flush()),
            Transport::Closed => return Err(ProbeError::protocol("stream already closed")),
        };
        written.map_err(ProbeError::io)
    }

    /// Reads one complete (possibly multi-line) reply before the command
    /// deadline.
    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let deadline = Instant::now() + self.command_timeout;
        let mut code = None;
        let mut lines = Vec::new();
        loop {
            let line = self.read_line(deadline)?;
            let (line_code, more, text) = split_reply_line(&line)?;
            match code {
                None => code = Some(line_code),
                Some(first) if first != line_code => {
                    return Err(ProbeError::protocol(format!(
                        "reply code changed mid-reply: {first} then {line_code}"
                    )));
                }
                Some(_) => {}
            }
            lines.push(text.to_string());
            if !more {
                break;
            }
        }
        let code = code.ok_or_else(|| ProbeError::protocol("empty reply"))?;
        Ok(SmtpReply { code, lines })
    }

    fn read_line(&mut self, deadline: Instant) -> Result<String, ProbeError> {
        loop {
            if let Some(end) = self.pending.iter().position(|byte| *byte == b'\n') {
                if end + 1 > MAX_REPLY_LINE {
                    return Err(line_too_long());
                }
                let raw: Vec<u8> = self.pending.drain(..=end).collect();
                let text = raw.strip_suffix(b"\n").unwrap_or(&raw);
                let text = text.strip_suffix(b"\r").unwrap_or(text);
                return Ok(String::from_utf8_lossy(text).into_owned());
            }
            if self.pending.len() >= MAX_REPLY_LINE {
                return Err(line_too_long());
            }
            self.fill(deadline)?;
        }
    }

    /// One read bounded by the time left before `deadline`.
    fn fill(&mut self, deadline: Instant) -> Result<(), ProbeError> {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(ProbeError::ReplyTimeout {
                timeout: self.command_timeout,
            });
        }
        let socket = self
            .transport
            .socket()
            .ok_or_else(|| ProbeError::protocol("stream already closed"))?;
        socket.set_read_timeout(Some(left)).map_err(ProbeError::io)?;

        let mut chunk = [0u8; 512];
        let read = match &mut self.transport {
            Transport::Plain(stream) => stream.read(&mut chunk),
            Transport::Tls(stream) => stream.read(&mut chunk),
            Transport::Closed => return Err(ProbeError::protocol("stream already closed")),
        };
        match read {
            Ok(0) => Err(ProbeError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ))),
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                Ok(())
            }
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Err(ProbeError::ReplyTimeout {
                    timeout: self.command_timeout,
                })
            }
            Err(err) => Err(ProbeError::io(err)),
        }
    }

    /// Abrupt teardown; errors are irrelevant at this point.
    pub(crate) fn shutdown(&mut self) {
        match std::mem::replace(&mut self.transport, Transport::Closed) {
            Transport::Plain(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            Transport::Tls(mut stream) => {
                let _ = stream.shutdown();
                let _ = stream.get_ref().shutdown(Shutdown::Both);
            }
            Transport::Closed => {}
        }
    }
}

/// Splits `250-text` / `250 text` into code, continuation flag and text.
fn split_reply_line(line: &str) -> Result<(u16, bool, &str), ProbeError> {
    let code = line
        .get(..3)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| ProbeError::protocol(format!("malformed reply line: {line:?}")))?;
    let more = line.as_bytes().get(3) == Some(&b'-');
    Ok((code, more, line.get(4..).unwrap_or_default()))
}

fn line_too_long() -> ProbeError {
    ProbeError::protocol(format!("reply line exceeds {MAX_REPLY_LINE} bytes"))
}

fn tls_handshake(
    connector: &TlsConnector,
    domain: &str,
    socket: TcpStream,
) -> Result<TlsStream<TcpStream>, ProbeError> {
    let mut attempt = connector.connect(domain, socket);
    loop {
        match attempt {
            Ok(tls) => return Ok(tls),
            Err(HandshakeError::Failure(source)) => return Err(ProbeError::Tls { source }),
            Err(HandshakeError::WouldBlock(mid)) => attempt = mid.handshake(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_lines_split_into_parts() {
        assert_eq!(split_reply_line("250-PIPELINING").unwrap(), (250, true, "PIPELINING"));
        assert_eq!(split_reply_line("550 5.1.1 no").unwrap(), (550, false, "5.1.1 no"));
        assert_eq!(split_reply_line("354").unwrap(), (354, false, ""));
    }

    #[test]
    fn garbage_reply_lines_are_protocol_errors() {
        for line in ["", "25", "abc hello", "2x0 ok", "é50 ok"] {
            let err = split_reply_line(line).unwrap_err();
            assert!(matches!(err, ProbeError::Protocol(_)), "{line:?}");
        }
    }
}
