use std::time::Duration;

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    /// Whether a `RCPT TO` reply counts as "not rejected".
    ///
    /// 451 and 452 are greylisting / local-resource deferrals and count as
    /// accepted. Other 4xx codes do not.
    pub fn accepts_recipient(&self) -> bool {
        self.is_positive_completion() || matches!(self.code, 451 | 452)
    }

    pub fn message(&self) -> String {
        self.lines.join(" ")
    }
}

/// Result of a single `RCPT TO` round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub accepted: bool,
    pub latency_ms: f64,
    /// Reply code, kept for diagnostics.
    pub code: u16,
}

impl ProbeOutcome {
    pub fn new(accepted: bool, latency_ms: f64, code: u16) -> Self {
        Self {
            accepted,
            latency_ms: latency_ms.max(0.0),
            code,
        }
    }

    pub(crate) fn from_reply(reply: &SmtpReply, elapsed: Duration) -> Self {
        Self::new(
            reply.accepts_recipient(),
            round_tenth(elapsed.as_secs_f64() * 1000.0),
            reply.code,
        )
    }
}

/// Aggregate of the repeats issued for one logical address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSample {
    pub accepted_any: bool,
    pub mean_latency_ms: f64,
}

impl ProbeSample {
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self {
                accepted_any: false,
                mean_latency_ms: 0.0,
            };
        }
        let total: f64 = outcomes.iter().map(|o| o.latency_ms).sum();
        Self {
            accepted_any: outcomes.iter().any(|o| o.accepted),
            mean_latency_ms: round_tenth(total / outcomes.len() as f64),
        }
    }
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
