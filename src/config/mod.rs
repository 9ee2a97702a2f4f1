//! Process-wide tunables, built once at startup and handed to the
//! [`Verifier`](crate::Verifier).

mod error;

pub use error::ConfigError;

use std::time::Duration;

use rand::Rng;

use crate::mx::MxBrand;
use crate::probe::SessionOptions;

/// Immutable verification settings.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierConfig {
    /// `RCPT TO` repeats per logical address (at least 1).
    pub repeats: u32,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
    /// Catch-all timing threshold for Google-hosted domains.
    pub google_threshold_ms: f64,
    /// Catch-all timing threshold for every other provider.
    pub default_threshold_ms: f64,
    pub dns_timeout: Duration,
    /// Bounds the TCP connect and every SMTP command.
    pub smtp_timeout: Duration,
    pub max_bulk: usize,
    pub port: u16,
    pub helo_name: String,
    pub fallback_sender: String,
    pub starttls: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            repeats: 1,
            jitter_min: Duration::from_millis(30),
            jitter_max: Duration::from_millis(80),
            google_threshold_ms: 60.0,
            default_threshold_ms: 80.0,
            dns_timeout: Duration::from_millis(1_200),
            smtp_timeout: Duration::from_secs(10),
            max_bulk: 1_000,
            port: 25,
            helo_name: "probe.local".to_string(),
            fallback_sender: "probe@probe.local".to_string(),
            starttls: false,
        }
    }
}

impl VerifierConfig {
    /// Rejects unusable values and clamps the recoverable ones.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("GOOGLE_THRESHOLD_MS", self.google_threshold_ms),
            ("DEFAULT_THRESHOLD_MS", self.default_threshold_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if self.dns_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { name: "DNS_TIMEOUT" });
        }
        if self.smtp_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                name: "SMTP_TIMEOUT",
            });
        }
        if self.max_bulk == 0 {
            return Err(ConfigError::ZeroBulk);
        }
        if !self.fallback_sender.contains('@') {
            return Err(ConfigError::InvalidSender(self.fallback_sender));
        }
        if self.repeats == 0 {
            tracing::warn!("REPEATS was 0, using 1");
            self.repeats = 1;
        }
        if self.jitter_max < self.jitter_min {
            tracing::warn!(
                "JITTER_MAX ({:?}) < JITTER_MIN ({:?}), using JITTER_MIN for both",
                self.jitter_max,
                self.jitter_min
            );
            self.jitter_max = self.jitter_min;
        }
        Ok(self)
    }

    /// Timing threshold used for the catch-all comparison on `brand`.
    pub fn threshold_for(&self, brand: MxBrand) -> f64 {
        match brand {
            MxBrand::Google => self.google_threshold_ms,
            _ => self.default_threshold_ms,
        }
    }

    /// Random pause between two repeats of the same recipient check.
    pub fn jitter_delay(&self) -> Duration {
        if self.jitter_min >= self.jitter_max {
            return self.jitter_min;
        }
        let secs = rand::thread_rng()
            .gen_range(self.jitter_min.as_secs_f64()..=self.jitter_max.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(self.jitter_min, self.jitter_max)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            port: self.port,
            connect_timeout: self.smtp_timeout,
            command_timeout: self.smtp_timeout,
            helo_name: self.helo_name.clone(),
            fallback_sender: self.fallback_sender.clone(),
            starttls: self.starttls,
        }
    }
}

/// Converts a seconds value read from the environment into a [`Duration`].
pub fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds { name, value })
}
