use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mailprobe_lib::config::{VerifierConfig, seconds};

#[derive(Parser)]
#[command(name = "mailprobe-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// output format
    #[arg(long, value_enum, default_value_t = Format::Human, global = true)]
    pub format: Format,

    /// write the report to a file instead of stdout (json/ndjson/csv)
    #[arg(long, global = true)]
    pub out: Option<String>,

    #[command(flatten)]
    pub tuning: Tuning,
}

#[derive(Subcommand)]
pub enum Commands {
    /// verify a single address
    Verify {
        email: String,
        /// RCPT repeats per address (overrides REPEATS)
        #[arg(long)]
        repeats: Option<u32>,
    },
    /// verify several addresses, from arguments and/or stdin
    Bulk {
        emails: Vec<String>,
        /// read addresses from stdin (one per line)
        #[arg(long)]
        stdin: bool,
        /// RCPT repeats per address (overrides REPEATS)
        #[arg(long)]
        repeats: Option<u32>,
    },
    /// verify the first column of a CSV file
    #[cfg(feature = "with-csv")]
    Csv {
        file: String,
        /// RCPT repeats per address (overrides REPEATS)
        #[arg(long)]
        repeats: Option<u32>,
    },
    /// show the MX records and provider family of a domain
    Mx { domain: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
    Ndjson,
    Csv,
}

/// Tunables read once at startup, from flags or the environment.
#[derive(Args, Debug, Clone)]
pub struct Tuning {
    /// default RCPT repeats per address
    #[arg(long = "default-repeats", env = "REPEATS", default_value_t = 1, global = true)]
    pub repeats: u32,

    /// minimum pause between repeats (seconds)
    #[arg(long, env = "JITTER_MIN", default_value_t = 0.03, global = true)]
    pub jitter_min: f64,

    /// maximum pause between repeats (seconds)
    #[arg(long, env = "JITTER_MAX", default_value_t = 0.08, global = true)]
    pub jitter_max: f64,

    /// catch-all timing threshold for Google MX hosts (ms)
    #[arg(long, env = "GOOGLE_THRESHOLD_MS", default_value_t = 60.0, global = true)]
    pub google_threshold_ms: f64,

    /// catch-all timing threshold for every other MX host (ms)
    #[arg(long, env = "DEFAULT_THRESHOLD_MS", default_value_t = 80.0, global = true)]
    pub default_threshold_ms: f64,

    /// DNS timeout (seconds)
    #[arg(long, env = "DNS_TIMEOUT", default_value_t = 1.2, global = true)]
    pub dns_timeout: f64,

    /// SMTP connect and per-command timeout (seconds)
    #[arg(long, env = "SMTP_TIMEOUT", default_value_t = 10.0, global = true)]
    pub smtp_timeout: f64,

    /// maximum addresses per bulk request
    #[arg(long, env = "MAX_BULK", default_value_t = 1000, global = true)]
    pub max_bulk: usize,

    /// SMTP port
    #[arg(long, default_value_t = 25, global = true)]
    pub port: u16,

    /// name announced in EHLO/HELO
    #[arg(long, default_value = "probe.local", global = true)]
    pub helo: String,

    /// MAIL FROM used when the null sender is refused
    #[arg(long = "from", default_value = "probe@probe.local", global = true)]
    pub fallback_sender: String,

    /// upgrade the session with STARTTLS before MAIL FROM
    #[arg(long, global = true)]
    pub starttls: bool,
}

impl Tuning {
    pub fn into_config(self) -> Result<VerifierConfig> {
        let config = VerifierConfig {
            repeats: self.repeats,
            jitter_min: seconds("JITTER_MIN", self.jitter_min)?,
            jitter_max: seconds("JITTER_MAX", self.jitter_max)?,
            google_threshold_ms: self.google_threshold_ms,
            default_threshold_ms: self.default_threshold_ms,
            dns_timeout: seconds("DNS_TIMEOUT", self.dns_timeout)?,
            smtp_timeout: seconds("SMTP_TIMEOUT", self.smtp_timeout)?,
            max_bulk: self.max_bulk,
            port: self.port,
            helo_name: self.helo,
            fallback_sender: self.fallback_sender,
            starttls: self.starttls,
        };
        config.validate().context("invalid configuration")
    }
}
