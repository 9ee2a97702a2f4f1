mod args;
mod mx;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::Parser;
use mailprobe_lib::{VerificationResult, Verifier};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::args::{Cli, Commands};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = cli.tuning.into_config()?;
    let out = cli.out.as_deref();

    let rows: Vec<VerificationResult> = match cli.cmd {
        Commands::Mx { domain } => return mx::run(&domain, config.dns_timeout, cli.format),
        Commands::Verify { email, repeats } => {
            let verifier = Verifier::new(config)?;
            vec![verifier.verify(&email, repeats)]
        }
        Commands::Bulk {
            mut emails,
            stdin,
            repeats,
        } => {
            if stdin {
                emails.extend(read_stdin_lines()?);
            }
            let verifier = Verifier::new(config)?;
            verifier.verify_bulk(&emails, repeats)?
        }
        #[cfg(feature = "with-csv")]
        Commands::Csv { file, repeats } => {
            let emails = read_csv_file(&file)?;
            let verifier = Verifier::new(config)?;
            verifier.verify_bulk(&emails, repeats)?
        }
    };

    output::write_reports(&rows, cli.format, out)?;

    if output::any_undeliverable(&rows) {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")
}

fn read_stdin_lines() -> Result<Vec<String>> {
    let stdin = io::stdin();
    let mut emails = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            emails.push(trimmed.to_string());
        }
    }
    Ok(emails)
}

#[cfg(feature = "with-csv")]
fn read_csv_file(file: &str) -> Result<Vec<String>> {
    if !has_csv_extension(file) {
        anyhow::bail!("{file}: upload a .csv file");
    }
    let reader = std::fs::File::open(file).with_context(|| format!("open {file}"))?;
    mailprobe_lib::read_address_column(reader).with_context(|| format!("read {file}"))
}

#[cfg(feature = "with-csv")]
fn has_csv_extension(file: &str) -> bool {
    std::path::Path::new(file)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
