use std::time::Duration;

use anyhow::{Context, Result, bail};
use mailprobe_lib::{MxBrand, MxStatus, check_mx, classify};

use crate::args::Format;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct MxReport {
    pub domain: String,
    pub status: MxStatus,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub brand: Option<MxBrand>,
}

impl MxReport {
    pub fn from_status(domain: &str, status: MxStatus) -> Self {
        let brand = status.hosts().first().map(|host| classify(host));
        Self {
            domain: domain.to_string(),
            status,
            brand,
        }
    }

    pub fn human_summary(&self) -> String {
        match &self.status {
            MxStatus::Records(records) if !records.is_empty() => {
                let summary = records
                    .iter()
                    .map(|r| format!("{}:{}", r.preference, r.exchange))
                    .collect::<Vec<_>>()
                    .join(", ");
                match self.brand {
                    Some(brand) => format!("{}: {summary} [{brand}]", self.domain),
                    None => format!("{}: {summary}", self.domain),
                }
            }
            _ => format!("{}: no MX records", self.domain),
        }
    }
}

pub fn run(domain: &str, timeout: Duration, format: Format) -> Result<()> {
    let status = check_mx(domain, timeout).with_context(|| format!("MX lookup for {domain}"))?;
    let report = MxReport::from_status(domain, status);
    match format {
        Format::Human => println!("{}", report.human_summary()),
        Format::Json | Format::Ndjson => print_json(&report)?,
        Format::Csv => bail!("format=csv is not available for the mx command"),
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn print_json(report: &MxReport) -> Result<()> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn print_json(_: &MxReport) -> Result<()> {
    bail!("format=json needs the 'with-serde' feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::MxRecord;

    #[test]
    fn brand_follows_the_most_preferred_host() {
        let status = MxStatus::Records(vec![
            MxRecord::new(1, "aspmx.l.google.com"),
            MxRecord::new(10, "mx.example.net"),
        ]);
        let report = MxReport::from_status("example.com", status);
        assert_eq!(report.brand, Some(MxBrand::Google));
        assert_eq!(
            report.human_summary(),
            "example.com: 1:aspmx.l.google.com, 10:mx.example.net [google]"
        );
    }

    #[test]
    fn null_mx_has_no_brand() {
        let status = MxStatus::Records(vec![MxRecord::new(0, "")]);
        let report = MxReport::from_status("example.com", status);
        assert_eq!(report.brand, None);
    }

    #[test]
    fn missing_records_are_reported() {
        let report = MxReport::from_status("example.com", MxStatus::NoRecords);
        assert_eq!(report.human_summary(), "example.com: no MX records");
    }
}
