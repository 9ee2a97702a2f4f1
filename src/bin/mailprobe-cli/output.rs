#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Format;
use mailprobe_lib::VerificationResult;

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 8] = [
    "email",
    "domain",
    "mx_host",
    "mx_brand",
    "result",
    "catch-all",
    "deliverability",
    "failure",
];

pub fn write_reports(rows: &[VerificationResult], format: Format, out: Option<&str>) -> Result<()> {
    match format {
        Format::Human => {
            if out.is_some() {
                bail!("--out needs --format json|ndjson|csv");
            }
            for row in rows {
                println!("{}", human_line(row));
            }
            Ok(())
        }
        Format::Json => write_json(rows, out),
        Format::Ndjson => write_ndjson(rows, out),
        Format::Csv => write_csv(rows, out),
    }
}

pub fn any_undeliverable(rows: &[VerificationResult]) -> bool {
    rows.iter().any(|row| !row.is_deliverable())
}

pub fn human_line(row: &VerificationResult) -> String {
    let tag = if row.is_deliverable() {
        "[DELIVERABLE]  "
    } else {
        "[UNDELIVERABLE]"
    };
    let mut line = format!("{tag} {}", row.email());
    if let Some(host) = row.mx_host() {
        line.push_str(&format!("  mx={host}"));
        if let Some(brand) = row.mx_brand() {
            line.push_str(&format!(" ({brand})"));
        }
    }
    if row.catch_all() {
        line.push_str("  catch-all");
    }
    if let Some(failure) = row.failure() {
        line.push_str(&format!("  :: {failure}"));
    }
    line
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[VerificationResult], out: Option<&str>) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[VerificationResult], _: Option<&str>) -> Result<()> {
    bail!("format=json needs the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[VerificationResult], out: Option<&str>) -> Result<()> {
    if let Some(path) = out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[VerificationResult], _: Option<&str>) -> Result<()> {
    bail!("format=ndjson needs the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[VerificationResult], out: Option<&str>) -> Result<()> {
    if let Some(path) = out {
        let data = csv_bytes(rows)?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationResult], _: Option<&str>) -> Result<()> {
    bail!("format=csv needs the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_bytes(rows: &[VerificationResult]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for row in rows {
        wtr.write_record(csv_record(row))?;
    }
    wtr.into_inner().context("flush csv buffer")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &VerificationResult) -> Vec<String> {
    vec![
        row.email().to_string(),
        row.domain().unwrap_or_default().to_string(),
        row.mx_host().unwrap_or_default().to_string(),
        row.mx_brand().map(|b| b.to_string()).unwrap_or_default(),
        row.result().to_string(),
        row.catch_all().to_string(),
        row.deliverability().to_string(),
        row.failure().map(|f| f.to_string()).unwrap_or_default(),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
pub fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::{TcpConnector, Verifier, VerifierConfig};
    use trust_dns_resolver::Resolver;
    use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};

    fn malformed_row() -> VerificationResult {
        // no '@': decided before any lookup
        let resolver =
            Resolver::new(ResolverConfig::default(), ResolverOpts::default()).expect("resolver");
        let verifier = Verifier::with_parts(VerifierConfig::default(), resolver, TcpConnector);
        verifier.verify("not-an-address", None)
    }

    #[test]
    fn human_line_names_the_failure() {
        let row = malformed_row();
        let line = human_line(&row);
        assert!(line.starts_with("[UNDELIVERABLE] not-an-address"));
        assert!(line.ends_with(":: malformed address"));
        assert!(!line.contains("mx="));
    }

    #[test]
    fn undeliverable_rows_are_detected() {
        assert!(any_undeliverable(&[malformed_row()]));
        assert!(!any_undeliverable(&[]));
    }

    #[test]
    fn human_format_refuses_out_file() {
        let err = write_reports(&[], Format::Human, Some("report.txt")).unwrap_err();
        assert!(err.to_string().contains("--out"));
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_report_has_header_and_blank_optionals() {
        let data = csv_bytes(&[malformed_row()]).expect("csv");
        let text = String::from_utf8(data).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("email,domain,mx_host,mx_brand,result,catch-all,deliverability,failure")
        );
        assert_eq!(
            lines.next(),
            Some("not-an-address,,,,invalid,false,undeliverable,malformed address")
        );
        assert_eq!(lines.next(), None);
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn atomic_write_replaces_target() {
        let dir = std::env::temp_dir().join(format!("mailprobe-out-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("report.json");
        let path = path.to_str().expect("utf8 path");
        write_all_atomically(path, b"old").expect("first write");
        write_all_atomically(path, b"new").expect("second write");
        assert_eq!(std::fs::read(path).expect("read"), b"new");
        assert!(!std::path::Path::new(&format!("{path}.tmp")).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
