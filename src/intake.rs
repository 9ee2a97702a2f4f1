//! Address lists from CSV uploads (`with-csv` feature).

use std::io::Read;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to parse CSV: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },
}

/// Reads the first column of every row as an address.
///
/// Cells are trimmed and any cell equal to `email` (case-insensitive) is
/// treated as a header and dropped. Blank lines are skipped, but a row whose
/// first cell is empty is kept so it shows up as an invalid result. Bytes
/// that are not valid UTF-8 are dropped.
pub fn read_address_column<R: Read>(reader: R) -> Result<Vec<String>, IntakeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut addresses = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record.map_err(|source| IntakeError::Csv { source })?;
        let first = match record.get(0) {
            None => continue,
            Some(b"") if record.len() == 1 => continue,
            Some(first) => first,
        };
        let value = valid_utf8(first);
        let value = value.trim();
        if value.eq_ignore_ascii_case("email") {
            continue;
        }
        addresses.push(value.to_string());
    }
    Ok(addresses)
}

fn valid_utf8(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
