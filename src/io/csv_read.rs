use std::io::Cursor;

use csv::ReaderBuilder;

use crate::error::{ReportError, Result};
use crate::model::RawTable;

const UTF8_BOM: char = '\u{feff}';

/// Reads CSV content. Bytes are decoded lossily, the first record is the
/// header, short records are accepted and records wider than the header are
/// rejected.
pub fn read_csv(bytes: &[u8], filename: &str) -> Result<RawTable> {
    let decoded = String::from_utf8_lossy(bytes);
    let text = decoded.strip_prefix(UTF8_BOM).unwrap_or(&*decoded);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let mut records = reader.records();
    let columns: Vec<String> = match records.next() {
        Some(header) => header?.iter().map(str::to_string).collect(),
        None => return Err(ReportError::malformed(filename, "no columns to parse")),
    };

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(ReportError::malformed(
                filename,
                format!(
                    "expected {} fields in line {}, saw {}",
                    columns.len(),
                    idx + 2,
                    record.len()
                ),
            ));
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { columns, rows })
}
