//! Source loading: turns the raw bytes of a fetched file into a normalized
//! [`Table`](crate::model::Table).

pub mod csv_read;
pub mod excel_read;

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::Table;

/// File formats the loader understands, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
    /// Unrecognised extension; decoded as CSV on a best-effort basis.
    Unknown,
}

impl SourceFormat {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        match lower.rsplit_once('.').map(|(_, ext)| ext) {
            Some("csv") => SourceFormat::Csv,
            Some("xlsx") | Some("xlsm") => SourceFormat::Xlsx,
            Some("xls") => SourceFormat::Xls,
            _ => SourceFormat::Unknown,
        }
    }
}

/// Parses `bytes` into a normalized table. Only column labels are touched;
/// cell values are kept as the text the reader produced.
pub fn load_table(bytes: &[u8], filename: &str) -> Result<Table> {
    let raw = match SourceFormat::from_filename(filename) {
        SourceFormat::Csv => csv_read::read_csv(bytes, filename)?,
        SourceFormat::Xlsx => excel_read::read_xlsx(bytes)?,
        SourceFormat::Xls => excel_read::read_xls(bytes)?,
        SourceFormat::Unknown => {
            warn!(filename, "unsupported file extension, trying to read as CSV");
            csv_read::read_csv(bytes, filename)?
        }
    };

    let table = Table::from_raw(raw);
    debug!(
        filename,
        columns = table.columns().len(),
        rows = table.len(),
        "source loaded"
    );
    Ok(table)
}
