use std::io::{Cursor, Read, Seek};

use calamine::{DataType, Range, Reader, Xls, Xlsx};
use chrono::{Duration, NaiveDate, Timelike};

use crate::error::{ReportError, Result};
use crate::model::RawTable;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// Serial of 9999-12-31, the last date Excel can represent.
const MAX_SERIAL: f64 = 2_958_465.0;

/// Reads the first worksheet of an XLSX workbook.
pub fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    let range = read_first_sheet(&mut workbook)?;
    Ok(range_to_table(&range))
}

/// Reads the first worksheet of a legacy XLS workbook.
pub fn read_xls(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes.to_vec()))?;
    let range = read_first_sheet(&mut workbook)?;
    Ok(range_to_table(&range))
}

fn read_first_sheet<RS, R>(workbook: &mut R) -> Result<Range<DataType>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    ReportError: From<R::Error>,
{
    let range_result = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::InvalidWorkbook("workbook has no worksheets".into()))?;
    let range = range_result.map_err(ReportError::from)?;
    Ok(range)
}

fn range_to_table(range: &Range<DataType>) -> RawTable {
    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => Vec::new(),
    };

    let rows = rows
        .map(|row| {
            row.iter()
                .map(|cell| cell_to_string(Some(cell)))
                .collect::<Vec<_>>()
        })
        .filter(|row| row.iter().any(|value| !value.trim().is_empty()))
        .collect();

    RawTable { columns, rows }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTime(serial)) => {
            serial_to_text(*serial).unwrap_or_else(|| serial.to_string())
        }
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Renders an Excel serial date as `YYYY-MM-DD`, with a time part only when
/// the serial carries one. Serials outside Excel's date range yield `None`.
fn serial_to_text(serial: f64) -> Option<String> {
    if !(0.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    let moment = epoch.checked_add_signed(Duration::try_milliseconds(millis)?)?;
    if moment.num_seconds_from_midnight() == 0 {
        Some(moment.format("%Y-%m-%d").to_string())
    } else {
        Some(moment.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_render_as_iso_text() {
        assert_eq!(serial_to_text(45445.0).as_deref(), Some("2024-06-02"));
        assert_eq!(
            serial_to_text(45445.5).as_deref(),
            Some("2024-06-02 12:00:00")
        );
    }

    #[test]
    fn out_of_range_serials_fall_back_to_number() {
        assert_eq!(serial_to_text(-1e20), None);
        assert_eq!(serial_to_text(1e20), None);
        assert_eq!(serial_to_text(f64::NAN), None);
        assert_eq!(serial_to_text(f64::INFINITY), None);
        assert_eq!(
            cell_to_string(Some(&DataType::DateTime(-1e20))),
            (-1e20f64).to_string()
        );
        assert_eq!(serial_to_text(MAX_SERIAL).as_deref(), Some("9999-12-31"));
    }

    #[test]
    fn integral_floats_print_without_fraction() {
        assert_eq!(cell_to_string(Some(&DataType::Float(10.0))), "10");
        assert_eq!(cell_to_string(Some(&DataType::Float(2.5))), "2.5");
        assert_eq!(cell_to_string(None), "");
    }
}
