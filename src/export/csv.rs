//! CSV export.
//!
//! One row per target; list fields are joined with `|`.

use csv::Writer;
use std::io::Write;

use super::row::{header, records};
use super::types::OutputRows;
use crate::error_handling::ExportError;

/// Writes the header and every row. Returns the number of rows written.
pub fn write_csv<W: Write>(rows: &OutputRows, output: W) -> Result<usize, ExportError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(header(rows))?;

    let records = records(rows);
    for record in &records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(records.len())
}
