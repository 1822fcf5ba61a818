//! JSON export: one pretty-printed array of rows.

use std::io::Write;

use super::types::OutputRows;
use crate::error_handling::ExportError;

pub fn write_json<W: Write>(rows: &OutputRows, mut output: W) -> Result<usize, ExportError> {
    match rows {
        OutputRows::Results(results) => serde_json::to_writer_pretty(&mut output, results)?,
        OutputRows::Details(details) => serde_json::to_writer_pretty(&mut output, details)?,
    }
    writeln!(output)?;
    output.flush()?;
    Ok(rows.len())
}
