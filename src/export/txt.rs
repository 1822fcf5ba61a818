//! Plain text export: one tab-separated line per target.

use std::io::Write;

use super::row::category_label;
use super::types::OutputRows;
use crate::config::CSV_LIST_SEPARATOR;
use crate::error_handling::ExportError;

/// `target<TAB>category<TAB>providers`, plus the CNAME chain for detail rows.
pub fn write_txt<W: Write>(rows: &OutputRows, mut output: W) -> Result<usize, ExportError> {
    match rows {
        OutputRows::Results(results) => {
            for result in results {
                writeln!(
                    output,
                    "{}\t{}\t{}",
                    result.target,
                    category_label(result.category),
                    result.providers().join(CSV_LIST_SEPARATOR)
                )?;
            }
        }
        OutputRows::Details(details) => {
            for detail in details {
                writeln!(
                    output,
                    "{}\t{}\t{}\t{}",
                    detail.info.formatted,
                    category_label(detail.category),
                    detail.providers().join(CSV_LIST_SEPARATOR),
                    detail.info.cname.join(CSV_LIST_SEPARATOR)
                )?;
            }
        }
    }
    output.flush()?;
    Ok(rows.len())
}
