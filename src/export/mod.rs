//! Result shaping and output.
//!
//! Three shapes are produced from a run: every verdict, only the unmatched
//! verdicts, or verdicts merged with their evidence. Each can be written as
//! pretty JSON on stdout (`sys`), or to a JSON, CSV or text file.

mod csv;
mod json;
mod row;
mod txt;
mod types;

pub use csv::write_csv;
pub use json::write_json;
pub use txt::write_txt;
pub use types::{CheckDetail, OutputRows};

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::config::{OutputLevel, OutputType};
use crate::error_handling::ExportError;
use crate::fingerprint::CheckResult;
use crate::models::CheckInfo;

/// Results that matched no provider.
pub fn unmatched(results: &[CheckResult]) -> Vec<CheckResult> {
    results
        .iter()
        .filter(|result| !result.is_matched())
        .cloned()
        .collect()
}

/// Pairs each `CheckInfo` with the verdict computed from it.
///
/// Both slices come out of the pipeline in the same order; extra entries on
/// either side are dropped with a warning.
pub fn merge_details(infos: &[CheckInfo], results: &[CheckResult]) -> Vec<CheckDetail> {
    if infos.len() != results.len() {
        log::warn!(
            "Merging {} target records with {} results; unpaired entries are dropped",
            infos.len(),
            results.len()
        );
    }
    infos
        .iter()
        .zip(results)
        .map(|(info, result)| CheckDetail {
            info: info.clone(),
            category: result.category,
            matches: result.matches.clone(),
        })
        .collect()
}

/// Selects the rows the output level asks for.
pub fn shape_output(level: OutputLevel, infos: &[CheckInfo], results: Vec<CheckResult>) -> OutputRows {
    match level {
        OutputLevel::Default => OutputRows::Results(results),
        OutputLevel::Quiet => OutputRows::Results(unmatched(&results)),
        OutputLevel::Detail => OutputRows::Details(merge_details(infos, &results)),
    }
}

fn output_type_name(output_type: OutputType) -> &'static str {
    match output_type {
        OutputType::Sys => "sys",
        OutputType::Json => "json",
        OutputType::Csv => "csv",
        OutputType::Txt => "txt",
    }
}

fn open_output(output_type: OutputType, output_file: Option<&Path>) -> Result<BufWriter<File>, ExportError> {
    let path = output_file
        .ok_or_else(|| ExportError::MissingOutputFile(output_type_name(output_type).to_string()))?;
    log::info!("Writing {} output to {}", output_type_name(output_type), path.display());
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes `rows` in the requested format. Returns the number of rows written.
///
/// # Errors
///
/// `ExportError::MissingOutputFile` when a file format is chosen without a
/// path, or any I/O or serialization failure.
pub fn write_output(
    rows: &OutputRows,
    output_type: OutputType,
    output_file: Option<&Path>,
) -> Result<usize, ExportError> {
    match output_type {
        OutputType::Sys => write_json(rows, io::stdout().lock()),
        OutputType::Json => write_json(rows, open_output(output_type, output_file)?),
        OutputType::Csv => write_csv(rows, open_output(output_type, output_file)?),
        OutputType::Txt => write_txt(rows, open_output(output_type, output_file)?),
    }
}

#[cfg(test)]
mod tests;
