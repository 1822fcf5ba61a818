//! City map loading.
//!
//! The city map is a CSV of `label, address-or-subnet` pairs. A header row is
//! recognised by its column names (`city`/`label`/`name` and
//! `ip`/`subnet`/`address`/`cidr`) or by a second column that is not an address.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

use super::read_input_file;
use crate::dns::{CityProbe, ClientSubnet};
use crate::error_handling::InitializationError;

const LABEL_COLUMNS: [&str; 3] = ["city", "label", "name"];
const SUBNET_COLUMNS: [&str; 4] = ["ip", "subnet", "address", "cidr"];

fn find_column(header: &StringRecord, names: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|field| names.iter().any(|name| field.eq_ignore_ascii_case(name)))
}

/// Column indices `(label, subnet)` if `first` is a header row.
fn header_columns(first: &StringRecord) -> Option<(usize, usize)> {
    let label = find_column(first, &LABEL_COLUMNS);
    let subnet = find_column(first, &SUBNET_COLUMNS);
    if label.is_some() || subnet.is_some() {
        return Some((label.unwrap_or(0), subnet.unwrap_or(1)));
    }
    let second = first.get(1).unwrap_or_default();
    if second.parse::<ClientSubnet>().is_err() {
        return Some((0, 1));
    }
    None
}

/// Parses the city map. Rows whose subnet does not parse are skipped with a
/// warning.
///
/// # Errors
///
/// `InitializationError::InputError` when the CSV itself is malformed.
pub fn parse_city_map(text: &str, origin: &Path) -> Result<Vec<CityProbe>, InitializationError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| InitializationError::InputError {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record);
    }

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let (skip, (label_col, subnet_col)) = match header_columns(first) {
        Some(columns) => (1, columns),
        None => (0, (0, 1)),
    };

    let mut cities = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(skip) {
        let label = row.get(label_col).unwrap_or_default();
        let subnet = row.get(subnet_col).unwrap_or_default();
        match CityProbe::parse(label, subnet) {
            Ok(city) => cities.push(city),
            Err(e) => log::warn!(
                "Skipping city map row {} in {}: {e}",
                index + 1,
                origin.display()
            ),
        }
    }
    Ok(cities)
}

pub fn read_city_map(path: &Path) -> Result<Vec<CityProbe>, InitializationError> {
    let text = read_input_file(path)?;
    let cities = parse_city_map(&text, path)?;
    log::info!("Loaded {} cities from {}", cities.len(), path.display());
    Ok(cities)
}
