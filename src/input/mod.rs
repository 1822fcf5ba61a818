//! Input loading: target lists, resolver lists and the city map, plus the
//! sampling policy that picks the per-run subsets of resolvers and cities.

mod cities;
mod resolvers;
mod sampling;
mod targets;

pub use cities::{parse_city_map, read_city_map};
pub use resolvers::{parse_resolver, parse_resolvers, read_resolvers};
pub use sampling::Sampler;
pub use targets::{parse_target_list, read_targets, TargetList};

use std::path::Path;

use crate::error_handling::InitializationError;

pub(crate) fn read_input_file(path: &Path) -> Result<String, InitializationError> {
    std::fs::read_to_string(path).map_err(|e| InitializationError::InputError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Non-empty, non-comment lines, trimmed, with their 1-based line numbers.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}
