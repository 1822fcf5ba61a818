//! Target list loading.

use std::path::Path;

use super::{content_lines, read_input_file};
use crate::error_handling::InitializationError;

/// Raw target strings and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetList {
    pub targets: Vec<String>,
    /// True when the list was read from a file
    pub from_batch_source: bool,
}

/// Splits an inline comma-separated target list.
pub fn parse_target_list(inline: &str) -> Vec<String> {
    inline
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads `target` as a file of one target per line if such a file exists,
/// otherwise as an inline comma-separated list.
///
/// # Errors
///
/// `InitializationError::InputError` when the file exists but cannot be read.
pub fn read_targets(target: &str) -> Result<TargetList, InitializationError> {
    let path = Path::new(target.trim());
    if path.is_file() {
        let text = read_input_file(path)?;
        let targets: Vec<String> = content_lines(&text)
            .map(|(_, line)| line.to_string())
            .collect();
        log::info!("Read {} targets from {}", targets.len(), path.display());
        return Ok(TargetList {
            targets,
            from_batch_source: true,
        });
    }

    Ok(TargetList {
        targets: parse_target_list(target),
        from_batch_source: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inline_list() {
        let list = read_targets("www.example.org, 198.51.100.7,,  ").unwrap();
        assert_eq!(list.targets, vec!["www.example.org", "198.51.100.7"]);
        assert!(!list.from_batch_source);
    }

    #[test]
    fn test_file_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# targets").unwrap();
        writeln!(file, "www.example.org").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  https://cdn.example.net/path  ").unwrap();

        let list = read_targets(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            list.targets,
            vec!["www.example.org", "https://cdn.example.net/path"]
        );
        assert!(list.from_batch_source);
    }
}
