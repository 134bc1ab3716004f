//! Result formatting and JSON output writer.
//!
//! Facet totals are emitted as `[{name: total}, ...]`, sorted ascending by
//! name using byte-wise string comparison.

use crate::aggregator::FacetTotals;
use crate::parser::schema::{FacetEntry, FacetResponse};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Sort facet totals into the result sequence
///
/// **Public** - the output formatter
///
/// # Arguments
/// * `totals` - Facet totals from either strategy
///
/// # Returns
/// One entry per facet name, ascending by name; empty for empty totals
pub fn format_totals(totals: &FacetTotals) -> Vec<FacetEntry> {
    let mut entries: Vec<FacetEntry> = totals
        .iter()
        .map(|(name, total)| FacetEntry::new(name, total))
        .collect();

    // Names are unique map keys, so an unstable sort is deterministic
    entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// Wrap formatted totals in the response document
pub fn to_response(totals: &FacetTotals) -> FacetResponse {
    FacetResponse {
        result: format_totals(totals),
    }
}

/// Serialize a response as JSON text
pub fn response_to_string(response: &FacetResponse, pretty: bool) -> Result<String, OutputError> {
    let text = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    Ok(text)
}

/// Write a response to a JSON file
///
/// **Public** - used by the `aggregate` command
///
/// # Arguments
/// * `response` - Result document to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_response(
    response: &FacetResponse,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing result to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, response)?;

    info!(
        "Result written successfully ({} entries)",
        response.result.len()
    );

    Ok(())
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn sample_totals() -> FacetTotals {
        [("facet2", 0.0), ("facet10", 7.0), ("Facet", 1.0), ("facet1", 100.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_format_sorts_bytewise() {
        let names: Vec<String> = format_totals(&sample_totals())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Facet", "facet1", "facet10", "facet2"]);
    }

    #[test]
    fn test_format_empty() {
        assert!(format_totals(&FacetTotals::new()).is_empty());
    }

    #[test]
    fn test_format_is_idempotent() {
        let totals = sample_totals();
        assert_eq!(format_totals(&totals), format_totals(&totals));
    }

    #[test]
    fn test_response_to_string_compact() {
        let totals: FacetTotals = [("b", 2.0), ("a", 1.5)].into_iter().collect();
        let text = response_to_string(&to_response(&totals), false).unwrap();
        assert_eq!(text, r#"{"result":[{"a":1.5},{"b":2}]}"#);
    }

    #[test]
    fn test_write_response() {
        let response = to_response(&sample_totals());
        let temp_file = NamedTempFile::new().unwrap();

        write_response(&response, temp_file.path()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp_file.path()).unwrap()).unwrap();
        assert_eq!(written["result"][0], serde_json::json!({"Facet": 1}));
        assert_eq!(written["result"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/result.json");

        write_response(&to_response(&sample_totals()), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
