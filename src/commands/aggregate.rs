//! Aggregate command implementation.
//!
//! The aggregate command:
//! 1. Opens the input document
//! 2. Runs the selected strategy over it
//! 3. Prints the result or writes it to a file

use crate::aggregator::{self, Strategy};
use crate::output::{response_to_string, write_response};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the aggregate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AggregateArgs {
    /// Input document (`{"data": {...}}`)
    pub input: PathBuf,

    /// Aggregation strategy
    pub strategy: Strategy,

    /// Output path for the result JSON (stdout if omitted)
    pub output: Option<PathBuf>,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("facets.json"),
            strategy: Strategy::Streaming,
            output: None,
        }
    }
}

/// Execute the aggregate command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Aggregate command arguments
///
/// # Errors
/// * Input file cannot be opened
/// * Malformed input or non-numeric counts
/// * Output file cannot be written
pub fn execute_aggregate(args: AggregateArgs) -> Result<()> {
    let start_time = Instant::now();

    info!(
        "Aggregating {} with {} strategy",
        args.input.display(),
        args.strategy
    );

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open input file {}", args.input.display()))?;

    let response = aggregator::process(args.strategy, BufReader::new(file))
        .context("Failed to aggregate facets")?;

    debug!("Computed {} facet totals", response.result.len());

    match &args.output {
        Some(path) => {
            write_response(&response, path).context("Failed to write result")?;
        }
        None => {
            let text = response_to_string(&response, false).context("Failed to format result")?;
            println!("{}", text);
        }
    }

    info!(
        "Aggregation complete in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Validate aggregate arguments
///
/// **Public** - called before execute_aggregate
///
/// # Errors
/// * Input path is empty, missing, or not a regular file
pub fn validate_args(args: &AggregateArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    if !args.input.is_file() {
        anyhow::bail!("Input path is not a file: {}", args.input.display());
    }

    if let Some(output) = &args.output {
        if output.as_os_str().is_empty() {
            anyhow::bail!("Output path cannot be empty");
        }
        if output == &args.input {
            anyhow::bail!("Output path must differ from the input path");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn input_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_validate_args_valid() {
        let file = input_file(r#"{"data": {}}"#);
        let args = AggregateArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_empty_input() {
        let args = AggregateArgs {
            input: PathBuf::new(),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = AggregateArgs {
            input: dir.path().join("missing.json"),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = AggregateArgs {
            input: dir.path().to_path_buf(),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_output_same_as_input() {
        let file = input_file(r#"{"data": {}}"#);
        let args = AggregateArgs {
            input: file.path().to_path_buf(),
            output: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_execute_writes_output() {
        let file = input_file(r#"{"data": {"b": {"count": 2}, "a": {"count": 1}}}"#);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("result.json");

        let args = AggregateArgs {
            input: file.path().to_path_buf(),
            strategy: Strategy::Buffered,
            output: Some(output.clone()),
        };
        execute_aggregate(args).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({"result": [{"a": 1}, {"b": 2}]})
        );
    }

    #[test]
    fn test_execute_rejects_bad_document() {
        let file = input_file(r#"{"data": {"f": {"count": "abc"}}}"#);
        let args = AggregateArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };

        assert!(execute_aggregate(args).is_err());
    }
}
