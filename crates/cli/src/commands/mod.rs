//! CLI command implementations.

pub mod canonicalize;
pub mod view;

use std::io::Write;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The catalog file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON.
    #[error("Invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog file is not valid YAML.
    #[error("Invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing the output failed.
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

/// Write one line to stdout.
fn emit(line: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
}
