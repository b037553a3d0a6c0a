//! Collection View CLI - offline listing tools.
//!
//! # Usage
//!
//! ```bash
//! # Derive the view a listing URL would show over a catalog export
//! cv-cli view --catalog products.json --query "filter.Color=Red&sort=price-asc"
//!
//! # Print the canonical form of a listing query string
//! cv-cli canonicalize --query "tag=b&tag=a&page=1"
//! cv-cli canonicalize --mode cursor --query "cursor=abc&sort=newest"
//! ```
//!
//! # Commands
//!
//! - `view` - Filter, sort and paginate a catalog file, print the view as JSON
//! - `canonicalize` - Rewrite a query string in canonical form

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use collection_view_core::PaginationMode;

mod commands;

#[derive(Parser)]
#[command(name = "cv-cli")]
#[command(author, version, about = "Collection View CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a listing view from a catalog file
    View {
        /// Catalog file (.json, .yaml or .yml)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Listing query string, with or without the leading `?`
        #[arg(short, long, default_value = "")]
        query: String,

        /// Products per page
        #[arg(short, long, default_value = "12", env = "COLLECTION_PAGE_SIZE")]
        page_size: NonZeroUsize,
    },
    /// Print the canonical form of a query string
    Canonicalize {
        /// Listing query string, with or without the leading `?`
        #[arg(short, long)]
        query: String,

        /// Pagination scheme the query belongs to
        #[arg(short, long, value_enum, default_value_t = Mode::Offset)]
        mode: Mode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Numbered pages (`page=N`)
    Offset,
    /// Opaque cursors (`cursor=` / `before=`)
    Cursor,
}

impl From<Mode> for PaginationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Offset => Self::Offset,
            Mode::Cursor => Self::Cursor,
        }
    }
}

fn main() {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::View {
            catalog,
            query,
            page_size,
        } => commands::view::run(&catalog, &query, page_size),
        Commands::Canonicalize { query, mode } => {
            commands::canonicalize::run(&query, mode.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_view_args() {
        let cli = Cli::try_parse_from([
            "cv-cli",
            "view",
            "--catalog",
            "products.yaml",
            "--query",
            "sort=newest",
            "--page-size",
            "24",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        match cli.command {
            Commands::View {
                catalog, page_size, ..
            } => {
                assert_eq!(catalog, PathBuf::from("products.yaml"));
                assert_eq!(page_size.get(), 24);
            }
            Commands::Canonicalize { .. } => panic!("expected view"),
        }
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let result = Cli::try_parse_from([
            "cv-cli",
            "view",
            "--catalog",
            "products.json",
            "--page-size",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_canonicalize_mode() {
        let cli = Cli::try_parse_from(["cv-cli", "canonicalize", "-q", "page=2", "-m", "cursor"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Canonicalize {
                mode: Mode::Cursor,
                ..
            }
        ));
    }
}
