//! Rewrite a listing query string in canonical form.
//!
//! # Usage
//!
//! ```bash
//! cv-cli canonicalize --query "tag=b&tag=a&utm_source=x&page=1"
//! # tag=a,b
//!
//! cv-cli canonicalize --mode cursor --query "cursor=abc&sort=newest"
//! # sort=newest&cursor=abc
//! ```

use collection_view_core::{PaginationMode, UrlCodec};

use super::{CliError, emit};

/// Canonical form of `query` for a pagination mode.
#[must_use]
pub fn canonical(query: &str, mode: PaginationMode) -> String {
    UrlCodec::new(mode).canonicalize(query)
}

/// Run the `canonicalize` command.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run(query: &str, mode: PaginationMode) -> Result<(), CliError> {
    emit(&canonical(query, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_drops_defaults_and_unknown_params() {
        assert_eq!(
            canonical("tag=b&tag=a&utm_source=x&page=1&sort=relevance", PaginationMode::Offset),
            "tag=a,b"
        );
    }

    #[test]
    fn test_canonical_orders_params() {
        assert_eq!(
            canonical("page=3&sort=price-descending&available=true", PaginationMode::Offset),
            "sort=price-desc&available=1&page=3"
        );
    }

    #[test]
    fn test_canonical_cursor_mode() {
        assert_eq!(
            canonical("cursor=abc&sort=newest&page=4", PaginationMode::Cursor),
            "sort=newest&cursor=abc"
        );
    }
}
