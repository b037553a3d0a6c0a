//! Derive a listing view from a catalog file.
//!
//! # Usage
//!
//! ```bash
//! cv-cli view --catalog products.json --query "filter.Color=Red&sort=price-asc&page=2"
//! cv-cli view --catalog products.yaml --page-size 24
//! ```
//!
//! The catalog is a list of products, either bare or under a `products` key.
//! The view is derived client-side with offset pagination and printed as JSON.

use std::num::NonZeroUsize;
use std::path::Path;

use collection_view_core::{
    Catalog, CollectionView, PageState, Pagination, Product, ProductPage, QueryParams, SourceMode,
    ViewAction, ViewController,
};
use serde::{Deserialize, Serialize};

use super::{CliError, emit};

/// Accepted catalog file layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

impl From<CatalogFile> for Vec<Product> {
    fn from(file: CatalogFile) -> Self {
        match file {
            CatalogFile::List(products) | CatalogFile::Wrapped { products } => products,
        }
    }
}

/// Catalog file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the encoding from the file extension. Anything but YAML is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// What `view` prints.
#[derive(Debug, Serialize)]
pub struct ViewOutput {
    pub view: CollectionView,
    pub query: String,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Parse catalog file contents.
///
/// # Errors
///
/// Returns an error if the contents are not a valid catalog.
pub fn parse_catalog(contents: &str, format: Format) -> Result<Vec<Product>, CliError> {
    let file: CatalogFile = match format {
        Format::Json => serde_json::from_str(contents)?,
        Format::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(file.into())
}

/// Derive the view for `query` over `products`.
#[must_use]
pub fn derive(products: Vec<Product>, query: &str, page_size: NonZeroUsize) -> ViewOutput {
    let mut controller = ViewController::new(SourceMode::ClientSide, page_size);
    let page = ProductPage::unpaginated(Catalog::new(products));
    let view = controller
        .commit(&QueryParams::parse(query), Some(page))
        .clone();

    // The offset window clamps out-of-range pages.
    let settled = match &view.pagination {
        Pagination::Offset { page, .. } => {
            controller.state().clone().with_page(PageState::offset(*page))
        }
        Pagination::Cursor(_) => controller.state().clone(),
    };
    let query = controller.codec().encode_to_string(&settled);
    let next = controller
        .dispatch(ViewAction::NextPage)
        .map(|navigation| navigation.query.to_query_string());
    // Navigations build on the pending target; settle back first.
    controller.commit(&QueryParams::parse(&query), None);
    let previous = controller
        .dispatch(ViewAction::PreviousPage)
        .map(|navigation| navigation.query.to_query_string());

    ViewOutput {
        view,
        query,
        next,
        previous,
    }
}

/// Run the `view` command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or parsed.
pub fn run(catalog: &Path, query: &str, page_size: NonZeroUsize) -> Result<(), CliError> {
    let contents = std::fs::read_to_string(catalog).map_err(|source| CliError::Read {
        path: catalog.display().to_string(),
        source,
    })?;
    let products = parse_catalog(&contents, Format::from_path(catalog))?;
    tracing::debug!(count = products.len(), "Loaded catalog");

    let output = derive(products, query, page_size);
    emit(&serde_json::to_string_pretty(&output)?)
}
