//! Collection route handlers.
//!
//! Collection listings are filtered, sorted and paginated by Shopify; the
//! engine only shapes the response.

use axum::extract::{Path, RawQuery, State};
use collection_view_core::{UrlCodec, ViewEngine};
use tracing::instrument;

use super::ViewResponse;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::shopify::filters::upstream_source;
use crate::state::AppState;

/// Shopify handles are lowercase words joined by hyphens.
fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// One page of a collection.
#[instrument(skip(state, query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<ViewResponse> {
    if !is_valid_handle(&handle) {
        return Err(AppError::BadRequest(format!("invalid collection handle: {handle}")));
    }

    let source = upstream_source();
    let codec = UrlCodec::new(source.pagination_mode());
    let view_state = codec.decode_str(query.as_deref().unwrap_or_default());

    let page_size = state.config().catalog.page_size;
    let first = u32::try_from(page_size.get()).unwrap_or(u32::MAX);
    let fetched = state
        .catalog()
        .collection(&handle, &view_state, first)
        .await?;

    add_breadcrumb("navigation", "Viewed collection", Some(&[("handle", &handle)]));

    let engine = ViewEngine::new(source, page_size);
    Ok(ViewResponse::derive(&engine, &codec, &view_state, &fetched))
}
