//! Skip-token pagination.
//!
//! List operations return one page plus an optional continuation token.
//! [`collect_pages`] drives a [`PageSource`] until the token runs out, or
//! stops after the first page when only one page was asked for.

use std::future::Future;

use crate::core::models::Page;
use crate::error::Result;

/// Something that can fetch one page given the previous continuation token.
pub trait PageSource {
    type Page: Page;

    fn fetch_page(
        &mut self,
        skip_token: Option<String>,
    ) -> impl Future<Output = Result<Self::Page>>;
}

/// Fetch the first page, and every following page when `all` is set.
///
/// An empty or absent continuation token ends the loop.
///
/// # Errors
/// Returns the first error reported by the source; items already collected
/// are discarded.
pub async fn collect_pages<S: PageSource>(
    source: &mut S,
    all: bool,
) -> Result<Vec<<S::Page as Page>::Item>> {
    let mut items = Vec::new();
    let mut skip_token = None;
    let mut pages = 0usize;

    loop {
        let (page_items, next) = source.fetch_page(skip_token).await?.into_parts();
        pages += 1;
        items.extend(page_items);

        match next.filter(|t| !t.is_empty()) {
            Some(token) if all => skip_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(pages, items = items.len(), "pagination finished");
    Ok(items)
}
