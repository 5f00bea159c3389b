//! Drains a cursor-paginated node listing into a single element set.
//!
//! The loop trusts the service to terminate: it stops on a page without a
//! `next` cursor or with a non-positive `size`, and nothing else. A service
//! that keeps handing out non-empty pages with fresh cursors will keep the
//! loop running.

use crate::ports::GraphService;
use anyhow::Context;
use dtpfix_types::node::{ElementNode, Page};
use tracing::{debug, warn};

/// Every element node the service returned, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSet {
    pub items: Vec<ElementNode>,
    /// Sum of the reported page sizes.
    pub size: i64,
    pub pages: u64,
}

/// Fetch all pages via `fetch_page`.
///
/// The first call passes `None`. Further pages are requested while the last
/// page has a `next` cursor and a non-zero size. A follow-up page with
/// `size <= 0` ends the stream and is not appended.
pub fn fetch_all<F>(mut fetch_page: F) -> anyhow::Result<ElementSet>
where
    F: FnMut(Option<&str>) -> anyhow::Result<Page>,
{
    let first = fetch_page(None).context("fetch first page of element nodes")?;
    check_page_size(&first);

    let mut last_size = first.size;
    let mut next = first.next;
    let mut set = ElementSet {
        items: first.items,
        size: first.size,
        pages: 1,
    };

    while let Some(cursor) = next.take()
        && last_size != 0
    {
        let page = fetch_page(Some(&cursor))
            .with_context(|| format!("fetch element nodes at cursor {cursor}"))?;
        if page.size <= 0 {
            debug!(cursor = cursor.as_str(), size = page.size, "end of node stream");
            break;
        }
        check_page_size(&page);

        set.size += page.size;
        set.pages += 1;
        set.items.extend(page.items);
        last_size = page.size;
        next = page.next;
    }

    debug!(pages = set.pages, size = set.size, "fetched element nodes");
    Ok(set)
}

/// [`fetch_all`] against a [`GraphService`].
pub fn fetch_all_element_nodes(service: &dyn GraphService) -> anyhow::Result<ElementSet> {
    fetch_all(|cursor| service.fetch_element_nodes(cursor))
}

fn check_page_size(page: &Page) {
    if page.size != page.items.len() as i64 {
        warn!(
            size = page.size,
            items = page.items.len(),
            "page size does not match item count"
        );
    }
}
