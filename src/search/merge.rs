use crate::api::types::{Entry, ResultPage};

/// Result of merging a fetched page into the current list.
pub struct MergedResults {
    pub items: Vec<Entry>,
    pub has_more: bool,
    pub total_count: u64,
}

/// Merges a freshly fetched page into the current result list.
///
/// Page 1 replaces the list wholesale (query change or refresh); later pages
/// append in arrival order. No de-duplication happens here: duplicate ids are
/// a backend data-quality issue, reported through the duplicate listing
/// instead of silently papered over. `has_more` and `total_count` always come
/// from the latest page, so a defensively decoded empty page ends pagination.
pub fn merge_page(current: Vec<Entry>, page: ResultPage) -> MergedResults {
    let items = if page.current_page <= 1 {
        page.items
    } else {
        let mut items = current;
        items.extend(page.items);
        items
    };

    MergedResults {
        items,
        has_more: page.has_more,
        total_count: page.total_count,
    }
}
