//! Document Cache: the last fetched page and its total, held as one value.
//!
//! Only the workflow engine writes to it, and only by replacing the whole
//! page with a server response. There is no in-place patching.

use docflow_core::store::Receiver;
use docflow_core::{DocumentId, ListResponse, Store};

use crate::document::Document;
use crate::query::DocumentListRequest;

/// One page of documents together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentPage {
    pub items: Vec<Document>,
    /// Server-reported total for the active filter.
    pub total_count: u64,
    pub request: DocumentListRequest,
}

impl DocumentPage {
    pub fn page(&self) -> u32 {
        self.request.page.page
    }

    pub fn page_size(&self) -> u32 {
        self.request.page.size
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentCache {
    state: Store<DocumentPage>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held page with a server response.
    pub(crate) fn replace(&self, request: DocumentListRequest, response: ListResponse<Document>) {
        let ListResponse { mut results, count } = response;
        let size = request.page.size as usize;
        if results.len() > size {
            tracing::warn!(
                returned = results.len(),
                page_size = size,
                "server returned more rows than requested, truncating"
            );
            results.truncate(size);
        }

        tracing::debug!(
            page = request.page.page,
            items = results.len(),
            total = count,
            "document page replaced"
        );
        self.state.set(DocumentPage {
            items: results,
            total_count: count,
            request,
        });
    }

    pub(crate) fn clear(&self) {
        self.state.set(DocumentPage::default());
    }

    pub fn snapshot(&self) -> DocumentPage {
        self.state.get()
    }

    pub fn subscribe(&self) -> Receiver<DocumentPage> {
        self.state.subscribe()
    }

    /// The request that produced the held page; re-used by refreshes.
    pub fn active_request(&self) -> DocumentListRequest {
        self.state.with(|p| p.request.clone())
    }

    pub fn total_count(&self) -> u64 {
        self.state.with(|p| p.total_count)
    }

    pub fn find(&self, id: &DocumentId) -> Option<Document> {
        self.state
            .with(|p| p.items.iter().find(|d| d.id.as_ref() == Some(id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;
    use docflow_core::PageRequest;

    fn doc(id: &str) -> Document {
        Document {
            id: Some(DocumentId::new(id)),
            name: id.to_string(),
            status: DocumentStatus::Draft,
            file_url: String::new(),
            creator: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn replace_swaps_items_and_total_together() {
        let cache = DocumentCache::new();
        let mut rx = cache.subscribe();

        cache.replace(
            DocumentListRequest::default(),
            ListResponse {
                results: vec![doc("a"), doc("b")],
                count: 12,
            },
        );

        assert!(rx.has_changed().unwrap());
        let page = rx.borrow_and_update().clone();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 12);
        assert!(cache.find(&DocumentId::new("b")).is_some());
        assert!(cache.find(&DocumentId::new("z")).is_none());
    }

    #[test]
    fn replace_never_exceeds_page_size() {
        let cache = DocumentCache::new();
        let request = DocumentListRequest::default().with_page(PageRequest::first(2));

        cache.replace(
            request.clone(),
            ListResponse {
                results: vec![doc("a"), doc("b"), doc("c")],
                count: 3,
            },
        );

        let page = cache.snapshot();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page_size(), 2);
        assert_eq!(cache.active_request(), request);
    }

    #[test]
    fn clear_resets_to_empty_default_page() {
        let cache = DocumentCache::new();
        cache.replace(
            DocumentListRequest::default(),
            ListResponse {
                results: vec![doc("a")],
                count: 1,
            },
        );
        cache.clear();
        assert!(cache.snapshot().is_empty());
        assert_eq!(cache.total_count(), 0);
    }
}
