use serde_json::{json, Value};

use crate::config;
use crate::hypermedia::Link;

/// Page metadata for a collection response.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
}

impl PageMeta {
    pub fn total_pages(&self) -> usize {
        if self.total_count == 0 {
            1
        } else {
            self.total_count.div_ceil(self.page_size)
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}

/// Normalize raw page/page_size query values against configured bounds.
pub fn clamp_paging(page: Option<usize>, page_size: Option<usize>) -> (usize, usize) {
    let cfg = &config::config().api;
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(cfg.default_page_size)
        .clamp(1, cfg.max_page_size);
    (page, page_size)
}

/// The collection envelope. `links` is present only in hypermedia mode.
pub fn collection_body(items: Vec<Value>, meta: PageMeta, links: Option<Vec<Link>>) -> Value {
    let mut body = json!({
        "items": items,
        "page": meta.page,
        "pageSize": meta.page_size,
        "totalCount": meta.total_count,
        "totalPages": meta.total_pages(),
        "hasNextPage": meta.has_next_page(),
        "hasPreviousPage": meta.has_previous_page(),
    });

    if let Some(links) = links {
        body["links"] = json!(links);
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let meta = PageMeta { page: 1, page_size: 10, total_count: 25 };
        assert_eq!(meta.total_pages(), 3);
        assert!(meta.has_next_page());
        assert!(!meta.has_previous_page());
    }

    #[test]
    fn empty_collection_is_one_page() {
        let meta = PageMeta { page: 1, page_size: 10, total_count: 0 };
        assert_eq!(meta.total_pages(), 1);
        assert!(!meta.has_next_page());
    }

    #[test]
    fn envelope_omits_links_outside_hypermedia_mode() {
        let meta = PageMeta { page: 2, page_size: 10, total_count: 25 };
        let body = collection_body(vec![], meta, None);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["hasPreviousPage"], true);
        assert!(body.get("links").is_none());
    }
}
