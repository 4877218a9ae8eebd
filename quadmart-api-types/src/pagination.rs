//! Offset/limit pagination envelope shared by every collection endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Raw `?limit=&offset=` query parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A resolved page: limit clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl PageQuery {
    pub fn resolve(self) -> Page {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Page {
            limit,
            offset: self.offset.unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub page_size: u64,
    pub offset: u64,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Builds the envelope for one page of `results` out of `count` total
    /// rows. `path` is the collection path the links should point back at;
    /// links are root-relative since the service does not know its origin.
    pub fn new(path: &str, page: Page, count: u64, results: Vec<T>) -> Self {
        let next = (page.offset + page.limit < count)
            .then(|| page_link(path, page.limit, page.offset + page.limit));
        let previous = (page.offset > 0)
            .then(|| page_link(path, page.limit, page.offset.saturating_sub(page.limit)));
        Paginated {
            count,
            next,
            previous,
            page_size: page.limit,
            offset: page.offset,
            results,
        }
    }
}

fn page_link(path: &str, limit: u64, offset: u64) -> String {
    if offset == 0 {
        format!("{path}?limit={limit}")
    } else {
        format!("{path}?limit={limit}&offset={offset}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_to_25() {
        let page = PageQuery::default().resolve();
        assert_eq!(
            page,
            Page {
                limit: 25,
                offset: 0
            }
        );
    }

    #[test]
    fn limit_is_capped_at_100() {
        let page = PageQuery {
            limit: Some(500),
            offset: Some(10),
        }
        .resolve();
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset, 10);
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        assert_eq!(PageQuery { limit: Some(0), offset: None }.resolve().limit, 1);
    }

    #[test]
    fn first_page_has_no_previous() {
        let page = Page {
            limit: 25,
            offset: 0,
        };
        let envelope = Paginated::new("/market/listings", page, 60, vec![1, 2, 3]);
        assert_eq!(envelope.previous, None);
        assert_eq!(
            envelope.next.as_deref(),
            Some("/market/listings?limit=25&offset=25")
        );
        assert_eq!(envelope.count, 60);
        assert_eq!(envelope.page_size, 25);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = Page {
            limit: 25,
            offset: 25,
        };
        let envelope: Paginated<i32> = Paginated::new("/market/listings", page, 60, vec![]);
        assert_eq!(
            envelope.next.as_deref(),
            Some("/market/listings?limit=25&offset=50")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("/market/listings?limit=25")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Page {
            limit: 25,
            offset: 50,
        };
        let envelope: Paginated<i32> = Paginated::new("/market/listings", page, 60, vec![]);
        assert_eq!(envelope.next, None);
        assert_eq!(
            envelope.previous.as_deref(),
            Some("/market/listings?limit=25&offset=25")
        );
    }
}
