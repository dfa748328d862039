use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: first_page() }
    }
}

impl PageRequest {
    #[cfg(test)]
    pub fn new(page: i64) -> Self {
        Self { page }
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    /// Pages before the first are pushed past any real data so they come back empty.
    pub fn offset(&self) -> i64 {
        if self.page < 1 {
            i64::MAX / 2
        } else {
            (self.page - 1).saturating_mul(PAGE_SIZE)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub number: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, items: Vec<T>, total_items: i64) -> Self {
        let total_pages = (total_items + PAGE_SIZE - 1) / PAGE_SIZE;
        let in_range = request.page >= 1 && request.page <= total_pages;

        Self {
            number: request.page,
            page_size: PAGE_SIZE,
            total_items,
            total_pages,
            has_previous: in_range && request.page > 1,
            has_next: in_range && request.page < total_pages,
            items,
        }
    }
}
