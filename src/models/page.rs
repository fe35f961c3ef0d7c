use serde::{Deserialize, Serialize};

/// Rows shown per page by both list views.
pub const PAGE_SIZE: usize = 8;

/// One page of a filtered result set plus the totals pagination controls need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slices `rows` for the 1-indexed `page`. Page 0 is treated as page 1;
    /// a page past the end yields no items but keeps the totals.
    pub fn slice(rows: &[T], page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let total = rows.len();
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);

        Self {
            items: rows[start..end].to_vec(),
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        }
    }
}
