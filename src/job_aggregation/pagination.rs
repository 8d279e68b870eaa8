// src/job_aggregation/pagination.rs

pub const PAGE_SIZE: usize = 100;

#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub has_more: bool,
}

pub fn page<T>(items: &[T], offset: usize, page_size: usize) -> Page<'_, T> {
    let start = offset.min(items.len());
    let end = offset.saturating_add(page_size).min(items.len());
    Page {
        items: &items[start..end],
        has_more: offset.saturating_add(page_size) < items.len(),
    }
}
