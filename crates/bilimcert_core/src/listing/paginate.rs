/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped.
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Inclusive 0-based start index.
    pub start_index: usize,
    /// Exclusive 0-based end index.
    pub end_index: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// `ceil(count / page_size)`; a zero page size is treated as one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Clamps `page` into `[1, total_pages]`, or to 1 when there are no pages.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn paginate<T: Clone>(items: &[T], page_size: usize, page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let current_page = clamp_page(page, total_pages);
    let start_index = ((current_page - 1) * page_size).min(total_items);
    let end_index = (start_index + page_size).min(total_items);

    Page {
        items: items[start_index..end_index].to_vec(),
        current_page,
        total_pages,
        total_items,
        start_index,
        end_index,
    }
}
