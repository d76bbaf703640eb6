//! Filtering, sorting and pagination over static or remotely fetched
//! collections.
mod filter;
mod news;
mod paginate;
mod sort;
mod state;

pub use filter::{
    apply_filters, normalize_category, parse_published_at, ActiveFilter, DateRange, FilterState,
};
pub use news::{Listable, NewsAuthor, NewsCategory, NewsItem, RegistryEntry};
pub use paginate::{clamp_page, paginate, total_pages, Page};
pub use sort::{sort_items, SortConfig, SortDirection, SortField};
pub use state::{
    update_listing, ListMode, ListQuery, ListState, LoadStatus, RemotePage, RequestSeq,
    DEFAULT_PAGE_SIZE, FEATURED_LIMIT,
};
