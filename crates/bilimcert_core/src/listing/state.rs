use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{
    apply_filters, clamp_page, paginate, sort_items, total_pages, DateRange, FilterState, Listable,
    SortConfig,
};
use crate::view_model::{ListingStatus, ListingView, PaginationView};
use crate::{ListEffect, ListMsg};

/// Monotonic id of a remote fetch; only the latest issued one is applied.
pub type RequestSeq = u64;

pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Featured items shown above the grid while no filter is active.
pub const FEATURED_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Whole collection held in memory, filtered and paginated locally.
    Static,
    /// Server filters and paginates; only the current page is held.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Failed(String),
    Loaded,
}

/// `{results, count, next, previous}` page of a remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage<T> {
    pub results: Vec<T>,
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Filters and page position for one remote fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub page_size: usize,
    pub search: Option<String>,
    pub category: Option<String>,
    pub date_range: Option<DateRange>,
    pub tags: Vec<String>,
    pub ordering: Option<String>,
}

impl ListQuery {
    /// Query-string pairs. Tags repeat the `tags` key once per tag.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        if let Some(range) = self.date_range {
            pairs.push(("date_range".to_string(), range.key().to_string()));
        }
        for tag in &self.tags {
            pairs.push(("tags".to_string(), tag.clone()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering".to_string(), ordering.clone()));
        }
        pairs
    }
}

/// Listing state for one page of the portal.
///
/// Every filter mutation resets the page to 1. In remote mode a mutation also
/// issues a new fetch with a fresh sequence number; completions carrying any
/// other sequence number are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    mode: ListMode,
    source: Vec<T>,
    filters: FilterState,
    sort: Option<SortConfig>,
    page: usize,
    page_size: usize,
    now: DateTime<Utc>,
    status: LoadStatus,
    remote_count: usize,
    remote_next: bool,
    remote_previous: bool,
    last_seq: RequestSeq,
    dirty: bool,
}

impl<T: Listable + Clone> ListState<T> {
    fn with_mode(mode: ListMode, page_size: usize, now: DateTime<Utc>) -> Self {
        Self {
            mode,
            source: Vec::new(),
            filters: FilterState::default(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
            now,
            status: LoadStatus::Loading,
            remote_count: 0,
            remote_next: false,
            remote_previous: false,
            last_seq: 0,
            dirty: true,
        }
    }

    /// Static listing waiting for `SourceLoaded`.
    pub fn new_static(page_size: usize, now: DateTime<Utc>) -> Self {
        Self::with_mode(ListMode::Static, page_size, now)
    }

    /// Static listing over an already available collection.
    pub fn with_items(items: Vec<T>, page_size: usize, now: DateTime<Utc>) -> Self {
        let mut state = Self::with_mode(ListMode::Static, page_size, now);
        state.source = items;
        state.status = LoadStatus::Loaded;
        state
    }

    /// Remote listing; returns the first fetch to run.
    pub fn new_remote(page_size: usize, now: DateTime<Utc>) -> (Self, Vec<ListEffect>) {
        let mut state = Self::with_mode(ListMode::Remote, page_size, now);
        let effects = vec![state.issue_fetch()];
        (state, effects)
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn last_seq(&self) -> RequestSeq {
        self.last_seq
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Filtered and sorted items of a static source.
    pub fn filtered(&self) -> Vec<T> {
        let mut items = match self.mode {
            ListMode::Static => apply_filters(&self.source, &self.filters, self.now),
            ListMode::Remote => self.source.clone(),
        };
        if let (ListMode::Static, Some(config)) = (self.mode, self.sort) {
            sort_items(&mut items, config);
        }
        items
    }

    pub fn query(&self) -> ListQuery {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        ListQuery {
            page: self.page,
            page_size: self.page_size,
            search: non_empty(self.filters.search()),
            category: non_empty(self.filters.category()),
            date_range: (self.filters.date_range() != DateRange::Any)
                .then_some(self.filters.date_range()),
            tags: self.filters.tags().iter().cloned().collect(),
            ordering: self.sort.map(SortConfig::ordering),
        }
    }

    pub fn view(&self) -> ListingView<T> {
        let filtered = self.filtered();

        let (items, pagination) = match self.mode {
            ListMode::Static => {
                let page = paginate(&filtered, self.page_size, self.page);
                let pagination = PaginationView {
                    current_page: page.current_page,
                    total_pages: page.total_pages,
                    total_items: page.total_items,
                    start_index: page.start_index,
                    end_index: page.end_index,
                    has_next: page.has_next(),
                    has_previous: page.has_previous(),
                };
                (page.items, pagination)
            }
            ListMode::Remote => {
                let start_index = (self.page - 1) * self.page_size;
                let pagination = PaginationView {
                    current_page: self.page,
                    total_pages: total_pages(self.remote_count, self.page_size),
                    total_items: self.remote_count,
                    start_index,
                    end_index: start_index + filtered.len(),
                    has_next: self.remote_next,
                    has_previous: self.remote_previous,
                };
                (filtered, pagination)
            }
        };

        let featured = if self.filters.is_active() {
            Vec::new()
        } else {
            self.source
                .iter()
                .filter(|item| item.is_featured())
                .take(FEATURED_LIMIT)
                .cloned()
                .collect()
        };

        let mut category_counts = BTreeMap::new();
        for item in &self.source {
            *category_counts.entry(item.category_key()).or_insert(0) += 1;
        }

        let status = match &self.status {
            LoadStatus::Loading => ListingStatus::Loading,
            LoadStatus::Failed(message) => ListingStatus::Error(message.clone()),
            LoadStatus::Loaded if pagination.total_items == 0 => ListingStatus::Empty,
            LoadStatus::Loaded => ListingStatus::Ready,
        };

        ListingView {
            items,
            featured,
            pagination,
            chips: self.filters.chips(),
            status,
            category_counts,
            sort: self.sort,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn issue_fetch(&mut self) -> ListEffect {
        self.last_seq += 1;
        self.status = LoadStatus::Loading;
        ListEffect::Fetch {
            seq: self.last_seq,
            query: self.query(),
        }
    }

    fn filters_changed(&mut self, changed: bool) -> Vec<ListEffect> {
        if !changed {
            return Vec::new();
        }
        self.page = 1;
        self.dirty = true;
        match self.mode {
            ListMode::Static => Vec::new(),
            ListMode::Remote => vec![self.issue_fetch()],
        }
    }

    fn clamp_to_filtered(&mut self) {
        if self.mode == ListMode::Static {
            let count = apply_filters(&self.source, &self.filters, self.now).len();
            self.page = clamp_page(self.page, total_pages(count, self.page_size));
        }
    }
}

/// Pure listing update: applies a message to state and returns any effects.
pub fn update_listing<T: Listable + Clone>(
    mut state: ListState<T>,
    msg: ListMsg<T>,
) -> (ListState<T>, Vec<ListEffect>) {
    let effects = match msg {
        ListMsg::SearchChanged(search) => {
            let changed = state.filters.set_search(search);
            state.filters_changed(changed)
        }
        ListMsg::CategorySelected(category) => {
            let changed = state.filters.select_category(&category);
            state.filters_changed(changed)
        }
        ListMsg::DateRangeSelected(range) => {
            let changed = state.filters.select_date_range(range);
            state.filters_changed(changed)
        }
        ListMsg::TagToggled(tag) => {
            let changed = state.filters.toggle_tag(&tag);
            state.filters_changed(changed)
        }
        ListMsg::FilterRemoved(filter) => {
            let changed = state.filters.remove(&filter);
            state.filters_changed(changed)
        }
        ListMsg::FiltersCleared => {
            let changed = state.filters.clear();
            state.filters_changed(changed)
        }
        ListMsg::SortBy(field) => {
            state.sort = Some(SortConfig::toggled(state.sort, field));
            state.filters_changed(true)
        }
        ListMsg::PageSelected(page) => {
            let total = match state.mode {
                ListMode::Static => total_pages(
                    apply_filters(&state.source, &state.filters, state.now).len(),
                    state.page_size,
                ),
                ListMode::Remote => total_pages(state.remote_count, state.page_size),
            };
            let page = clamp_page(page, total);
            if page == state.page {
                Vec::new()
            } else {
                state.page = page;
                state.dirty = true;
                match state.mode {
                    ListMode::Static => Vec::new(),
                    ListMode::Remote => vec![state.issue_fetch()],
                }
            }
        }
        ListMsg::SourceLoaded(items) => {
            if state.mode == ListMode::Static {
                state.source = items;
                state.status = LoadStatus::Loaded;
                state.clamp_to_filtered();
                state.dirty = true;
            }
            Vec::new()
        }
        ListMsg::SourceFailed(message) => {
            if state.mode == ListMode::Static {
                state.status = LoadStatus::Failed(message);
                state.dirty = true;
            }
            Vec::new()
        }
        ListMsg::Refresh => match state.mode {
            ListMode::Static => Vec::new(),
            ListMode::Remote => {
                state.dirty = true;
                vec![state.issue_fetch()]
            }
        },
        ListMsg::FetchCompleted { seq, result } => {
            // Superseded responses must not overwrite fresher state.
            if state.mode != ListMode::Remote || seq != state.last_seq {
                return (state, Vec::new());
            }
            match result {
                Ok(page) => {
                    state.remote_count = page.count;
                    state.remote_next = page.next.is_some();
                    state.remote_previous = page.previous.is_some();
                    state.source = page.results;
                    state.status = LoadStatus::Loaded;
                }
                Err(message) => state.status = LoadStatus::Failed(message),
            }
            state.dirty = true;
            Vec::new()
        }
        ListMsg::Tick { now } => {
            if state.now != now {
                state.now = now;
                state.clamp_to_filtered();
                state.dirty = true;
            }
            Vec::new()
        }
    };

    (state, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{RegistryEntry, SortField};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn entries(count: u64) -> Vec<RegistryEntry> {
        (1..=count)
            .map(|id| RegistryEntry {
                id,
                title: format!("Entry {id:02}"),
                description: String::new(),
                category: if id % 2 == 0 { "npa" } else { "seminars" }.to_string(),
                tags: Vec::new(),
                published_at: Some("2024-01-10".to_string()),
                document_url: None,
            })
            .collect()
    }

    #[test]
    fn query_omits_default_filters() {
        let (state, effects) = ListState::<RegistryEntry>::new_remote(9, now());
        assert_eq!(
            effects,
            vec![ListEffect::Fetch {
                seq: 1,
                query: ListQuery {
                    page: 1,
                    page_size: 9,
                    search: None,
                    category: None,
                    date_range: None,
                    tags: Vec::new(),
                    ordering: None,
                }
            }]
        );
        assert_eq!(
            state.query().to_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("page_size".to_string(), "9".to_string())
            ]
        );
    }

    #[test]
    fn sorting_by_title_descending() {
        let state = ListState::with_items(entries(3), 9, now());
        let (state, _) = update_listing(state, ListMsg::SortBy(SortField::Title));
        let (state, _) = update_listing(state, ListMsg::SortBy(SortField::Title));
        let titles: Vec<_> = state.view().items.into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Entry 03", "Entry 02", "Entry 01"]);
    }

    #[test]
    fn page_selection_is_clamped() {
        let state = ListState::with_items(entries(20), 9, now());
        let (state, _) = update_listing(state, ListMsg::PageSelected(7));
        assert_eq!(state.current_page(), 3);
        let (state, _) = update_listing(state, ListMsg::PageSelected(0));
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn category_counts_cover_whole_source() {
        let state = ListState::with_items(entries(5), 9, now());
        let (state, _) = update_listing(state, ListMsg::CategorySelected("npa".into()));
        let view = state.view();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.category_counts.get("npa"), Some(&2));
        assert_eq!(view.category_counts.get("seminars"), Some(&3));
    }
}
