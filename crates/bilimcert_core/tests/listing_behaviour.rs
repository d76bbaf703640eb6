use std::collections::BTreeSet;
use std::sync::Once;

use bilimcert_core::listing::{
    paginate, update_listing, ActiveFilter, DateRange, ListState, NewsCategory, NewsItem,
    RemotePage,
};
use bilimcert_core::{ListEffect, ListMsg, ListingStatus};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(portal_logging::initialize_for_tests);
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn news(id: u64, title: &str, category: &str, tags: &[&str], days_ago: i64) -> NewsItem {
    NewsItem {
        id,
        title: title.to_string(),
        slug: format!("news-{id}"),
        excerpt: String::new(),
        content: String::new(),
        image: None,
        category: NewsCategory {
            id: 1,
            name: category.to_string(),
            slug: category.to_string(),
            color: None,
        },
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        author: None,
        views_count: id * 10,
        published_at: Some((now() - TimeDelta::days(days_ago)).to_rfc3339()),
        featured: id <= 3,
    }
}

fn twenty_three() -> Vec<NewsItem> {
    (1..=23)
        .map(|id| {
            let category = if id <= 5 { "accreditation" } else { "events" };
            news(id, &format!("Жаңалық {id}"), category, &[], id as i64)
        })
        .collect()
}

fn ids(items: &[NewsItem]) -> Vec<u64> {
    items.iter().map(|item| item.id).collect()
}

#[test]
fn filter_change_resets_stale_page() {
    init_logging();
    let state = ListState::with_items(twenty_three(), 9, now());
    let (state, _) = update_listing(state, ListMsg::PageSelected(3));
    assert_eq!(state.view().pagination.current_page, 3);
    assert_eq!(state.view().items.len(), 5);

    let (state, effects) =
        update_listing(state, ListMsg::CategorySelected("Accreditation".into()));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.pagination.current_page, 1);
    assert_eq!(view.pagination.total_pages, 1);
    assert_eq!(ids(&view.items), vec![1, 2, 3, 4, 5]);
    assert_eq!(view.status, ListingStatus::Ready);
}

#[test]
fn every_filter_mutation_resets_page() {
    init_logging();
    let mutations: Vec<ListMsg<NewsItem>> = vec![
        ListMsg::SearchChanged("жаң".into()),
        ListMsg::CategorySelected("events".into()),
        ListMsg::DateRangeSelected(DateRange::Year),
        ListMsg::TagToggled("x".into()),
        ListMsg::FiltersCleared,
    ];
    let mut state = ListState::with_items(twenty_three(), 9, now());
    for msg in mutations {
        let (moved, _) = update_listing(state, ListMsg::PageSelected(2));
        let (next, _) = update_listing(moved, msg.clone());
        assert_eq!(next.current_page(), 1, "{msg:?}");
        state = next;
    }
}

#[test]
fn tags_are_or_matched() {
    init_logging();
    let items = vec![
        news(1, "a", "events", &["A"], 1),
        news(2, "b", "events", &["B"], 1),
        news(3, "ab", "events", &["A", "B"], 1),
        news(4, "c", "events", &["C"], 1),
    ];
    let state = ListState::with_items(items, 9, now());
    let (state, _) = update_listing(state, ListMsg::TagToggled("A".into()));
    let (state, _) = update_listing(state, ListMsg::TagToggled("B".into()));
    assert_eq!(ids(&state.view().items), vec![1, 2, 3]);

    let (state, _) = update_listing(state, ListMsg::TagToggled("A".into()));
    assert_eq!(ids(&state.view().items), vec![2, 3]);
}

#[test]
fn week_range_keeps_six_days_drops_eight() {
    init_logging();
    let items = vec![
        news(1, "recent", "events", &[], 6),
        news(2, "old", "events", &[], 8),
    ];
    let state = ListState::with_items(items, 9, now());
    let (state, _) = update_listing(state, ListMsg::DateRangeSelected(DateRange::Week));
    assert_eq!(ids(&state.view().items), vec![1]);
}

#[test]
fn pages_concatenate_to_filtered_collection() {
    init_logging();
    let items = twenty_three();
    for page_size in [1, 4, 9, 23, 50] {
        let first = paginate(&items, page_size, 1);
        let mut joined = Vec::new();
        for page in 1..=first.total_pages {
            joined.extend(paginate(&items, page_size, page).items);
        }
        assert_eq!(ids(&joined), ids(&items), "page size {page_size}");
    }
}

#[test]
fn empty_result_is_distinct_from_loading_and_error() {
    init_logging();
    let state = ListState::<NewsItem>::new_static(9, now());
    assert_eq!(state.view().status, ListingStatus::Loading);

    let (failed, _) = update_listing(state.clone(), ListMsg::SourceFailed("boom".into()));
    assert_eq!(failed.view().status, ListingStatus::Error("boom".into()));

    let (loaded, _) = update_listing(state, ListMsg::SourceLoaded(twenty_three()));
    let (loaded, _) = update_listing(loaded, ListMsg::SearchChanged("nothing-here".into()));
    assert_eq!(loaded.view().status, ListingStatus::Empty);
}

#[test]
fn chips_remove_single_filters() {
    init_logging();
    let state = ListState::with_items(twenty_three(), 9, now());
    let (state, _) = update_listing(state, ListMsg::SearchChanged("Жаңалық 1".into()));
    let (state, _) = update_listing(state, ListMsg::CategorySelected("events".into()));
    assert_eq!(
        state.view().chips,
        vec![
            ActiveFilter::Search("Жаңалық 1".into()),
            ActiveFilter::Category("events".into())
        ]
    );

    let (state, _) = update_listing(
        state,
        ListMsg::FilterRemoved(ActiveFilter::Category("events".into())),
    );
    assert_eq!(state.filters().search(), "Жаңалық 1");
    assert_eq!(state.filters().category(), "");
}

#[test]
fn featured_only_without_filters() {
    init_logging();
    let state = ListState::with_items(twenty_three(), 9, now());
    assert_eq!(ids(&state.view().featured), vec![1, 2]);
    let (state, _) = update_listing(state, ListMsg::SearchChanged("1".into()));
    assert!(state.view().featured.is_empty());
}

#[test]
fn remote_responses_apply_only_for_latest_request() {
    init_logging();
    let (state, effects) = ListState::<NewsItem>::new_remote(9, now());
    assert!(matches!(effects.as_slice(), [ListEffect::Fetch { seq: 1, .. }]));

    let (state, effects) = update_listing(state, ListMsg::SearchChanged("аккред".into()));
    let [ListEffect::Fetch { seq: 2, query }] = effects.as_slice() else {
        panic!("expected fetch 2, got {effects:?}");
    };
    assert_eq!(query.search.as_deref(), Some("аккред"));
    assert_eq!(query.page, 1);

    let fresh = RemotePage {
        results: vec![news(7, "Аккредитация", "events", &[], 1)],
        count: 10,
        next: Some("http://localhost:8000/api/news/?page=2".into()),
        previous: None,
    };
    let stale = RemotePage {
        results: twenty_three(),
        count: 23,
        next: None,
        previous: None,
    };

    let (state, _) = update_listing(
        state,
        ListMsg::FetchCompleted {
            seq: 2,
            result: Ok(fresh),
        },
    );
    let (state, _) = update_listing(
        state,
        ListMsg::FetchCompleted {
            seq: 1,
            result: Ok(stale),
        },
    );

    let view = state.view();
    assert_eq!(ids(&view.items), vec![7]);
    assert_eq!(view.pagination.total_items, 10);
    assert_eq!(view.pagination.total_pages, 2);
    assert!(view.pagination.has_next);
    assert!(!view.pagination.has_previous);

    let (state, effects) = update_listing(state, ListMsg::PageSelected(2));
    let [ListEffect::Fetch { seq: 3, query }] = effects.as_slice() else {
        panic!("expected fetch 3, got {effects:?}");
    };
    assert_eq!(query.page, 2);
    assert_eq!(state.view().status, ListingStatus::Loading);
}

#[test]
fn remote_tags_become_repeated_query_pairs() {
    init_logging();
    let (state, _) = ListState::<NewsItem>::new_remote(9, now());
    let (state, _) = update_listing(state, ListMsg::TagToggled("b".into()));
    let (state, _) = update_listing(state, ListMsg::TagToggled("a".into()));
    let tags: BTreeSet<_> = state
        .query()
        .to_pairs()
        .into_iter()
        .filter(|(key, _)| key == "tags")
        .map(|(_, value)| value)
        .collect();
    assert_eq!(tags, BTreeSet::from(["a".to_string(), "b".to_string()]));
}
