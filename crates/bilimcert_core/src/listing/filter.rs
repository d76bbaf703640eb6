use std::collections::BTreeSet;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use super::Listable;

/// Lowercased, trimmed category key. `all` means no category and maps to
/// the empty string.
pub fn normalize_category(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    if key == "all" {
        String::new()
    } else {
        key
    }
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) and
/// bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DateRange {
    #[default]
    Any,
    Today,
    Week,
    Month,
    Year,
}

impl DateRange {
    /// Query-string and UI key; `Any` is the empty string.
    pub fn key(self) -> &'static str {
        match self {
            DateRange::Any => "",
            DateRange::Today => "today",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Year => "year",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "" => Some(DateRange::Any),
            "today" => Some(DateRange::Today),
            "week" => Some(DateRange::Week),
            "month" => Some(DateRange::Month),
            "year" => Some(DateRange::Year),
            _ => None,
        }
    }

    /// Earliest publication instant kept by this range, relative to `now`.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::Any => None,
            DateRange::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            DateRange::Week => now.checked_sub_signed(TimeDelta::days(7)),
            DateRange::Month => now.checked_sub_months(Months::new(1)),
            DateRange::Year => now.checked_sub_months(Months::new(12)),
        }
    }
}

/// One non-default filter, rendered as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveFilter {
    Search(String),
    Category(String),
    DateRange(DateRange),
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    search: String,
    category: String,
    date_range: DateRange,
    tags: BTreeSet<String>,
}

impl FilterState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || !self.category.is_empty()
            || self.date_range != DateRange::Any
            || !self.tags.is_empty()
    }

    // Each setter reports whether the filter actually changed.

    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        let search = search.into();
        if self.search == search {
            return false;
        }
        self.search = search;
        true
    }

    pub fn select_category(&mut self, category: &str) -> bool {
        let category = normalize_category(category);
        if self.category == category {
            return false;
        }
        self.category = category;
        true
    }

    pub fn select_date_range(&mut self, range: DateRange) -> bool {
        if self.date_range == range {
            return false;
        }
        self.date_range = range;
        true
    }

    /// Adds the tag when absent, removes it when present.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
        true
    }

    pub fn remove(&mut self, filter: &ActiveFilter) -> bool {
        match filter {
            ActiveFilter::Search(_) => self.set_search(""),
            ActiveFilter::Category(_) => self.select_category(""),
            ActiveFilter::DateRange(_) => self.select_date_range(DateRange::Any),
            ActiveFilter::Tag(tag) => self.tags.remove(tag),
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = *self != Self::default();
        *self = Self::default();
        changed
    }

    /// Non-default filters in display order: search, category, date, tags.
    pub fn chips(&self) -> Vec<ActiveFilter> {
        let mut chips = Vec::new();
        if !self.search.trim().is_empty() {
            chips.push(ActiveFilter::Search(self.search.trim().to_string()));
        }
        if !self.category.is_empty() {
            chips.push(ActiveFilter::Category(self.category.clone()));
        }
        if self.date_range != DateRange::Any {
            chips.push(ActiveFilter::DateRange(self.date_range));
        }
        chips.extend(self.tags.iter().cloned().map(ActiveFilter::Tag));
        chips
    }

    pub fn matches<T: Listable>(&self, item: &T, now: DateTime<Utc>) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let hit = [item.title(), item.excerpt(), item.content()]
                .iter()
                .any(|text| text.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if !self.category.is_empty() && item.category_key() != self.category {
            return false;
        }

        if let Some(cutoff) = self.date_range.cutoff(now) {
            match item.published_at() {
                Some(published) if published >= cutoff => {}
                _ => return false,
            }
        }

        if !self.tags.is_empty() && !item.tags().iter().any(|tag| self.tags.contains(tag)) {
            return false;
        }

        true
    }
}

/// Items of `source` that pass every filter, in source order.
pub fn apply_filters<T: Listable + Clone>(
    source: &[T],
    filters: &FilterState,
    now: DateTime<Utc>,
) -> Vec<T> {
    source
        .iter()
        .filter(|item| filters.matches(*item, now))
        .cloned()
        .collect()
}
