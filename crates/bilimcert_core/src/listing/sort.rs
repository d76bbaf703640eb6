use std::cmp::Ordering;

use super::Listable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    PublishedAt,
    Title,
    Views,
}

impl SortField {
    /// Field name used in the remote `ordering` parameter.
    pub fn key(self) -> &'static str {
        match self {
            SortField::PublishedAt => "published_at",
            SortField::Title => "title",
            SortField::Views => "views_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Choosing the current field again flips the direction; a new field
    /// starts ascending.
    pub fn toggled(current: Option<SortConfig>, field: SortField) -> SortConfig {
        match current {
            Some(config) if config.field == field => SortConfig {
                field,
                direction: match config.direction {
                    SortDirection::Ascending => SortDirection::Descending,
                    SortDirection::Descending => SortDirection::Ascending,
                },
            },
            _ => SortConfig {
                field,
                direction: SortDirection::Ascending,
            },
        }
    }

    /// `ordering` query value, e.g. `-published_at`.
    pub fn ordering(self) -> String {
        match self.direction {
            SortDirection::Ascending => self.field.key().to_string(),
            SortDirection::Descending => format!("-{}", self.field.key()),
        }
    }
}

/// Stable sort; undated items sort before dated ones when ascending.
pub fn sort_items<T: Listable>(items: &mut [T], config: SortConfig) {
    items.sort_by(|a, b| {
        let ordering = compare(a, b, config.field);
        match config.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare<T: Listable>(a: &T, b: &T, field: SortField) -> Ordering {
    match field {
        SortField::PublishedAt => a.published_at().cmp(&b.published_at()),
        SortField::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
        SortField::Views => a.views().cmp(&b.views()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_field_flips_direction() {
        let first = SortConfig::toggled(None, SortField::Title);
        assert_eq!(first.direction, SortDirection::Ascending);
        let second = SortConfig::toggled(Some(first), SortField::Title);
        assert_eq!(second.direction, SortDirection::Descending);
        assert_eq!(second.ordering(), "-title");
        let third = SortConfig::toggled(Some(second), SortField::Views);
        assert_eq!(third.ordering(), "views_count");
    }
}
