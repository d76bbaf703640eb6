use std::collections::BTreeMap;

use crate::form::{FieldErrors, ReviewItem};
use crate::listing::{ActiveFilter, SortConfig};
use crate::{StepId, StepStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub id: StepId,
    pub key: String,
    pub title: String,
    pub optional: bool,
    /// Completed steps render a success indicator instead of their icon.
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardView {
    pub steps: Vec<StepView>,
    pub current_step: StepId,
    /// 1-based position of the current step among visible steps.
    pub position: usize,
    pub visible_count: usize,
    pub progress_percent: u8,
    pub is_last_step: bool,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub is_submitting: bool,
    pub is_completed: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormView {
    pub wizard: WizardView,
    pub errors: FieldErrors,
    pub review: Vec<ReviewItem>,
    pub captcha_present: bool,
    pub attachment_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    /// Fetch in flight.
    Loading,
    /// Fetch failed.
    Error(String),
    /// Fetch succeeded with zero matches: render the "not found" state.
    Empty,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationView {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Inclusive 0-based index of the first item on the page.
    pub start_index: usize,
    /// Exclusive 0-based index one past the last item on the page.
    pub end_index: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingView<T> {
    pub items: Vec<T>,
    pub featured: Vec<T>,
    pub pagination: PaginationView,
    pub chips: Vec<ActiveFilter>,
    pub status: ListingStatus,
    pub category_counts: BTreeMap<String, usize>,
    pub sort: Option<SortConfig>,
    pub dirty: bool,
}
