use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::form::Attachment;
use crate::listing::{ActiveFilter, DateRange, RemotePage, RequestSeq, SortField};
use crate::{AttemptId, StepId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMsg {
    /// Host re-evaluated the current step's validity.
    GateChanged {
        can_go_next: bool,
        can_go_previous: bool,
    },
    /// User pressed Next (or Submit on the last visible step).
    NextClicked,
    /// User pressed Previous.
    PreviousClicked,
    /// Host changed which step ids are hidden from traversal.
    SkipStepsChanged(BTreeSet<StepId>),
    /// The submit handler for `attempt` finished.
    SubmissionSettled {
        attempt: AttemptId,
        outcome: Result<(), String>,
    },
    /// Start over from the first visible step.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMsg {
    TextChanged { field: String, value: String },
    FlagChanged { field: String, value: bool },
    AttachmentSelected(Attachment),
    AttachmentRemoved,
    /// The CAPTCHA widget produced a verification token.
    CaptchaSolved(String),
    CaptchaExpired,
    NextClicked,
    PreviousClicked,
    SkipStepsChanged(BTreeSet<StepId>),
    SubmissionSettled {
        attempt: AttemptId,
        outcome: Result<(), String>,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListMsg<T> {
    SearchChanged(String),
    CategorySelected(String),
    DateRangeSelected(DateRange),
    TagToggled(String),
    /// Remove one chip, leaving the other filters alone.
    FilterRemoved(ActiveFilter),
    FiltersCleared,
    SortBy(SortField),
    PageSelected(usize),
    /// Static source finished loading.
    SourceLoaded(Vec<T>),
    /// Static source failed to load.
    SourceFailed(String),
    /// Ask for the remote collection again with the current filters.
    Refresh,
    /// Remote fetch `seq` finished.
    FetchCompleted {
        seq: RequestSeq,
        result: Result<RemotePage<T>, String>,
    },
    /// Advance the clock used by date-range filtering.
    Tick { now: DateTime<Utc> },
}
