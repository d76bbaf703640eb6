use crate::form::{FormKind, OutgoingEmail};
use crate::listing::{ListQuery, RequestSeq};
use crate::AttemptId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    /// Run the host's submit handler and report back with `SubmissionSettled`.
    Submit { attempt: AttemptId },
    /// Show a transient, user-visible error.
    NotifyError { message: String },
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    Submit {
        attempt: AttemptId,
        email: OutgoingEmail,
    },
    NotifyError {
        message: String,
    },
    Submitted {
        kind: FormKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    Fetch { seq: RequestSeq, query: ListQuery },
}
