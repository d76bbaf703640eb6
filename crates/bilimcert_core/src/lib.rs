//! BilimCert portal core: pure state machines and view-model helpers.
//!
//! Nothing in this crate performs IO. Hosts feed messages into the `update*`
//! functions, execute the returned effects, and render from `view()`.
mod effect;
mod msg;
mod state;
mod step;
mod update;
mod view_model;

pub mod context;
pub mod form;
pub mod format;
pub mod listing;

pub use effect::{FormEffect, ListEffect, WizardEffect};
pub use msg::{FormMsg, ListMsg, WizardMsg};
pub use state::{AttemptId, WizardError, WizardState};
pub use step::{Step, StepId, StepStatus};
pub use update::update;
pub use view_model::{
    FormView, ListingStatus, ListingView, PaginationView, StepView, WizardView,
};
