use crate::{WizardEffect, WizardMsg, WizardState};

/// Pure wizard update: applies a message to state and returns any effects.
///
/// Transitions that are not allowed in the current state are no-ops.
pub fn update(mut state: WizardState, msg: WizardMsg) -> (WizardState, Vec<WizardEffect>) {
    let effects = match msg {
        WizardMsg::GateChanged {
            can_go_next,
            can_go_previous,
        } => {
            state.set_gate(can_go_next, can_go_previous);
            Vec::new()
        }
        WizardMsg::NextClicked => {
            if !state.can_go_next() {
                return (state, Vec::new());
            }
            if state.is_last_step() {
                let attempt = state.begin_submission();
                vec![WizardEffect::Submit { attempt }]
            } else {
                state.advance();
                Vec::new()
            }
        }
        WizardMsg::PreviousClicked => {
            if state.can_go_previous() {
                state.retreat();
            }
            Vec::new()
        }
        WizardMsg::SkipStepsChanged(skip) => {
            if !state.is_submitting() {
                state.set_skip(skip);
            }
            Vec::new()
        }
        WizardMsg::SubmissionSettled { attempt, outcome } => {
            // Results for attempts that are no longer in flight are dropped.
            if !state.settle(attempt) {
                return (state, Vec::new());
            }
            match outcome {
                Ok(()) => {
                    state.mark_completed();
                    vec![WizardEffect::Completed]
                }
                Err(message) => vec![WizardEffect::NotifyError { message }],
            }
        }
        WizardMsg::Reset => {
            if !state.is_submitting() {
                state.reset();
            }
            Vec::new()
        }
    };

    (state, effects)
}
