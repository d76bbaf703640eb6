use std::collections::BTreeSet;

use thiserror::Error;

use crate::step::{Step, StepId, StepStatus};
use crate::view_model::{StepView, WizardView};

/// Identifies one submission attempt so late results can be matched.
pub type AttemptId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("a wizard needs at least one step")]
    NoSteps,
    #[error("step id {0} is defined more than once")]
    DuplicateStep(StepId),
}

/// Step orchestration state.
///
/// Steps are kept sorted by id. `skip` hides ids from traversal without
/// renumbering the rest; at least one step always stays visible and
/// `current` is always a visible id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    steps: Vec<Step>,
    skip: BTreeSet<StepId>,
    current: StepId,
    gate_next: bool,
    gate_previous: bool,
    in_flight: Option<AttemptId>,
    last_attempt: AttemptId,
    completed: bool,
    dirty: bool,
}

impl WizardState {
    pub fn new(mut steps: Vec<Step>) -> Result<Self, WizardError> {
        steps.sort_by_key(|step| step.id);
        let first = steps.first().map(|step| step.id).ok_or(WizardError::NoSteps)?;
        if let Some(pair) = steps.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(WizardError::DuplicateStep(pair[0].id));
        }
        Ok(Self {
            steps,
            skip: BTreeSet::new(),
            current: first,
            gate_next: false,
            gate_previous: true,
            in_flight: None,
            last_attempt: 0,
            completed: false,
            dirty: false,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn skipped(&self) -> &BTreeSet<StepId> {
        &self.skip
    }

    pub fn visible_steps(&self) -> impl Iterator<Item = &Step> + '_ {
        self.steps
            .iter()
            .filter(move |step| !self.skip.contains(&step.id))
    }

    pub fn current_step(&self) -> StepId {
        self.current
    }

    pub fn current(&self) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == self.current)
    }

    pub fn first_visible(&self) -> StepId {
        self.visible_steps()
            .next()
            .map(|step| step.id)
            .unwrap_or(self.current)
    }

    pub fn last_visible(&self) -> StepId {
        self.visible_steps()
            .last()
            .map(|step| step.id)
            .unwrap_or(self.current)
    }

    pub fn is_first_step(&self) -> bool {
        self.current == self.first_visible()
    }

    pub fn is_last_step(&self) -> bool {
        self.current == self.last_visible()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Effective forward gate: the host's verdict, blocked while submitting.
    pub fn can_go_next(&self) -> bool {
        self.gate_next && !self.is_submitting() && !self.completed
    }

    /// Effective backward gate: never on the first visible step.
    pub fn can_go_previous(&self) -> bool {
        self.gate_previous && !self.is_first_step() && !self.is_submitting() && !self.completed
    }

    pub fn view(&self) -> WizardView {
        let visible: Vec<&Step> = self.visible_steps().collect();
        let position = visible
            .iter()
            .position(|step| step.id == self.current)
            .map_or(1, |index| index + 1);
        let visible_count = visible.len();
        let progress_percent = if visible_count == 0 {
            0
        } else {
            (position * 100 / visible_count) as u8
        };

        WizardView {
            steps: visible
                .into_iter()
                .map(|step| StepView {
                    id: step.id,
                    key: step.key.clone(),
                    title: step.title.clone(),
                    optional: step.optional,
                    status: StepStatus::of(step.id, self.current),
                })
                .collect(),
            current_step: self.current,
            position,
            visible_count,
            progress_percent,
            is_last_step: self.is_last_step(),
            can_go_next: self.can_go_next(),
            can_go_previous: self.can_go_previous(),
            is_submitting: self.is_submitting(),
            is_completed: self.completed,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_gate(&mut self, can_go_next: bool, can_go_previous: bool) {
        if self.gate_next != can_go_next || self.gate_previous != can_go_previous {
            self.gate_next = can_go_next;
            self.gate_previous = can_go_previous;
            self.dirty = true;
        }
    }

    /// Replaces the skip set. Rejected when it would hide every step.
    pub(crate) fn set_skip(&mut self, skip: BTreeSet<StepId>) -> bool {
        if self.steps.iter().all(|step| skip.contains(&step.id)) {
            return false;
        }
        self.skip = skip;
        if self.skip.contains(&self.current) {
            self.current = self
                .next_visible_after(self.current)
                .or_else(|| self.previous_visible_before(self.current))
                .unwrap_or(self.current);
        }
        self.dirty = true;
        true
    }

    pub(crate) fn advance(&mut self) -> bool {
        match self.next_visible_after(self.current) {
            Some(next) => {
                self.current = next;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn retreat(&mut self) -> bool {
        match self.previous_visible_before(self.current) {
            Some(previous) => {
                self.current = previous;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn begin_submission(&mut self) -> AttemptId {
        self.last_attempt += 1;
        self.in_flight = Some(self.last_attempt);
        self.dirty = true;
        self.last_attempt
    }

    /// Clears the in-flight flag when `attempt` is the one in flight.
    pub(crate) fn settle(&mut self, attempt: AttemptId) -> bool {
        if self.in_flight == Some(attempt) {
            self.in_flight = None;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
        self.dirty = true;
    }

    pub(crate) fn reset(&mut self) {
        self.current = self.first_visible();
        self.completed = false;
        self.dirty = true;
    }

    fn next_visible_after(&self, id: StepId) -> Option<StepId> {
        self.visible_steps()
            .map(|step| step.id)
            .find(|candidate| *candidate > id)
    }

    fn previous_visible_before(&self, id: StepId) -> Option<StepId> {
        self.visible_steps()
            .map(|step| step.id)
            .filter(|candidate| *candidate < id)
            .last()
    }
}
