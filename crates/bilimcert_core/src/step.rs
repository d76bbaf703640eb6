pub type StepId = u32;

/// One page of a wizard. Defined when the wizard is built and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: StepId,
    /// Stable identifier, independent of display order.
    pub key: String,
    pub title: String,
    pub optional: bool,
}

impl Step {
    pub fn new(id: StepId, key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            title: title.into(),
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

impl StepStatus {
    pub fn of(step: StepId, current: StepId) -> Self {
        match step.cmp(&current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }
}
