use super::kinds::fields;
use super::{
    review_items, AttachmentPolicy, CaptchaToken, FormDraft, FormKind, FormSubmission,
    ValidationGate, ValidationIssue,
};
use crate::context::Translator;
use crate::{
    update, FormEffect, FormMsg, FormView, WizardEffect, WizardError, WizardMsg, WizardState,
};

/// A wizard bound to one form kind, its draft and its validation gate.
///
/// The session keeps the wizard's forward gate in sync with the validity of
/// the current step after every message, so hosts never send `GateChanged`
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    kind: FormKind,
    wizard: WizardState,
    gate: ValidationGate,
    draft: FormDraft,
    policy: AttachmentPolicy,
    dirty: bool,
}

impl FormSession {
    pub fn new(kind: FormKind, translator: &Translator) -> Result<Self, WizardError> {
        let wizard = WizardState::new(kind.steps(translator))?;
        let mut session = Self {
            kind,
            wizard,
            gate: ValidationGate::new(kind.rules()),
            draft: FormDraft::new(),
            policy: AttachmentPolicy::default(),
            dirty: true,
        };
        session.sync_gate();
        Ok(session)
    }

    pub fn with_policy(mut self, policy: AttachmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn gate(&self) -> &ValidationGate {
        &self.gate
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    pub fn view(&self) -> FormView {
        let wizard = self.wizard.view();
        let on_review = self
            .wizard
            .current()
            .is_some_and(|step| step.key == "review");
        FormView {
            wizard: crate::WizardView {
                dirty: self.dirty || wizard.dirty,
                ..wizard
            },
            errors: self.gate.errors().clone(),
            review: if on_review {
                review_items(self.kind, &self.draft, self.wizard.skipped())
            } else {
                Vec::new()
            },
            captcha_present: self.draft.captcha().is_some(),
            attachment_name: self.draft.attachment().map(|file| file.file_name.clone()),
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let wizard = self.wizard.consume_dirty();
        std::mem::take(&mut self.dirty) || wizard
    }

    fn forward(&mut self, msg: WizardMsg) -> Vec<WizardEffect> {
        let (wizard, effects) = update(self.wizard.clone(), msg);
        self.wizard = wizard;
        effects
    }

    fn sync_gate(&mut self) {
        let can_go_next = self
            .gate
            .can_go_next(self.wizard.current_step(), &self.draft);
        self.forward(WizardMsg::GateChanged {
            can_go_next,
            can_go_previous: true,
        });
    }

    fn field_edited(&mut self, field: &str) {
        self.gate.field_changed(field);
        self.dirty = true;
    }

    fn next_clicked(&mut self) -> Vec<FormEffect> {
        if self.wizard.is_submitting() || self.wizard.is_completed() {
            return Vec::new();
        }
        let current = self.wizard.current_step();
        if !self.gate.validate_step(current, &self.draft) {
            self.dirty = true;
            return Vec::new();
        }

        if !self.wizard.is_last_step() {
            self.forward(WizardMsg::NextClicked);
            return Vec::new();
        }

        let submission =
            match FormSubmission::from_draft(self.kind, &self.draft, self.wizard.skipped()) {
                Ok(submission) => submission,
                Err(errors) => {
                    self.gate.extend(errors);
                    self.dirty = true;
                    return Vec::new();
                }
            };
        let Some(captcha) = self.draft.captcha().cloned() else {
            self.gate
                .record(fields::RECAPTCHA, ValidationIssue::CaptchaMissing);
            self.dirty = true;
            return Vec::new();
        };

        self.forward(WizardMsg::NextClicked)
            .into_iter()
            .filter_map(|effect| match effect {
                WizardEffect::Submit { attempt } => Some(FormEffect::Submit {
                    attempt,
                    email: submission.to_email(&captcha),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Pure form update: applies a message to the session and returns any effects.
pub fn update_form(mut session: FormSession, msg: FormMsg) -> (FormSession, Vec<FormEffect>) {
    let effects = match msg {
        FormMsg::TextChanged { field, value } => {
            session.draft.set_text(field.as_str(), value);
            session.field_edited(&field);
            Vec::new()
        }
        FormMsg::FlagChanged { field, value } => {
            session.draft.set_flag(field.as_str(), value);
            session.field_edited(&field);
            Vec::new()
        }
        FormMsg::AttachmentSelected(attachment) => {
            match session.policy.check(&attachment) {
                Ok(()) => {
                    session.draft.set_attachment(Some(attachment));
                    session.field_edited(fields::DOCUMENT);
                }
                Err(err) => {
                    // The previous attachment, if any, stays in place.
                    session
                        .gate
                        .record(fields::DOCUMENT, ValidationIssue::AttachmentRejected(err));
                    session.dirty = true;
                }
            }
            Vec::new()
        }
        FormMsg::AttachmentRemoved => {
            session.draft.set_attachment(None);
            session.field_edited(fields::DOCUMENT);
            Vec::new()
        }
        FormMsg::CaptchaSolved(token) => {
            session.draft.set_captcha(CaptchaToken::new(token));
            session.field_edited(fields::RECAPTCHA);
            Vec::new()
        }
        FormMsg::CaptchaExpired => {
            session.draft.set_captcha(None);
            session.dirty = true;
            Vec::new()
        }
        FormMsg::NextClicked => session.next_clicked(),
        FormMsg::PreviousClicked => {
            session.forward(WizardMsg::PreviousClicked);
            Vec::new()
        }
        FormMsg::SkipStepsChanged(skip) => {
            session.forward(WizardMsg::SkipStepsChanged(skip));
            Vec::new()
        }
        FormMsg::SubmissionSettled { attempt, outcome } => session
            .forward(WizardMsg::SubmissionSettled { attempt, outcome })
            .into_iter()
            .filter_map(|effect| match effect {
                WizardEffect::Completed => Some(FormEffect::Submitted { kind: session.kind }),
                WizardEffect::NotifyError { message } => {
                    // Verification tokens are single-use.
                    session.draft.set_captcha(None);
                    session.dirty = true;
                    Some(FormEffect::NotifyError { message })
                }
                WizardEffect::Submit { .. } => None,
            })
            .collect(),
        FormMsg::Reset => {
            if !session.wizard.is_submitting() {
                session.draft = FormDraft::new();
                session.gate.clear();
                session.dirty = true;
                session.forward(WizardMsg::Reset);
            }
            Vec::new()
        }
    };

    session.sync_gate();
    (session, effects)
}
