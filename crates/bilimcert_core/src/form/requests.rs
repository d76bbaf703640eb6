use std::collections::BTreeSet;

use super::kinds::fields;
use super::{Attachment, CaptchaToken, FieldErrors, FormDraft, FormKind, ValidationGate};
use crate::StepId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccreditationRequest {
    pub institution_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub details: String,
    pub document: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnershipRequest {
    pub organization_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub proposal: String,
    pub document: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub education_details: String,
    pub document: Option<Attachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionCategory {
    #[default]
    General,
    Accreditation,
    Recognition,
    Bologna,
    Technical,
    Other,
}

impl QuestionCategory {
    pub fn key(self) -> &'static str {
        match self {
            QuestionCategory::General => "general",
            QuestionCategory::Accreditation => "accreditation",
            QuestionCategory::Recognition => "recognition",
            QuestionCategory::Bologna => "bologna",
            QuestionCategory::Technical => "technical",
            QuestionCategory::Other => "other",
        }
    }

    /// Unknown or blank keys fall back to `General`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "accreditation" => QuestionCategory::Accreditation,
            "recognition" => QuestionCategory::Recognition,
            "bologna" => QuestionCategory::Bologna,
            "technical" => QuestionCategory::Technical,
            "other" => QuestionCategory::Other,
            _ => QuestionCategory::General,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub question: String,
    pub category: QuestionCategory,
}

/// One validated form, ready to be formatted for the generic email endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Contact(ContactRequest),
    Accreditation(AccreditationRequest),
    Partnership(PartnershipRequest),
    Recognition(RecognitionRequest),
    Question(QuestionRequest),
}

/// Payload of `POST /email/send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub message: String,
    pub to: String,
    pub attachment: Option<Attachment>,
    pub recaptcha_token: CaptchaToken,
}

impl OutgoingEmail {
    /// Sent as the `isFiles` form field.
    pub fn is_files(&self) -> bool {
        self.attachment.is_some()
    }
}

impl FormSubmission {
    /// Builds the typed request for `kind` after re-checking every rule of
    /// every step not in `skip`.
    pub fn from_draft(
        kind: FormKind,
        draft: &FormDraft,
        skip: &BTreeSet<StepId>,
    ) -> Result<Self, FieldErrors> {
        let gate = ValidationGate::new(kind.rules());
        let steps = kind
            .rules()
            .into_iter()
            .map(|(step, _)| step)
            .filter(|step| !skip.contains(step));
        let errors = gate.check_steps(steps, draft);
        if !errors.is_empty() {
            return Err(errors);
        }

        let text = |field: &str| draft.text(field).trim().to_string();
        // A skipped documents step contributes nothing to the submission.
        let document_step = kind.document_step().filter(|step| !skip.contains(step));
        let document = || document_step.and_then(|_| draft.attachment().cloned());

        let submission = match kind {
            FormKind::Contact => FormSubmission::Contact(ContactRequest {
                name: text(fields::NAME),
                email: text(fields::EMAIL),
                phone: draft.optional_text(fields::PHONE),
                subject: draft.optional_text(fields::SUBJECT),
                message: text(fields::MESSAGE),
            }),
            FormKind::Accreditation => FormSubmission::Accreditation(AccreditationRequest {
                institution_name: text(fields::INSTITUTION_NAME),
                contact_person: text(fields::CONTACT_PERSON),
                email: text(fields::EMAIL),
                phone: text(fields::PHONE),
                details: text(fields::DETAILS),
                document: document(),
            }),
            FormKind::Partnership => FormSubmission::Partnership(PartnershipRequest {
                organization_name: text(fields::ORGANIZATION_NAME),
                contact_person: text(fields::CONTACT_PERSON),
                email: text(fields::EMAIL),
                phone: text(fields::PHONE),
                proposal: text(fields::PROPOSAL),
                document: document(),
            }),
            FormKind::Recognition => FormSubmission::Recognition(RecognitionRequest {
                applicant_name: text(fields::APPLICANT_NAME),
                email: text(fields::EMAIL),
                phone: text(fields::PHONE),
                education_details: text(fields::EDUCATION_DETAILS),
                document: document(),
            }),
            FormKind::Question => FormSubmission::Question(QuestionRequest {
                name: text(fields::NAME),
                email: text(fields::EMAIL),
                subject: text(fields::SUBJECT),
                question: text(fields::QUESTION),
                category: QuestionCategory::from_key(draft.text(fields::CATEGORY)),
            }),
        };
        Ok(submission)
    }

    pub fn kind(&self) -> FormKind {
        match self {
            FormSubmission::Contact(_) => FormKind::Contact,
            FormSubmission::Accreditation(_) => FormKind::Accreditation,
            FormSubmission::Partnership(_) => FormKind::Partnership,
            FormSubmission::Recognition(_) => FormKind::Recognition,
            FormSubmission::Question(_) => FormKind::Question,
        }
    }

    pub fn to_email(&self, captcha: &CaptchaToken) -> OutgoingEmail {
        let (subject, lines, attachment): (String, Vec<(&str, &str)>, Option<&Attachment>) =
            match self {
                FormSubmission::Contact(req) => (
                    format!(
                        "Контактная форма: {}",
                        req.subject.as_deref().unwrap_or("Новое сообщение")
                    ),
                    vec![
                        ("Имя", req.name.as_str()),
                        ("Email", req.email.as_str()),
                        ("Телефон", req.phone.as_deref().unwrap_or("Не указан")),
                        ("Сообщение", req.message.as_str()),
                    ],
                    None,
                ),
                FormSubmission::Accreditation(req) => (
                    format!("Заявка на аккредитацию: {}", req.institution_name),
                    vec![
                        ("Учреждение", req.institution_name.as_str()),
                        ("Контактное лицо", req.contact_person.as_str()),
                        ("Email", req.email.as_str()),
                        ("Телефон", req.phone.as_str()),
                        ("Детали", req.details.as_str()),
                    ],
                    req.document.as_ref(),
                ),
                FormSubmission::Partnership(req) => (
                    format!("Заявка на партнерство: {}", req.organization_name),
                    vec![
                        ("Организация", req.organization_name.as_str()),
                        ("Контактное лицо", req.contact_person.as_str()),
                        ("Email", req.email.as_str()),
                        ("Телефон", req.phone.as_str()),
                        ("Предложение", req.proposal.as_str()),
                    ],
                    req.document.as_ref(),
                ),
                FormSubmission::Recognition(req) => (
                    format!("Заявка на признание: {}", req.applicant_name),
                    vec![
                        ("Заявитель", req.applicant_name.as_str()),
                        ("Email", req.email.as_str()),
                        ("Телефон", req.phone.as_str()),
                        ("Детали образования", req.education_details.as_str()),
                    ],
                    req.document.as_ref(),
                ),
                FormSubmission::Question(req) => (
                    format!("Вопрос от пользователя: {}", req.name),
                    vec![
                        ("Имя", req.name.as_str()),
                        ("Email", req.email.as_str()),
                        ("Тема", req.subject.as_str()),
                        ("Категория", req.category.key()),
                        ("Вопрос", req.question.as_str()),
                    ],
                    None,
                ),
            };

        let message = lines
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");

        OutgoingEmail {
            subject,
            message,
            to: self.kind().destination().to_string(),
            attachment: attachment.cloned(),
            recaptcha_token: captcha.clone(),
        }
    }
}

/// One line of the summary shown before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub step: StepId,
    /// Translation key of the field label, e.g. `form.fields.email`.
    pub label_key: String,
    pub value: String,
}

/// Summary of the draft for every visible step, in step order.
///
/// Blank optional values show as `-`; the document step lists the attached
/// file name.
pub fn review_items(
    kind: FormKind,
    draft: &FormDraft,
    skip: &BTreeSet<StepId>,
) -> Vec<ReviewItem> {
    let mut items = Vec::new();
    for (step, rules) in kind.rules() {
        if skip.contains(&step) {
            continue;
        }
        for rule in rules.iter().filter(|rule| rule.is_text()) {
            items.push(ReviewItem {
                step,
                label_key: format!("form.fields.{}", rule.field),
                value: draft
                    .optional_text(rule.field)
                    .unwrap_or_else(|| "-".to_string()),
            });
        }
        if kind.document_step() == Some(step) {
            items.push(ReviewItem {
                step,
                label_key: format!("form.fields.{}", fields::DOCUMENT),
                value: draft
                    .attachment()
                    .map(|file| file.file_name.clone())
                    .unwrap_or_else(|| "-".to_string()),
            });
        }
    }
    items
}
