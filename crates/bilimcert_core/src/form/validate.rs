use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{AttachmentError, FormDraft};
use crate::context::Translator;
use crate::StepId;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone pattern"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Spaces, dashes and parentheses are ignored.
pub fn is_valid_phone(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    PHONE_RE.is_match(&compact)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank after trimming. Without it, the text rules below only
    /// apply when the field has a value.
    Required,
    Email,
    Phone,
    /// Minimum trimmed length in characters.
    MinLength(usize),
    /// Checkbox must be ticked.
    Accepted,
    /// A CAPTCHA token must be present.
    Captcha,
    /// An attachment must be present.
    Attachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRule {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }

    /// Whether the field is a free-text value shown on review pages.
    pub fn is_text(&self) -> bool {
        !self
            .rules
            .iter()
            .any(|rule| matches!(rule, Rule::Accepted | Rule::Captcha | Rule::Attachment))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Required,
    InvalidEmail,
    InvalidPhone,
    TooShort { min: usize },
    NotAccepted,
    CaptchaMissing,
    AttachmentMissing,
    AttachmentRejected(AttachmentError),
}

impl ValidationIssue {
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationIssue::Required => "validation.required",
            ValidationIssue::InvalidEmail => "validation.email",
            ValidationIssue::InvalidPhone => "validation.phone",
            ValidationIssue::TooShort { .. } => "validation.too_short",
            ValidationIssue::NotAccepted => "validation.accepted",
            ValidationIssue::CaptchaMissing => "validation.captcha",
            ValidationIssue::AttachmentMissing => "validation.attachment_missing",
            ValidationIssue::AttachmentRejected(AttachmentError::TooLarge { .. }) => {
                "validation.attachment_too_large"
            }
            ValidationIssue::AttachmentRejected(AttachmentError::UnsupportedType { .. }) => {
                "validation.attachment_type"
            }
        }
    }

    pub fn message(&self, translator: &Translator) -> String {
        let key = self.message_key();
        match self {
            ValidationIssue::TooShort { min } => {
                translator.t_with(key, &[("min", min.to_string().as_str())])
            }
            ValidationIssue::AttachmentRejected(AttachmentError::TooLarge { max_bytes, .. }) => {
                let max_mb = (max_bytes / (1024 * 1024)).to_string();
                translator.t_with(key, &[("max", max_mb.as_str())])
            }
            ValidationIssue::AttachmentRejected(AttachmentError::UnsupportedType {
                allowed,
                ..
            }) => translator.t_with(key, &[("allowed", allowed.as_str())]),
            _ => translator.t(key),
        }
    }
}

/// Errors keyed by field name.
pub type FieldErrors = BTreeMap<String, ValidationIssue>;

/// First failing rule for `field_rule`, if any.
pub fn check_field(field_rule: &FieldRule, draft: &FormDraft) -> Option<ValidationIssue> {
    let value = draft.text(field_rule.field).trim();
    for rule in field_rule.rules {
        let issue = match rule {
            Rule::Required => value.is_empty().then_some(ValidationIssue::Required),
            Rule::Email => (!value.is_empty() && !is_valid_email(value))
                .then_some(ValidationIssue::InvalidEmail),
            Rule::Phone => (!value.is_empty() && !is_valid_phone(value))
                .then_some(ValidationIssue::InvalidPhone),
            Rule::MinLength(min) => (!value.is_empty() && value.chars().count() < *min)
                .then_some(ValidationIssue::TooShort { min: *min }),
            Rule::Accepted => {
                (!draft.flag(field_rule.field)).then_some(ValidationIssue::NotAccepted)
            }
            Rule::Captcha => draft
                .captcha()
                .is_none()
                .then_some(ValidationIssue::CaptchaMissing),
            Rule::Attachment => draft
                .attachment()
                .is_none()
                .then_some(ValidationIssue::AttachmentMissing),
        };
        if issue.is_some() {
            return issue;
        }
    }
    None
}

/// Per-step required-field sets plus the errors currently on display.
///
/// Errors are only added by an explicit `validate_step` and are cleared the
/// moment their field changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationGate {
    rules: BTreeMap<StepId, Vec<FieldRule>>,
    errors: FieldErrors,
}

impl ValidationGate {
    pub fn new(rules: impl IntoIterator<Item = (StepId, Vec<FieldRule>)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
            errors: FieldErrors::new(),
        }
    }

    pub fn rules_for(&self, step: StepId) -> &[FieldRule] {
        self.rules.get(&step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pure check of one step; does not touch the displayed errors.
    pub fn check_step(&self, step: StepId, draft: &FormDraft) -> FieldErrors {
        self.rules_for(step)
            .iter()
            .filter_map(|field_rule| {
                check_field(field_rule, draft).map(|issue| (field_rule.field.to_string(), issue))
            })
            .collect()
    }

    /// Pure check of the given steps.
    pub fn check_steps(
        &self,
        steps: impl IntoIterator<Item = StepId>,
        draft: &FormDraft,
    ) -> FieldErrors {
        steps
            .into_iter()
            .flat_map(|step| self.check_step(step, draft))
            .collect()
    }

    pub fn can_go_next(&self, step: StepId, draft: &FormDraft) -> bool {
        self.check_step(step, draft).is_empty()
    }

    /// Checks `step` and puts its failures on display. Returns `true` when valid.
    pub fn validate_step(&mut self, step: StepId, draft: &FormDraft) -> bool {
        let found = self.check_step(step, draft);
        let valid = found.is_empty();
        self.errors.extend(found);
        valid
    }

    /// Clears the displayed error for `field`. Returns whether one was shown.
    pub fn field_changed(&mut self, field: &str) -> bool {
        self.errors.remove(field).is_some()
    }

    pub fn record(&mut self, field: impl Into<String>, issue: ValidationIssue) {
        self.errors.insert(field.into(), issue);
    }

    pub fn extend(&mut self, errors: FieldErrors) {
        self.errors.extend(errors);
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldRule = FieldRule::new("name", &[Rule::Required, Rule::MinLength(2)]);
    const EMAIL: FieldRule = FieldRule::new("email", &[Rule::Required, Rule::Email]);
    const PHONE: FieldRule = FieldRule::new("phone", &[Rule::Phone]);

    #[test]
    fn email_pattern_matches_original_rules() {
        assert!(is_valid_email("info@bilimcert.kz"));
        assert!(!is_valid_email("info@bilimcert"));
        assert!(!is_valid_email("in fo@bilimcert.kz"));
        assert!(!is_valid_email("@bilimcert.kz"));
    }

    #[test]
    fn phone_ignores_formatting_characters() {
        assert!(is_valid_phone("+7 (701) 123-45-67"));
        assert!(!is_valid_phone("0701"));
        assert!(!is_valid_phone("+7 701 abc"));
    }

    #[test]
    fn required_reported_before_format() {
        let draft = FormDraft::new().with_text("email", "   ");
        assert_eq!(check_field(&EMAIL, &draft), Some(ValidationIssue::Required));
        let draft = FormDraft::new().with_text("email", "nope");
        assert_eq!(check_field(&EMAIL, &draft), Some(ValidationIssue::InvalidEmail));
    }

    #[test]
    fn optional_fields_only_checked_when_filled() {
        let draft = FormDraft::new();
        assert_eq!(check_field(&PHONE, &draft), None);
        let draft = draft.with_text("phone", "12");
        assert_eq!(check_field(&PHONE, &draft), None);
        let draft = FormDraft::new().with_text("phone", "abc");
        assert_eq!(check_field(&PHONE, &draft), Some(ValidationIssue::InvalidPhone));
    }

    #[test]
    fn min_length_counts_characters_not_bytes() {
        let draft = FormDraft::new().with_text("name", "Ә");
        assert_eq!(
            check_field(&NAME, &draft),
            Some(ValidationIssue::TooShort { min: 2 })
        );
        let draft = FormDraft::new().with_text("name", "Әл");
        assert_eq!(check_field(&NAME, &draft), None);
    }

    #[test]
    fn errors_clear_on_edit_and_check_is_pure() {
        let mut gate = ValidationGate::new([(1, vec![NAME, EMAIL])]);
        let draft = FormDraft::new();

        assert_eq!(gate.check_step(1, &draft).len(), 2);
        assert!(gate.errors().is_empty());

        assert!(!gate.validate_step(1, &draft));
        assert_eq!(gate.errors().len(), 2);

        assert!(gate.field_changed("name"));
        assert!(!gate.field_changed("name"));
        assert_eq!(gate.errors().keys().collect::<Vec<_>>(), vec!["email"]);
    }

    #[test]
    fn steps_without_rules_always_pass() {
        let gate = ValidationGate::new([(1, vec![NAME])]);
        assert!(gate.can_go_next(2, &FormDraft::new()));
    }
}
