use super::validate::{FieldRule, Rule};
use crate::context::Translator;
use crate::{Step, StepId};

/// Field names shared by drafts, rules and review pages.
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const SUBJECT: &str = "subject";
    pub const MESSAGE: &str = "message";
    pub const INSTITUTION_NAME: &str = "institution_name";
    pub const ORGANIZATION_NAME: &str = "organization_name";
    pub const APPLICANT_NAME: &str = "applicant_name";
    pub const CONTACT_PERSON: &str = "contact_person";
    pub const DETAILS: &str = "details";
    pub const PROPOSAL: &str = "proposal";
    pub const EDUCATION_DETAILS: &str = "education_details";
    pub const QUESTION: &str = "question";
    pub const CATEGORY: &str = "category";
    pub const DOCUMENT: &str = "document";
    pub const DECLARATION: &str = "declaration";
    pub const RECAPTCHA: &str = "recaptcha";
}

const CAPTCHA: FieldRule = FieldRule::new(fields::RECAPTCHA, &[Rule::Captcha]);
const DECLARATION: FieldRule = FieldRule::new(fields::DECLARATION, &[Rule::Accepted]);
const EMAIL: FieldRule = FieldRule::new(fields::EMAIL, &[Rule::Required, Rule::Email]);
const PHONE_REQUIRED: FieldRule = FieldRule::new(fields::PHONE, &[Rule::Required, Rule::Phone]);
const CONTACT_PERSON: FieldRule =
    FieldRule::new(fields::CONTACT_PERSON, &[Rule::Required, Rule::MinLength(2)]);

const STEP_PRIMARY: StepId = 1;
const STEP_CONTACTS: StepId = 2;
const STEP_DOCUMENTS: StepId = 3;
const STEP_REVIEW: StepId = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormKind {
    Contact,
    Accreditation,
    Partnership,
    Recognition,
    Question,
}

impl FormKind {
    pub const ALL: [FormKind; 5] = [
        FormKind::Contact,
        FormKind::Accreditation,
        FormKind::Partnership,
        FormKind::Recognition,
        FormKind::Question,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Accreditation => "accreditation",
            FormKind::Partnership => "partnership",
            FormKind::Recognition => "recognition",
            FormKind::Question => "question",
        }
    }

    /// Fixed mailbox the backend forwards this form to.
    pub fn destination(self) -> &'static str {
        match self {
            FormKind::Contact => "contact@bilimcert.kz",
            FormKind::Accreditation => "accreditation@bilimcert.kz",
            FormKind::Partnership => "partnerships@bilimcert.kz",
            FormKind::Recognition => "recognition@bilimcert.kz",
            FormKind::Question => "questions@bilimcert.kz",
        }
    }

    pub fn is_multi_step(self) -> bool {
        matches!(
            self,
            FormKind::Accreditation | FormKind::Partnership | FormKind::Recognition
        )
    }

    pub fn accepts_attachment(self) -> bool {
        self.is_multi_step()
    }

    /// Step that holds the optional document upload.
    pub fn document_step(self) -> Option<StepId> {
        self.accepts_attachment().then_some(STEP_DOCUMENTS)
    }

    pub fn steps(self, translator: &Translator) -> Vec<Step> {
        let step = |id: StepId, key: &str| {
            Step::new(id, key, translator.t(&format!("wizard.steps.{key}")))
        };
        match self {
            FormKind::Contact => vec![step(STEP_PRIMARY, "message")],
            FormKind::Question => vec![step(STEP_PRIMARY, "question")],
            FormKind::Accreditation | FormKind::Partnership => vec![
                step(STEP_PRIMARY, "organization"),
                step(STEP_CONTACTS, "contacts"),
                step(STEP_DOCUMENTS, "documents").optional(),
                step(STEP_REVIEW, "review"),
            ],
            FormKind::Recognition => vec![
                step(STEP_PRIMARY, "applicant"),
                step(STEP_CONTACTS, "contacts"),
                step(STEP_DOCUMENTS, "documents").optional(),
                step(STEP_REVIEW, "review"),
            ],
        }
    }

    pub fn rules(self) -> Vec<(StepId, Vec<FieldRule>)> {
        match self {
            FormKind::Contact => vec![(
                STEP_PRIMARY,
                vec![
                    FieldRule::new(fields::NAME, &[Rule::Required]),
                    EMAIL,
                    FieldRule::new(fields::PHONE, &[Rule::Phone]),
                    FieldRule::new(fields::SUBJECT, &[]),
                    FieldRule::new(fields::MESSAGE, &[Rule::Required, Rule::MinLength(10)]),
                    CAPTCHA,
                ],
            )],
            FormKind::Question => vec![(
                STEP_PRIMARY,
                vec![
                    FieldRule::new(fields::NAME, &[Rule::Required]),
                    EMAIL,
                    FieldRule::new(fields::SUBJECT, &[Rule::Required]),
                    FieldRule::new(fields::QUESTION, &[Rule::Required, Rule::MinLength(10)]),
                    FieldRule::new(fields::CATEGORY, &[]),
                    CAPTCHA,
                ],
            )],
            FormKind::Accreditation => Self::application_rules(vec![
                FieldRule::new(fields::INSTITUTION_NAME, &[Rule::Required, Rule::MinLength(2)]),
                CONTACT_PERSON,
                FieldRule::new(fields::DETAILS, &[Rule::Required, Rule::MinLength(20)]),
            ]),
            FormKind::Partnership => Self::application_rules(vec![
                FieldRule::new(fields::ORGANIZATION_NAME, &[Rule::Required, Rule::MinLength(2)]),
                CONTACT_PERSON,
                FieldRule::new(fields::PROPOSAL, &[Rule::Required, Rule::MinLength(20)]),
            ]),
            FormKind::Recognition => Self::application_rules(vec![
                FieldRule::new(fields::APPLICANT_NAME, &[Rule::Required, Rule::MinLength(2)]),
                FieldRule::new(
                    fields::EDUCATION_DETAILS,
                    &[Rule::Required, Rule::MinLength(20)],
                ),
            ]),
        }
    }

    fn application_rules(primary: Vec<FieldRule>) -> Vec<(StepId, Vec<FieldRule>)> {
        vec![
            (STEP_PRIMARY, primary),
            (STEP_CONTACTS, vec![EMAIL, PHONE_REQUIRED]),
            (STEP_DOCUMENTS, Vec::new()),
            (STEP_REVIEW, vec![DECLARATION, CAPTCHA]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Language, Translator};

    #[test]
    fn every_kind_has_rules_for_each_step() {
        let translator = Translator::builtin(Language::En);
        for kind in FormKind::ALL {
            let steps = kind.steps(&translator);
            let rules = kind.rules();
            assert!(!steps.is_empty());
            assert_eq!(steps.len(), rules.len(), "{kind:?}");
            for (step, (rule_step, _)) in steps.iter().zip(&rules) {
                assert_eq!(step.id, *rule_step);
            }
        }
    }

    #[test]
    fn last_step_always_requires_captcha() {
        for kind in FormKind::ALL {
            let rules = kind.rules();
            let (_, last) = rules.last().unwrap();
            assert!(last.iter().any(|rule| rule.rules.contains(&Rule::Captcha)));
        }
    }

    #[test]
    fn documents_step_is_optional() {
        let translator = Translator::builtin(Language::Kz);
        let steps = FormKind::Recognition.steps(&translator);
        let documents = steps.iter().find(|s| s.key == "documents").unwrap();
        assert!(documents.optional);
        assert_eq!(FormKind::Recognition.document_step(), Some(documents.id));
        assert_eq!(FormKind::Contact.document_step(), None);
    }
}
