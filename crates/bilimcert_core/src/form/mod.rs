//! Form drafts, per-step validation, typed submissions and the form session
//! that drives a wizard to a submission.
mod attachment;
mod draft;
mod kinds;
mod requests;
mod session;
mod validate;

pub use attachment::{content_type_for, Attachment, AttachmentError, AttachmentPolicy};
pub use draft::{CaptchaToken, FormDraft};
pub use kinds::{fields, FormKind};
pub use requests::{
    review_items, AccreditationRequest, ContactRequest, FormSubmission, OutgoingEmail,
    PartnershipRequest, QuestionCategory, QuestionRequest, RecognitionRequest, ReviewItem,
};
pub use session::{update_form, FormSession};
pub use validate::{
    check_field, is_valid_email, is_valid_phone, FieldErrors, FieldRule, Rule, ValidationGate,
    ValidationIssue,
};
