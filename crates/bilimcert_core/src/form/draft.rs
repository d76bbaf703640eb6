use std::collections::BTreeMap;
use std::fmt;

use super::Attachment;

/// Opaque token from the human-verification widget. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct CaptchaToken(String);

impl CaptchaToken {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CaptchaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptchaToken(<{} chars>)", self.0.len())
    }
}

/// Everything the user has entered so far, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormDraft {
    texts: BTreeMap<String, String>,
    flags: BTreeMap<String, bool>,
    attachment: Option<Attachment>,
    captcha: Option<CaptchaToken>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of `field`, or `""` when it was never set.
    pub fn text(&self, field: &str) -> &str {
        self.texts.get(field).map(String::as_str).unwrap_or("")
    }

    /// Trimmed text of `field`, `None` when blank.
    pub fn optional_text(&self, field: &str) -> Option<String> {
        let value = self.text(field).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn flag(&self, field: &str) -> bool {
        self.flags.get(field).copied().unwrap_or(false)
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn captcha(&self) -> Option<&CaptchaToken> {
        self.captcha.as_ref()
    }

    pub fn set_text(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.texts.insert(field.into(), value.into());
    }

    pub fn set_flag(&mut self, field: impl Into<String>, value: bool) {
        self.flags.insert(field.into(), value);
    }

    pub fn set_attachment(&mut self, attachment: Option<Attachment>) {
        self.attachment = attachment;
    }

    pub fn set_captcha(&mut self, token: Option<CaptchaToken>) {
        self.captcha = token;
    }

    /// Fluent variant of `set_text`.
    pub fn with_text(mut self, field: &str, value: &str) -> Self {
        self.set_text(field, value);
        self
    }

    pub fn with_flag(mut self, field: &str, value: bool) -> Self {
        self.set_flag(field, value);
        self
    }

    pub fn with_captcha(mut self, token: &str) -> Self {
        self.captcha = CaptchaToken::new(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_captcha_tokens_are_rejected() {
        assert!(CaptchaToken::new("").is_none());
        assert!(CaptchaToken::new("   ").is_none());
        assert_eq!(CaptchaToken::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn captcha_debug_does_not_leak_token() {
        let token = CaptchaToken::new("secret-token").unwrap();
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn optional_text_trims_and_drops_blank() {
        let draft = FormDraft::new()
            .with_text("phone", "  ")
            .with_text("name", " Aigerim ");
        assert_eq!(draft.optional_text("phone"), None);
        assert_eq!(draft.optional_text("name").as_deref(), Some("Aigerim"));
        assert_eq!(draft.text("missing"), "");
    }
}
