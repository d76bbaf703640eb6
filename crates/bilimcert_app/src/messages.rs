use bilimcert_core::context::Translator;
use bilimcert_gateway::GatewayError;

/// What the user sees when a gateway call fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError {
    pub message: String,
    /// Backend-provided text, shown as secondary detail when present.
    pub details: Option<String>,
}

pub fn user_error(err: &GatewayError, translator: &Translator) -> UserError {
    let key = message_key(err);
    let details = match err {
        GatewayError::HttpStatus { detail, .. } => detail.clone(),
        GatewayError::Rejected { message, .. } if !message.is_empty() => Some(message.clone()),
        GatewayError::Decode(reason) | GatewayError::Storage(reason) => Some(reason.clone()),
        _ => None,
    };
    UserError {
        message: translator.t(&key),
        details,
    }
}

fn message_key(err: &GatewayError) -> String {
    match err {
        GatewayError::SessionExpired { .. } => "errors.session_expired".to_string(),
        GatewayError::Timeout => "errors.timeout".to_string(),
        GatewayError::Network(_) => "errors.network".to_string(),
        other => match other.status() {
            Some(status @ (400 | 401 | 403 | 404 | 500)) => format!("errors.{status}"),
            _ => "errors.unknown".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use bilimcert_core::context::Language;

    use super::*;

    #[test]
    fn status_table_in_kazakh() {
        let translator = Translator::builtin(Language::Kz);
        let cases = [
            (400, "Дұрыс емес деректер жіберілді"),
            (401, "Авторизация қажет"),
            (403, "Қол жеткізу құқығы жоқ"),
            (404, "Ресурс табылмады"),
            (500, "Сервер қатесі"),
            (418, "Белгісіз қате орын алды"),
        ];
        for (status, expected) in cases {
            let err = GatewayError::HttpStatus {
                status,
                detail: None,
            };
            assert_eq!(user_error(&err, &translator).message, expected, "{status}");
        }
    }

    #[test]
    fn transport_failures_ask_to_check_connection() {
        let translator = Translator::builtin(Language::Kz);
        let err = GatewayError::Network("connection refused".into());
        assert_eq!(
            user_error(&err, &translator).message,
            "Желі қатесі. Интернет байланысын тексеріңіз."
        );
        assert_eq!(user_error(&err, &translator).details, None);
    }

    #[test]
    fn rejection_keeps_backend_message_as_detail() {
        let translator = Translator::builtin(Language::Kz);
        let err = GatewayError::Rejected {
            status: 400,
            message: "reCAPTCHA failed".into(),
        };
        let shown = user_error(&err, &translator);
        assert_eq!(shown.message, "Дұрыс емес деректер жіберілді");
        assert_eq!(shown.details.as_deref(), Some("reCAPTCHA failed"));
    }

    #[test]
    fn follows_current_language() {
        let translator = Translator::builtin(Language::En);
        let err = GatewayError::SessionExpired {
            login_path: "/auth/login".into(),
        };
        let message = user_error(&err, &translator).message;
        assert!(!message.is_empty());
        assert_ne!(message, "errors.session_expired");
    }
}
