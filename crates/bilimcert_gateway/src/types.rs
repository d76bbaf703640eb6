use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Correlates an engine command with the event that answers it.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {status}")]
    HttpStatus { status: u16, detail: Option<String> },
    #[error("rejected by backend (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("session expired, sign in again at {login_path}")]
    SessionExpired { login_path: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("token storage failed: {0}")]
    Storage(String),
}

impl GatewayError {
    /// HTTP-like status for the user-facing message table, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::HttpStatus { status, .. } | GatewayError::Rejected { status, .. } => {
                Some(*status)
            }
            GatewayError::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }

    /// Whether the request never got a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Timeout | GatewayError::Network(_))
    }
}

/// `{results, count, next, previous}` collection page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

impl Paginated<Value> {
    /// Decodes the raw results into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Paginated<T>, GatewayError> {
        let results = self
            .results
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(Paginated {
            results,
            count: self.count,
            next: self.next,
            previous: self.previous,
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAttachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Payload of the generic email endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailRequest {
    pub subject: String,
    pub message: String,
    pub to: String,
    pub file: Option<FileAttachment>,
    pub recaptcha_token: String,
}

impl EmailRequest {
    pub fn is_files(&self) -> bool {
        self.file.is_some()
    }
}

impl fmt::Debug for EmailRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailRequest")
            .field("subject", &self.subject)
            .field("to", &self.to)
            .field("message_len", &self.message.len())
            .field("file", &self.file)
            .field(
                "recaptcha_token",
                &portal_logging::redacted(Some(&self.recaptcha_token)),
            )
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub recaptcha_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &portal_logging::redacted(Some(&self.password)))
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,
    pub recaptcha_token: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &portal_logging::redacted(Some(&self.password)))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    EmailSent {
        request_id: RequestId,
        result: Result<(), GatewayError>,
    },
    PageFetched {
        request_id: RequestId,
        result: Result<Paginated<Value>, GatewayError>,
    },
    LoggedOut {
        result: Result<(), GatewayError>,
    },
}
