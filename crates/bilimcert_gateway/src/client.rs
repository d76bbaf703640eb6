use std::sync::{Arc, Mutex};

use portal_logging::{portal_debug, portal_info, portal_warn};
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{
    Credentials, EmailRequest, GatewayError, GatewaySettings, Paginated, Registration, TokenPair,
    TokenStore,
};

/// The remote API as the rest of the portal sees it.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// `POST /registration`. Stores tokens when the backend returns them.
    async fn register(&self, registration: &Registration)
        -> Result<Option<TokenPair>, GatewayError>;

    /// `POST /auth`. Stores tokens when the backend returns them.
    async fn login(&self, credentials: &Credentials) -> Result<Option<TokenPair>, GatewayError>;

    /// `POST /logout`. Stored tokens are cleared whatever the outcome.
    async fn logout(&self) -> Result<(), GatewayError>;

    /// `POST /email/send`.
    async fn send_email(&self, email: &EmailRequest) -> Result<(), GatewayError>;

    /// `GET {path}` of a paginated collection.
    async fn fetch_page(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Paginated<Value>, GatewayError>;
}

enum Body<'a> {
    Empty,
    Json(String),
    Email(&'a EmailRequest),
}

struct RawResponse {
    status: StatusCode,
    text: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Backend replies may carry tokens at the top level or under `tokens`, and
/// report application errors through `status` + `response`.
#[derive(Deserialize, Default)]
#[serde(default)]
struct Envelope {
    status: Option<Value>,
    response: Option<Value>,
    message: Option<String>,
    error: Option<String>,
    detail: Option<String>,
    access: Option<String>,
    refresh: Option<String>,
    tokens: Option<TokenPair>,
}

impl Envelope {
    fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    fn status_code(&self) -> Option<u16> {
        match self.status.as_ref()? {
            Value::Number(number) => number.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn response_message(&self) -> Option<String> {
        match self.response.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn detail(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .or_else(|| self.detail.clone())
            .or_else(|| self.response_message())
    }

    fn into_tokens(self) -> Option<TokenPair> {
        self.tokens.or_else(|| {
            self.access
                .map(|access| TokenPair::new(access, self.refresh))
        })
    }
}

pub struct ReqwestGateway {
    settings: GatewaySettings,
    base: Url,
    client: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
    language: Mutex<Option<String>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ReqwestGateway {
    pub fn new(
        settings: GatewaySettings,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, GatewayError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| GatewayError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidUrl(format!(
                "unsupported scheme {}",
                base.scheme()
            )));
        }
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::Network(err.to_string()))?;

        let language = Mutex::new(settings.accept_language.clone());
        Ok(Self {
            settings,
            base,
            client,
            tokens,
            language,
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Changes the `Accept-Language` sent from now on.
    pub fn set_language(&self, code: Option<String>) {
        *self
            .language
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = code;
    }

    fn language(&self) -> Option<String> {
        self.language
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| GatewayError::InvalidUrl(format!("{path}: {err}")))
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: &Body<'_>,
        access: Option<&str>,
    ) -> Result<RawResponse, GatewayError> {
        let mut request = self.client.request(method, url);
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(language) = self.language() {
            request = request.header(ACCEPT_LANGUAGE, language);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(json) => request
                .header(CONTENT_TYPE, "application/json")
                .body(json.clone()),
            Body::Email(email) => request.multipart(email_form(email)),
        };

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        Ok(RawResponse { status, text })
    }

    async fn refresh_access(&self, refresh: &str) -> Result<TokenPair, GatewayError> {
        let url = self.endpoint(&self.settings.refresh_path)?;
        let body = serde_json::json!({ "refresh": refresh }).to_string();
        let raw = self
            .send_once(Method::POST, url, &Body::Json(body), None)
            .await?;
        if !raw.status.is_success() {
            return Err(GatewayError::HttpStatus {
                status: raw.status.as_u16(),
                detail: Envelope::parse(&raw.text).detail(),
            });
        }
        let parsed: RefreshResponse = serde_json::from_str(&raw.text)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(TokenPair::new(
            parsed.access,
            parsed.refresh.or_else(|| Some(refresh.to_string())),
        ))
    }

    /// Replaces the access token that was rejected. Renewals run one at a
    /// time; a caller that waited behind another renewal reuses its result
    /// instead of spending the refresh token again.
    async fn renew_access(&self, rejected: &TokenPair) -> Result<TokenPair, GatewayError> {
        let _renewing = self.refresh_lock.lock().await;

        let current = match self.tokens.load() {
            Some(current) if current.access != rejected.access => return Ok(current),
            Some(current) => current,
            None => return Err(self.session_expired()),
        };
        let Some(refresh) = current.refresh.as_deref() else {
            return Err(self.session_expired());
        };

        match self.refresh_access(refresh).await {
            Ok(fresh) => {
                self.tokens.save(&fresh)?;
                Ok(fresh)
            }
            Err(err) => {
                portal_warn!("Token refresh failed: {err}; clearing session");
                self.tokens.clear()?;
                Err(self.session_expired())
            }
        }
    }

    fn session_expired(&self) -> GatewayError {
        GatewayError::SessionExpired {
            login_path: self.settings.login_path.clone(),
        }
    }

    /// Sends with the stored bearer token. A 401 triggers one refresh and one
    /// retry; a failed refresh clears the stored tokens.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Body<'_>,
    ) -> Result<String, GatewayError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let stored = self.tokens.load();
        let access = stored.as_ref().map(|pair| pair.access.as_str());
        let mut raw = self
            .send_once(method.clone(), url.clone(), &body, access)
            .await?;

        if raw.status == StatusCode::UNAUTHORIZED {
            if let Some(rejected) = stored.as_ref().filter(|pair| pair.refresh.is_some()) {
                portal_debug!("{method} {path} returned 401, renewing access token");
                let fresh = self.renew_access(rejected).await?;
                raw = self
                    .send_once(method, url, &body, Some(&fresh.access))
                    .await?;
            }
        }

        check_response(raw)
    }

    fn remember_tokens(&self, text: &str) -> Result<Option<TokenPair>, GatewayError> {
        let tokens = Envelope::parse(text).into_tokens();
        if let Some(pair) = &tokens {
            self.tokens.save(pair)?;
        }
        Ok(tokens)
    }
}

#[async_trait::async_trait]
impl Gateway for ReqwestGateway {
    async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Option<TokenPair>, GatewayError> {
        let body = serde_json::to_string(registration)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        let text = self
            .execute(Method::POST, "registration", &[], Body::Json(body))
            .await?;
        portal_info!("Registered user {}", registration.username);
        self.remember_tokens(&text)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Option<TokenPair>, GatewayError> {
        let body = serde_json::to_string(credentials)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        let text = self
            .execute(Method::POST, "auth", &[], Body::Json(body))
            .await?;
        portal_info!("Signed in as {}", credentials.username);
        self.remember_tokens(&text)
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        let result = self
            .execute(Method::POST, "logout", &[], Body::Empty)
            .await
            .map(|_| ());
        self.tokens.clear()?;
        result
    }

    async fn send_email(&self, email: &EmailRequest) -> Result<(), GatewayError> {
        portal_debug!(
            "Sending email to {} (attachment: {})",
            email.to,
            email.is_files()
        );
        self.execute(Method::POST, "email/send", &[], Body::Email(email))
            .await?;
        portal_info!("Email to {} accepted", email.to);
        Ok(())
    }

    async fn fetch_page(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Paginated<Value>, GatewayError> {
        let text = self.execute(Method::GET, path, query, Body::Empty).await?;
        serde_json::from_str(&text).map_err(|err| GatewayError::Decode(err.to_string()))
    }
}

fn check_response(raw: RawResponse) -> Result<String, GatewayError> {
    if !raw.status.is_success() {
        return Err(GatewayError::HttpStatus {
            status: raw.status.as_u16(),
            detail: Envelope::parse(&raw.text).detail(),
        });
    }
    let envelope = Envelope::parse(&raw.text);
    if let Some(status) = envelope.status_code().filter(|status| *status != 200) {
        return Err(GatewayError::Rejected {
            status,
            message: envelope
                .response_message()
                .or_else(|| envelope.detail())
                .unwrap_or_default(),
        });
    }
    Ok(raw.text)
}

// Multipart forms are consumed on send, so retries rebuild them.
fn email_form(email: &EmailRequest) -> Form {
    let mut form = Form::new()
        .text("subject", email.subject.clone())
        .text("message", email.message.clone())
        .text("to", email.to.clone())
        .text("isFiles", email.is_files().to_string())
        .text("recaptcha_token", email.recaptcha_token.clone());
    if let Some(file) = &email.file {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let part = part.mime_str(&file.content_type).unwrap_or_else(|_| {
            Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
        });
        form = form.part("file", part);
    }
    form
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::Timeout;
    }
    GatewayError::Network(err.to_string())
}
