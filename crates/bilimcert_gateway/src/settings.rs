use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// API root, e.g. `http://localhost:8000/api`. Endpoint paths are appended.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Where the host sends the user after the session cannot be refreshed.
    pub login_path: String,
    pub refresh_path: String,
    /// Initial `Accept-Language` value.
    pub accept_language: Option<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            login_path: "/auth/login".to_string(),
            refresh_path: "/auth/refresh/".to_string(),
            accept_language: None,
        }
    }
}

impl GatewaySettings {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.accept_language = Some(code.into());
        self
    }
}
