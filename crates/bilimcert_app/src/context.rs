use std::io;
use std::sync::Arc;

use bilimcert_core::context::{AccessibilitySettings, Language, Translator};
use bilimcert_core::form::{FormKind, FormSession};
use bilimcert_core::WizardError;
use bilimcert_gateway::{
    EngineHandle, FileTokenStore, Gateway, GatewayError, ReqwestGateway, TokenStore,
};
use portal_logging::{portal_error, portal_info};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::effects::EffectRunner;
use crate::persistence::{load_preferences, save_preferences, Preferences};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("could not start the engine: {0}")]
    Engine(#[from] io::Error),
}

/// Everything the host shares between pages: preferences, session and the
/// gateway with its effect runner.
pub struct AppContext {
    config: SiteConfig,
    preferences: Preferences,
    translator: Translator,
    tokens: Arc<dyn TokenStore>,
    gateway: Arc<ReqwestGateway>,
    runner: EffectRunner,
}

impl AppContext {
    /// Loads preferences first, then opens the token store, then builds the
    /// gateway so its first request already carries the saved language.
    pub fn init(config: SiteConfig) -> Result<Self, AppError> {
        let preferences = load_preferences(&config.state_dir);
        let translator = Translator::builtin(preferences.language);
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.state_dir.clone()));
        let gateway = Arc::new(ReqwestGateway::new(
            config.gateway_settings(preferences.language),
            tokens.clone(),
        )?);
        let engine_gateway: Arc<dyn Gateway> = gateway.clone();
        let runner = EffectRunner::new(EngineHandle::new(engine_gateway)?);

        portal_info!(
            "Portal context ready: api={} language={} signed_in={}",
            config.api_url,
            preferences.language.code(),
            tokens.load().is_some()
        );
        Ok(Self {
            config,
            preferences,
            translator,
            tokens,
            gateway,
            runner,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn gateway(&self) -> Arc<ReqwestGateway> {
        self.gateway.clone()
    }

    pub fn runner(&mut self) -> &mut EffectRunner {
        &mut self.runner
    }

    /// Split borrow for polling the runner while translating messages.
    pub fn runner_and_translator(&mut self) -> (&mut EffectRunner, &Translator) {
        (&mut self.runner, &self.translator)
    }

    pub fn language(&self) -> Language {
        self.preferences.language
    }

    pub fn set_language(&mut self, language: Language) {
        if self.preferences.language == language {
            return;
        }
        self.preferences.language = language;
        self.translator.set_language(language);
        self.gateway.set_language(Some(language.code().to_string()));
        self.persist();
    }

    pub fn accessibility(&self) -> AccessibilitySettings {
        self.preferences.accessibility
    }

    pub fn update_accessibility(&mut self, change: impl FnOnce(&mut AccessibilitySettings)) {
        let mut settings = self.preferences.accessibility;
        change(&mut settings);
        if settings != self.preferences.accessibility {
            self.preferences.accessibility = settings;
            self.persist();
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.tokens.load().is_some()
    }

    /// Ends the session on the backend. Language and accessibility stay.
    pub fn logout(&self) {
        portal_info!("Logging out");
        self.runner.logout();
    }

    pub fn open_form(&self, kind: FormKind) -> Result<FormSession, WizardError> {
        FormSession::new(kind, &self.translator)
    }

    fn persist(&self) {
        if let Err(err) = save_preferences(&self.config.state_dir, &self.preferences) {
            portal_error!(
                "Failed to save preferences to {:?}: {}",
                self.config.state_dir,
                err
            );
        }
    }
}
