use std::collections::HashMap;
use std::time::Duration;

use bilimcert_core::context::Translator;
use bilimcert_core::form::OutgoingEmail;
use bilimcert_core::listing::{RemotePage, RequestSeq};
use bilimcert_core::{AttemptId, FormEffect, FormMsg, ListEffect, ListMsg};
use bilimcert_gateway::{
    EmailRequest, EngineEvent, EngineHandle, FileAttachment, GatewayError, Paginated, RequestId,
};
use portal_logging::{portal_debug, portal_info, portal_warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::messages::user_error;

enum Pending {
    Submission { attempt: AttemptId },
    Page { endpoint: String, seq: RequestSeq },
}

/// Something the host has to feed back into its state machines.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Form(FormMsg),
    Page {
        endpoint: String,
        seq: RequestSeq,
        result: Result<Paginated<Value>, GatewayError>,
    },
    /// The refresh token was rejected; send the user to `login_path`.
    SessionExpired { login_path: String },
    LoggedOut,
}

/// Turns core effects into engine commands and engine events into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    next_request: RequestId,
    pending: HashMap<RequestId, Pending>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            next_request: 0,
            pending: HashMap::new(),
        }
    }

    /// Executes submissions and hands back the effects meant for the UI.
    pub fn run_form_effects(&mut self, effects: Vec<FormEffect>) -> Vec<FormEffect> {
        let mut for_ui = Vec::new();
        for effect in effects {
            match effect {
                FormEffect::Submit { attempt, email } => {
                    let request_id = self.track(Pending::Submission { attempt });
                    portal_info!(
                        "Submit attempt={} request_id={} to={} files={}",
                        attempt,
                        request_id,
                        email.to,
                        email.is_files()
                    );
                    self.engine.send_email(request_id, email_request(email));
                }
                other => for_ui.push(other),
            }
        }
        for_ui
    }

    pub fn run_list_effects(&mut self, endpoint: &str, effects: Vec<ListEffect>) {
        for effect in effects {
            match effect {
                ListEffect::Fetch { seq, query } => {
                    let request_id = self.track(Pending::Page {
                        endpoint: endpoint.to_string(),
                        seq,
                    });
                    portal_debug!("Fetch {} seq={} page={}", endpoint, seq, query.page);
                    self.engine
                        .fetch_page(request_id, endpoint, query.to_pairs());
                }
            }
        }
    }

    pub fn logout(&self) {
        self.engine.logout();
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains every engine event that is already available.
    pub fn poll(&mut self, translator: &Translator) -> Vec<HostEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            self.translate(event, translator, &mut out);
        }
        out
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn wait(&mut self, timeout: Duration, translator: &Translator) -> Vec<HostEvent> {
        let mut out = Vec::new();
        if let Some(event) = self.engine.recv_timeout(timeout) {
            self.translate(event, translator, &mut out);
        }
        out
    }

    fn track(&mut self, pending: Pending) -> RequestId {
        self.next_request += 1;
        self.pending.insert(self.next_request, pending);
        self.next_request
    }

    fn translate(&mut self, event: EngineEvent, translator: &Translator, out: &mut Vec<HostEvent>) {
        match event {
            EngineEvent::EmailSent { request_id, result } => {
                let Some(Pending::Submission { attempt }) = self.pending.remove(&request_id)
                else {
                    portal_warn!("Dropping email result for unknown request {}", request_id);
                    return;
                };
                push_expiry(result.as_ref().err(), out);
                let outcome = result.map_err(|err| {
                    portal_warn!("Submission attempt {} failed: {}", attempt, err);
                    user_error(&err, translator).message
                });
                out.push(HostEvent::Form(FormMsg::SubmissionSettled { attempt, outcome }));
            }
            EngineEvent::PageFetched { request_id, result } => {
                let Some(Pending::Page { endpoint, seq }) = self.pending.remove(&request_id)
                else {
                    portal_warn!("Dropping page for unknown request {}", request_id);
                    return;
                };
                push_expiry(result.as_ref().err(), out);
                out.push(HostEvent::Page {
                    endpoint,
                    seq,
                    result,
                });
            }
            EngineEvent::LoggedOut { result } => {
                if let Err(err) = result {
                    portal_warn!("Logout request failed: {}; tokens cleared anyway", err);
                }
                out.push(HostEvent::LoggedOut);
            }
        }
    }
}

fn push_expiry(err: Option<&GatewayError>, out: &mut Vec<HostEvent>) {
    if let Some(GatewayError::SessionExpired { login_path }) = err {
        out.push(HostEvent::SessionExpired {
            login_path: login_path.clone(),
        });
    }
}

/// Decodes a fetched page into the listing message for `seq`.
pub fn page_msg<T: DeserializeOwned>(
    seq: RequestSeq,
    result: Result<Paginated<Value>, GatewayError>,
    translator: &Translator,
) -> ListMsg<T> {
    let result = result
        .and_then(|page| page.decode::<T>())
        .map(|page| RemotePage {
            results: page.results,
            count: page.count,
            next: page.next,
            previous: page.previous,
        })
        .map_err(|err| user_error(&err, translator).message);
    ListMsg::FetchCompleted { seq, result }
}

pub fn email_request(email: OutgoingEmail) -> EmailRequest {
    EmailRequest {
        subject: email.subject,
        message: email.message,
        to: email.to,
        file: email.attachment.map(|attachment| FileAttachment {
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            bytes: attachment.bytes,
        }),
        recaptcha_token: email.recaptcha_token.as_str().to_string(),
    }
}
