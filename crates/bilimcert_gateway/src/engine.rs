use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use portal_logging::portal_debug;

use crate::client::Gateway;
use crate::{EmailRequest, EngineEvent, RequestId};

enum EngineCommand {
    SendEmail {
        request_id: RequestId,
        email: EmailRequest,
    },
    FetchPage {
        request_id: RequestId,
        path: String,
        query: Vec<(String, String)>,
    },
    Logout,
}

/// Runs gateway calls on a background tokio runtime and hands the results
/// back through a channel the host polls.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(gateway: Arc<dyn Gateway>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("bilimcert-engine".into())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let gateway = gateway.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(gateway.as_ref(), command, event_tx).await;
                    });
                }
                portal_debug!("Engine command channel closed");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn send_email(&self, request_id: RequestId, email: EmailRequest) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::SendEmail { request_id, email });
    }

    pub fn fetch_page(
        &self,
        request_id: RequestId,
        path: impl Into<String>,
        query: Vec<(String, String)>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::FetchPage {
            request_id,
            path: path.into(),
            query,
        });
    }

    pub fn logout(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Logout);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    gateway: &dyn Gateway,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::SendEmail { request_id, email } => EngineEvent::EmailSent {
            request_id,
            result: gateway.send_email(&email).await,
        },
        EngineCommand::FetchPage {
            request_id,
            path,
            query,
        } => EngineEvent::PageFetched {
            request_id,
            result: gateway.fetch_page(&path, &query).await,
        },
        EngineCommand::Logout => EngineEvent::LoggedOut {
            result: gateway.logout().await,
        },
    };
    let _ = event_tx.send(event);
}
