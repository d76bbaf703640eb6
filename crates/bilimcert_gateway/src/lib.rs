//! Remote API gateway: authenticated HTTP calls, token storage and the
//! background engine that runs them off the UI thread.
mod client;
mod engine;
mod persist;
mod settings;
mod token;
mod types;

pub use client::{Gateway, ReqwestGateway};
pub use engine::EngineHandle;
pub use persist::{ensure_state_dir, AtomicFileWriter, FileTokenStore, PersistError};
pub use settings::{GatewaySettings, DEFAULT_API_URL};
pub use token::{MemoryTokenStore, TokenPair, TokenStore};
pub use types::{
    Credentials, EmailRequest, EngineEvent, FileAttachment, GatewayError, Paginated,
    Registration, RequestId,
};
