//! BilimCert portal host: configuration, logging, preferences and the glue
//! between the pure core and the remote gateway.
pub mod config;
pub mod context;
pub mod effects;
pub mod logging;
pub mod messages;
pub mod persistence;

pub use config::{ConfigError, SiteConfig};
pub use context::{AppContext, AppError};
pub use effects::{email_request, page_msg, EffectRunner, HostEvent};
pub use logging::LogDestination;
pub use messages::{user_error, UserError};
pub use persistence::{load_preferences, save_preferences, Preferences};
