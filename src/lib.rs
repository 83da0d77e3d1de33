pub mod generator;
pub mod models;
pub mod settings;
pub mod template;
pub mod utils;
#[cfg(feature = "web-api")]
pub mod web_handlers;

// Re-export the rewrite entry point and its types for easier access
pub use generator::{rewrite_subscription, RewriteError};
pub use models::{ClientKind, ResponseHeaders, RewriteResult, UpstreamHeaders};

// Re-export configuration types
pub use settings::Settings;
