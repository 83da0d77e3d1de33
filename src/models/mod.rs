//! Core data models for the application
//!
//! This module contains the data structures shared by the rewrite pipelines,
//! the fetcher and the web handlers, separated from the logic that operates
//! on them.
//!
//! ```rust
//! use subs::models::ClientKind;
//!
//! let kind = ClientKind::from_user_agent("ClashX/1.118.0").unwrap();
//! assert_eq!(kind, ClientKind::Clash);
//! assert_eq!(kind.user_agent(), "CLASH");
//! ```

pub mod client_kind;
pub mod proxy_group_config;
pub mod subscription;

pub use client_kind::ClientKind;
pub use proxy_group_config::{ProxyGroup, ProxyGroupType, ProxyGroups};
pub use subscription::{ResponseHeaders, RewriteResult, UpstreamHeaders};
