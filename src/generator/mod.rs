//! Subscription rewrite pipelines
//!
//! [`rewrite_subscription`] is the entry point: it picks the Surge or Clash
//! pipeline for the client and rewrites the response headers. Everything in
//! here is pure, it never touches the network or the disk.

pub mod clash;
pub mod headers;
pub mod surge;

use log::debug;
use thiserror::Error;

use crate::models::{ClientKind, ResponseHeaders, RewriteResult, UpstreamHeaders};

pub use clash::rewrite_clash;
pub use headers::{rename_attachment, ContentDisposition};
pub use surge::rewrite_surge;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The document is not valid in its format
    #[error("Decode error: {0}")]
    Decode(String),

    /// The document parses but lacks what the rewrite needs
    #[error("Shape error: {0}")]
    Shape(String),
}

/// Rewrite an upstream subscription for the given client
///
/// # Arguments
/// * `kind` - The client the result is served to
/// * `body` - The raw upstream document
/// * `upstream` - Headers of the upstream response
///
/// # Returns
/// * `Ok(RewriteResult)` - The rewritten body and the headers to send
/// * `Err(RewriteError)` - If the Clash document cannot be rewritten
pub fn rewrite_subscription(
    kind: ClientKind,
    body: &str,
    upstream: &UpstreamHeaders,
) -> Result<RewriteResult, RewriteError> {
    debug!("Rewriting {} bytes for {:?}", body.len(), kind);
    let mut headers = ResponseHeaders {
        content_disposition: rename_attachment(upstream),
        subscription_userinfo: None,
    };

    let body = match kind {
        ClientKind::Clash => {
            let body = rewrite_clash(body)?;
            headers.subscription_userinfo = upstream.subscription_userinfo.clone();
            body
        }
        ClientKind::Surge => rewrite_surge(body),
    };

    Ok(RewriteResult { body, headers })
}
