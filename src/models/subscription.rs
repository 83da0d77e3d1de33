/// Headers of the upstream subscription response that affect the rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamHeaders {
    /// Disposition type, e.g. `attachment`
    pub content_disposition_type: Option<String>,
    /// Filename announced by the upstream
    pub content_disposition_filename: Option<String>,
    /// Raw `subscription-userinfo` header value
    pub subscription_userinfo: Option<String>,
}

/// Headers to set on the outgoing response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    /// Full `Content-Disposition` header value
    pub content_disposition: Option<String>,
    /// `subscription-userinfo` value copied from the upstream
    pub subscription_userinfo: Option<String>,
}

impl ResponseHeaders {
    /// Header name and value pairs that are present
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(disposition) = &self.content_disposition {
            pairs.push(("Content-Disposition", disposition.clone()));
        }
        if let Some(userinfo) = &self.subscription_userinfo {
            pairs.push(("subscription-userinfo", userinfo.clone()));
        }
        pairs
    }
}

/// Result of rewriting a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    /// Rewritten document body
    pub body: String,
    /// Response headers
    pub headers: ResponseHeaders,
}
