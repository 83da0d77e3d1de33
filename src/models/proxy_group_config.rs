use serde::Serialize;

/// Type of proxy group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProxyGroupType {
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "url-test")]
    URLTest,
    #[serde(rename = "fallback")]
    Fallback,
}

/// A proxy group injected into a rewritten subscription
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyGroup {
    /// Name of the proxy group
    pub name: String,
    /// Type of the proxy group
    #[serde(rename = "type")]
    pub group_type: ProxyGroupType,
    /// Names of the proxies and groups in this group
    pub proxies: Vec<String>,
    /// URL for testing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Interval in seconds between tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl ProxyGroup {
    /// Create a group without health checking
    pub fn new(name: &str, group_type: ProxyGroupType, proxies: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            group_type,
            proxies,
            url: None,
            interval: None,
        }
    }

    /// Attach a health check url and interval
    pub fn with_test(mut self, url: &str, interval: u32) -> Self {
        self.url = Some(url.to_string());
        self.interval = Some(interval);
        self
    }
}

/// A collection of proxy groups
pub type ProxyGroups = Vec<ProxyGroup>;
