use crate::utils::string::contains_ignore_case;

/// Proxy client a subscription is rewritten for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    Clash,
    Surge,
}

impl ClientKind {
    /// Convert string to client kind, ignoring case
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "clash" => Some(ClientKind::Clash),
            "surge" => Some(ClientKind::Surge),
            _ => None,
        }
    }

    /// Detect the client kind from a `User-Agent` header value
    pub fn from_user_agent(user_agent: &str) -> Option<Self> {
        if contains_ignore_case(user_agent, "Clash") {
            Some(ClientKind::Clash)
        } else if contains_ignore_case(user_agent, "Surge")
            || contains_ignore_case(user_agent, "Surfboard")
        {
            Some(ClientKind::Surge)
        } else {
            None
        }
    }

    /// Name sent upstream as `User-Agent` when fetching a subscription
    pub fn user_agent(&self) -> &'static str {
        match self {
            ClientKind::Clash => "CLASH",
            ClientKind::Surge => "SURGE",
        }
    }

    /// Name of the presentation template for this client
    pub fn template_name(&self) -> &'static str {
        match self {
            ClientKind::Clash => "clash",
            ClientKind::Surge => "surge",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ClientKind::Clash => "application/yaml",
            ClientKind::Surge => "text/plain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(ClientKind::from_str("CLASH"), Some(ClientKind::Clash));
        assert_eq!(ClientKind::from_str("Surge"), Some(ClientKind::Surge));
        assert_eq!(ClientKind::from_str("quanx"), None);
        assert_eq!(ClientKind::from_str(""), None);
    }

    #[test]
    fn test_from_user_agent() {
        assert_eq!(
            ClientKind::from_user_agent("ClashforWindows/0.20.39"),
            Some(ClientKind::Clash)
        );
        assert_eq!(
            ClientKind::from_user_agent("clash.meta"),
            Some(ClientKind::Clash)
        );
        assert_eq!(
            ClientKind::from_user_agent("Surge iOS/2920"),
            Some(ClientKind::Surge)
        );
        assert_eq!(
            ClientKind::from_user_agent("Surfboard/2.15 Android"),
            Some(ClientKind::Surge)
        );
        assert_eq!(ClientKind::from_user_agent("curl/8.5.0"), None);
    }
}
