use serde_yaml::Value;
use subs::utils::ini::parse_sections;
use subs::{rewrite_subscription, ClientKind, RewriteError, UpstreamHeaders};

const SURGE_SUB: &str = "\
[General]
loglevel = notify
dns-server = 1.1.1.1
[Proxy]
A=1, Bandwidth=10GB
B=2, Expire=2025
Direct=x
HK = ss, hk.example.com, 8388, encrypt-method=aes-128-gcm, password=pw
Empty =
[Rule]
FINAL,DIRECT
";

const CLASH_SUB: &str = r#"
mixed-port: 7890
proxies:
  - name: X
    type: ss
    server: x.example.com
    port: 8388
  - name: Y
    type: ss
    server: y.example.com
    port: 8388
proxy-groups:
  - name: Provider
    type: select
    proxies: [X]
"#;

fn headers(userinfo: Option<&str>) -> UpstreamHeaders {
    UpstreamHeaders {
        content_disposition_type: Some("attachment".to_string()),
        content_disposition_filename: Some("cfg.yaml".to_string()),
        subscription_userinfo: userinfo.map(str::to_string),
    }
}

#[cfg(test)]
mod surge_rewrite_tests {
    use super::*;

    #[test]
    fn test_surge_sections() {
        let result = rewrite_subscription(ClientKind::Surge, SURGE_SUB, &headers(None)).unwrap();
        let sections = parse_sections(&result.body);

        assert_eq!(
            sections.names(),
            vec!["General", "Proxy", "Panel", "Proxy Group"]
        );
        assert_eq!(sections.get("General"), Some("dns-server=1.1.1.1\n"));
        assert_eq!(
            sections.get("Proxy"),
            Some("HK=ss, hk.example.com, 8388, encrypt-method=aes-128-gcm, password=pw\n")
        );
        assert_eq!(
            sections.get("Panel"),
            Some("SubscribeInfo=title=SubscribeInfo, content=A\\nB\\n, style=info\n")
        );
        assert_eq!(
            sections.get("Proxy Group"),
            Some("PROXY=select, AUTO, HK\nAUTO=url-test, HK\nUNMATCHED=select, PROXY, DIRECT\n")
        );
    }

    #[test]
    fn test_surge_headers() {
        let result = rewrite_subscription(
            ClientKind::Surge,
            SURGE_SUB,
            &headers(Some("upload=1; download=2")),
        )
        .unwrap();
        assert_eq!(
            result.headers.content_disposition.as_deref(),
            Some("attachment; filename=\"(. Y .) cfg.yaml\"")
        );
        assert_eq!(result.headers.subscription_userinfo, None);
    }

    #[test]
    fn test_surge_never_fails() {
        let result =
            rewrite_subscription(ClientKind::Surge, "not an ini file at all", &UpstreamHeaders::default())
                .unwrap();
        assert_eq!(result.headers.content_disposition, None);
        let sections = parse_sections(&result.body);
        assert_eq!(sections.names(), vec!["Panel", "Proxy", "Proxy Group"]);
    }

    #[test]
    fn test_surge_is_deterministic() {
        let first = rewrite_subscription(ClientKind::Surge, SURGE_SUB, &headers(None)).unwrap();
        let second = rewrite_subscription(ClientKind::Surge, SURGE_SUB, &headers(None)).unwrap();
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod clash_rewrite_tests {
    use super::*;

    #[test]
    fn test_clash_rewrite() {
        let result = rewrite_subscription(
            ClientKind::Clash,
            CLASH_SUB,
            &headers(Some("upload=1; download=2; total=3; expire=4")),
        )
        .unwrap();

        let output: Value = serde_yaml::from_str(&result.body).unwrap();
        assert!(output.get("mixed-port").is_none());
        assert_eq!(output["proxies"].as_sequence().unwrap().len(), 2);

        let groups = output["proxy-groups"].as_sequence().unwrap();
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g["name"].as_str() != Some("Provider")));
        let proxy: Vec<&str> = groups[0]["proxies"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(proxy, vec!["URL-TEST", "FALLBACK", "X", "Y"]);

        assert_eq!(
            result.headers.subscription_userinfo.as_deref(),
            Some("upload=1; download=2; total=3; expire=4")
        );
        assert_eq!(
            result.headers.content_disposition.as_deref(),
            Some("attachment; filename=\"(. Y .) cfg.yaml\"")
        );
    }

    #[test]
    fn test_clash_without_proxies() {
        let err = rewrite_subscription(
            ClientKind::Clash,
            "mixed-port: 7890\n",
            &headers(Some("upload=1")),
        )
        .unwrap_err();
        assert!(matches!(err, RewriteError::Shape(_)));
    }

    #[test]
    fn test_clash_with_surge_body() {
        let err = rewrite_subscription(ClientKind::Clash, SURGE_SUB, &UpstreamHeaders::default())
            .unwrap_err();
        assert!(matches!(err, RewriteError::Decode(_)));
    }
}
