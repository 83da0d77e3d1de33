use log::debug;
use serde::Serialize;
use serde_yaml::Value;

use super::RewriteError;
use crate::models::{ProxyGroup, ProxyGroupType, ProxyGroups};

const TEST_URL: &str = "https://www.gstatic.com/generate_204";
const TEST_INTERVAL: u32 = 300;

/// Document handed to the template, everything else from the upstream is dropped
#[derive(Debug, Serialize)]
struct ClashProxiesAndGroups<'a> {
    proxies: &'a Value,
    #[serde(rename = "proxy-groups")]
    proxy_groups: ProxyGroups,
}

/// Rewrite a Clash subscription into its `proxies` and a fresh set of
/// `proxy-groups`
pub fn rewrite_clash(content: &str) -> Result<String, RewriteError> {
    let document: Value =
        serde_yaml::from_str(content).map_err(|e| RewriteError::Decode(e.to_string()))?;
    let mapping = document
        .as_mapping()
        .ok_or_else(|| RewriteError::Decode("document is not a mapping".to_string()))?;

    let proxies = mapping
        .get("proxies")
        .ok_or_else(|| RewriteError::Shape("missing `proxies`".to_string()))?;
    let names = proxy_names(proxies)?;
    debug!("Clash subscription has {} proxies", names.len());

    let output = ClashProxiesAndGroups {
        proxies,
        proxy_groups: build_proxy_groups(&names),
    };
    serde_yaml::to_string(&output).map_err(|e| RewriteError::Decode(e.to_string()))
}

fn proxy_names(proxies: &Value) -> Result<Vec<String>, RewriteError> {
    let list = proxies
        .as_sequence()
        .ok_or_else(|| RewriteError::Shape("`proxies` is not a list".to_string()))?;

    list.iter()
        .enumerate()
        .map(|(index, proxy)| {
            let name = proxy
                .as_mapping()
                .and_then(|proxy| proxy.get("name"))
                .ok_or_else(|| {
                    RewriteError::Shape(format!("proxy #{} has no `name`", index))
                })?;
            match name {
                Value::String(name) => Ok(name.clone()),
                Value::Number(name) => Ok(name.to_string()),
                Value::Bool(name) => Ok(name.to_string()),
                _ => Err(RewriteError::Shape(format!(
                    "proxy #{} has a non scalar `name`",
                    index
                ))),
            }
        })
        .collect()
}

/// Build the standard groups: a selector over two health checked groups
/// and a final catch-all selector.
pub fn build_proxy_groups(names: &[String]) -> ProxyGroups {
    let mut with_special = vec!["URL-TEST".to_string(), "FALLBACK".to_string()];
    with_special.extend(names.iter().cloned());

    vec![
        ProxyGroup::new("PROXY", ProxyGroupType::Select, with_special),
        ProxyGroup::new("URL-TEST", ProxyGroupType::URLTest, names.to_vec())
            .with_test(TEST_URL, TEST_INTERVAL),
        ProxyGroup::new("FALLBACK", ProxyGroupType::Fallback, names.to_vec())
            .with_test(TEST_URL, TEST_INTERVAL),
        ProxyGroup::new(
            "FINAL",
            ProxyGroupType::Select,
            ["PROXY", "URL-TEST", "FALLBACK", "DIRECT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
    ]
}
