use log::debug;

use crate::utils::ini::{
    parse_entries, parse_sections, serialize_entries, serialize_sections, IniEntries,
};
use crate::utils::string::contains_ignore_case;

/// Keys of the `[General]` section kept in the output
const GENERAL_KEYS: [&str; 7] = [
    "dns-server",
    "skip-proxy",
    "exclude-simple-hostnames",
    "ipv6",
    "internet-test-url",
    "proxy-test-url",
    "test-timeout",
];

/// Sections kept in the output
const ALLOWED_SECTIONS: [&str; 5] = ["General", "Proxy", "Proxy Group", "Host", "Panel"];

const PANEL_PREFIX: &str = "SubscribeInfo=title=SubscribeInfo, content=";
const PANEL_SUFFIX: &str = ", style=info";

/// Rewrite a Surge subscription
///
/// Scrubs `[General]`, turns the subscription info pseudo proxies into a
/// `[Panel]`, drops empty proxies, injects the standard `[Proxy Group]` and
/// keeps only the sections Surge clients need from a subscription.
pub fn rewrite_surge(content: &str) -> String {
    let mut sections = parse_sections(content);
    debug!("Surge subscription sections: {:?}", sections.names());

    if let Some(general) = sections.get("General") {
        let mut entries = parse_entries(general);
        entries.retain(|key, _| GENERAL_KEYS.contains(&key));
        sections.set("General", serialize_entries(&entries));
    }

    let mut proxies = parse_entries(sections.get("Proxy").unwrap_or_default());

    if !sections.contains("Panel") {
        let panel = extract_panel(&mut proxies);
        sections.set("Panel", panel);
    }

    proxies.retain(|_, value| !value.is_empty());
    let proxy_names = proxies.keys();
    sections.set("Proxy", serialize_entries(&proxies));
    sections.set("Proxy Group", proxy_group_section(&proxy_names));

    sections.retain_names(&ALLOWED_SECTIONS);
    serialize_sections(&sections)
}

const INFO_WORDS: [&str; 2] = ["Bandwidth", "Expire"];

/// An entry is subscription info when its name mentions usage or expiry, or
/// when its value carries a parameter named exactly `Bandwidth` or `Expire`.
/// Parameters like `download-bandwidth=` on real proxies do not count.
fn is_subscription_info(key: &str, value: &str) -> bool {
    if INFO_WORDS.iter().any(|word| contains_ignore_case(key, word)) {
        return true;
    }
    value.split(',').any(|param| {
        param.split_once('=').is_some_and(|(name, _)| {
            INFO_WORDS
                .iter()
                .any(|word| name.trim().eq_ignore_ascii_case(word))
        })
    })
}

/// Remove the pseudo proxies a provider uses to show usage and expiry and
/// build the panel line from their names. `Direct` placeholders are dropped.
fn extract_panel(proxies: &mut IniEntries) -> String {
    let mut panel = String::from(PANEL_PREFIX);

    for key in proxies.keys() {
        let value = proxies.get(&key).unwrap_or_default();
        if is_subscription_info(&key, value) {
            panel.push_str(&key);
            panel.push_str("\\n");
            proxies.remove(&key);
        } else if contains_ignore_case(&key, "Direct") {
            proxies.remove(&key);
        }
    }

    panel.push_str(PANEL_SUFFIX);
    panel
}

fn proxy_group_section(proxy_names: &[String]) -> String {
    let list = proxy_names.join(",");
    let mut groups = IniEntries::new();
    groups.insert("PROXY", &format!("select, AUTO, {}", list));
    groups.insert("AUTO", &format!("url-test, {}", list));
    groups.insert("UNMATCHED", "select, PROXY, DIRECT");
    serialize_entries(&groups)
}
