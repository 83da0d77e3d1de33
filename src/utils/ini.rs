//! Lenient INI codec for Surge style documents
//!
//! Documents are split into ordered sections whose bodies are kept as raw
//! text, and a section body can further be split into ordered `key=value`
//! entries. Malformed input never fails, it only yields fewer sections or keys.

use linked_hash_map::LinkedHashMap;

/// Ordered mapping from section name to raw section body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSections {
    sections: LinkedHashMap<String, String>,
}

impl IniSections {
    /// Create an empty section map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw body of a section
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// Check if a section exists
    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Set the body of a section.
    ///
    /// An existing section keeps its position, a new one is appended.
    pub fn set(&mut self, name: &str, body: String) {
        match self.sections.get_mut(name) {
            Some(existing) => *existing = body,
            None => {
                self.sections.insert(name.to_string(), body);
            }
        }
    }

    /// Keep only the sections whose name is in `allowed`, preserving order
    pub fn retain_names(&mut self, allowed: &[&str]) {
        let mut kept = LinkedHashMap::new();
        for (name, body) in self.sections.iter() {
            if allowed.contains(&name.as_str()) {
                kept.insert(name.clone(), body.clone());
            }
        }
        self.sections = kept;
    }

    /// Section names in document order
    pub fn names(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .iter()
            .map(|(name, body)| (name.as_str(), body.as_str()))
    }
}

/// Ordered `key=value` entries of a single section body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniEntries {
    entries: LinkedHashMap<String, String>,
}

impl IniEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert an entry, overwriting the value of an existing key in place
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.get_mut(key) {
            Some(existing) => *existing = value.to_string(),
            None => {
                self.entries.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Keep only the entries accepted by `keep`, preserving order
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut kept = LinkedHashMap::new();
        for (key, value) in self.entries.iter() {
            if keep(key, value) {
                kept.insert(key.clone(), value.clone());
            }
        }
        self.entries = kept;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#') || line.starts_with("//")
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}

/// Split a document into its sections.
///
/// Lines before the first header are discarded. A repeated header resets the
/// body of the section it names.
pub fn parse_sections(content: &str) -> IniSections {
    let mut sections = IniSections::new();
    let mut current: Option<String> = None;
    let mut body = String::new();

    for line in content.lines() {
        if is_comment(line) {
            continue;
        }
        let line = line.trim();
        if let Some(name) = section_header(line) {
            if let Some(prev) = current.take() {
                sections.set(&prev, std::mem::take(&mut body));
            }
            sections.set(name, String::new());
            current = Some(name.to_string());
        } else if current.is_some() {
            body.push_str(line);
            body.push('\n');
        }
    }
    if let Some(prev) = current {
        sections.set(&prev, body);
    }

    sections
}

/// Render sections back into a document
pub fn serialize_sections(sections: &IniSections) -> String {
    let mut output = String::new();
    for (name, body) in sections.iter() {
        output.push('[');
        output.push_str(name);
        output.push_str("]\n");
        output.push_str(body);
        if !body.is_empty() && !body.ends_with('\n') {
            output.push('\n');
        }
    }
    output
}

/// Split a section body into `key=value` entries.
///
/// The split happens on the first `=` only, so values may contain `=`.
/// A line without `=` becomes a key with an empty value.
pub fn parse_entries(body: &str) -> IniEntries {
    let mut entries = IniEntries::new();
    for line in body.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => entries.insert(key.trim(), value.trim()),
            None => entries.insert(line.trim(), ""),
        }
    }
    entries
}

/// Render entries back into a section body
pub fn serialize_entries(entries: &IniEntries) -> String {
    let mut output = String::new();
    for (key, value) in entries.iter() {
        output.push_str(key);
        output.push('=');
        output.push_str(value);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_order_and_bodies() {
        let content = "[General]\n  loglevel = notify \n[Proxy]\nA = ss, a.com\nB = ss, b.com\n";
        let sections = parse_sections(content);
        assert_eq!(sections.names(), vec!["General", "Proxy"]);
        assert_eq!(sections.get("General"), Some("loglevel = notify\n"));
        assert_eq!(sections.get("Proxy"), Some("A = ss, a.com\nB = ss, b.com\n"));
    }

    #[test]
    fn test_parse_sections_skips_comments_and_preamble() {
        let content = "#!MANAGED-CONFIG http://x\nstray=1\n[Proxy]\n# note\n  // other\nA = ss\n";
        let sections = parse_sections(content);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("Proxy"), Some("A = ss\n"));
    }

    #[test]
    fn test_parse_sections_duplicate_header_resets_body() {
        let content = "[A]\nx=1\n[B]\ny=2\n[A]\nz=3\n";
        let sections = parse_sections(content);
        assert_eq!(sections.names(), vec!["A", "B"]);
        assert_eq!(sections.get("A"), Some("z=3\n"));
    }

    #[test]
    fn test_parse_sections_lenient() {
        assert!(parse_sections("").is_empty());
        let sections = parse_sections("[Proxy\nA=1\n[Host]\n[bad\n");
        assert_eq!(sections.names(), vec!["Host"]);
        assert_eq!(sections.get("Host"), Some("[bad\n"));
    }

    #[test]
    fn test_sections_round_trip() {
        let mut sections = IniSections::new();
        sections.set("General", "dns-server=1.1.1.1\n".to_string());
        sections.set("Proxy", "A=ss, a.com\n\nB=ss, b.com\n".to_string());
        sections.set("Host", String::new());

        let first = serialize_sections(&sections);
        let second = serialize_sections(&parse_sections(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_serialize_sections_terminates_unterminated_body() {
        let mut sections = IniSections::new();
        sections.set("Panel", "SubscribeInfo=x".to_string());
        sections.set("Proxy Group", "A=b\n".to_string());
        assert_eq!(
            serialize_sections(&sections),
            "[Panel]\nSubscribeInfo=x\n[Proxy Group]\nA=b\n"
        );
    }

    #[test]
    fn test_set_keeps_position() {
        let mut sections = parse_sections("[General]\na=1\n[Proxy]\nb=2\n");
        sections.set("General", "c=3\n".to_string());
        sections.set("Panel", "p".to_string());
        assert_eq!(sections.names(), vec!["General", "Proxy", "Panel"]);
        assert_eq!(sections.get("General"), Some("c=3\n"));
    }

    #[test]
    fn test_retain_names() {
        let mut sections = parse_sections("[Rule]\nx\n[Proxy]\na=1\n[MITM]\ny\n[General]\nb=2\n");
        sections.retain_names(&["General", "Proxy"]);
        assert_eq!(sections.names(), vec!["Proxy", "General"]);
    }

    #[test]
    fn test_parse_entries() {
        let entries = parse_entries("a = 1\nb=x=y\n\nlonely\n a = 2 \n");
        assert_eq!(entries.keys(), vec!["a", "b", "lonely"]);
        assert_eq!(entries.get("a"), Some("2"));
        assert_eq!(entries.get("b"), Some("x=y"));
        assert_eq!(entries.get("lonely"), Some(""));
    }

    #[test]
    fn test_serialize_entries() {
        let entries = parse_entries("dns-server = 1.1.1.1\nipv6=false\n");
        assert_eq!(serialize_entries(&entries), "dns-server=1.1.1.1\nipv6=false\n");
        assert_eq!(serialize_entries(&IniEntries::new()), "");
    }

    #[test]
    fn test_entries_retain() {
        let mut entries = parse_entries("A=1\nB=\nC=3\n");
        entries.retain(|_, value| !value.is_empty());
        assert_eq!(entries.keys(), vec!["A", "C"]);
    }
}
