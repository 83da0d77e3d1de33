//! String utility functions for text processing

/// Check if a string contains a substring, ignoring ASCII case
///
/// # Arguments
///
/// * `s` - The string to search in
/// * `search` - The substring to find
///
/// # Returns
///
/// True if `search` occurs anywhere in `s`, false otherwise
pub fn contains_ignore_case(s: &str, search: &str) -> bool {
    s.to_ascii_lowercase()
        .contains(&search.to_ascii_lowercase())
}
