//! Small text helpers shared by config, auth and the CLI.

/// Trim user- or file-supplied text; blank input counts as absent.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Graph endpoints must be absolute `http(s)` URLs.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
