use regex::Regex;
use std::sync::LazyLock;

use crate::constants::DEFAULT_SHARE_EXPIRY_DAYS;

static SHARE_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]+-[a-z]+-[a-z]+$").expect("Invalid share token regex")
});

/// Checks a share token: three runs of lowercase ASCII letters joined by single hyphens.
///
/// `"swift-golden-dragon"` is valid; `"Swift-golden-dragon"`, `"swift-golden"`
/// and `"swift--golden-dragon"` are not.
pub fn is_valid_share_token(token: &str) -> bool {
    SHARE_TOKEN_REGEX.is_match(token)
}

/// Public link for a share token.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/share/{}", base_url.trim_end_matches('/'), token)
}

/// Pulls a valid share token out of a bare token or a pasted share link.
pub fn extract_share_token(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let without_query = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let candidate = without_query
        .rsplit('/')
        .find(|segment| !segment.is_empty())?;

    is_valid_share_token(candidate).then(|| candidate.to_string())
}

/// User-facing copy about link lifetime. The actual expiry always comes from the server.
pub fn share_expiry_hint() -> String {
    format!("Shared links expire after {} days", DEFAULT_SHARE_EXPIRY_DAYS)
}
