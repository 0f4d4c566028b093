//! Credential precondition for talking to the provider

const ACCEPTED_PREFIXES: [&str; 2] = ["sk-", "sk-proj-"];
const MIN_KEY_CHARS: usize = 40;

/// True when `api_key` looks like a usable provider key: non-blank after
/// trimming, an accepted prefix, and longer than 40 characters.
pub fn provider_ready(api_key: Option<&str>) -> bool {
    let key = api_key.unwrap_or_default().trim();
    !key.is_empty()
        && ACCEPTED_PREFIXES.iter().any(|p| key.starts_with(p))
        && key.chars().count() > MIN_KEY_CHARS
}
