//! Normalization applied to tool inputs before anything is persisted

use regex::Regex;
use std::sync::LazyLock;

pub const EMAIL_MAX_CHARS: usize = 200;
pub const NAME_MAX_CHARS: usize = 200;
pub const MESSAGE_MAX_CHARS: usize = 800;
pub const QUESTION_MAX_CHARS: usize = 1000;

/// Appended when a field is cut short
pub const ELLIPSIS: char = '…';

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex"));

/// Trim, collapse CR/LF to spaces, and cap at `max_chars` characters.
///
/// A value longer than the cap keeps `max_chars - 1` characters followed by
/// [`ELLIPSIS`], so the result is exactly `max_chars` long.
pub fn clean(value: &str, max_chars: usize) -> String {
    let single_line: String = value
        .trim()
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();

    if single_line.chars().count() <= max_chars {
        return single_line;
    }

    let mut truncated: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// `local@domain.tld` shape with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
