//! Resource name to filename mapping.
//!
//! Generated modules are named after their resource, so the name has to be
//! turned into something every filesystem accepts. The mapping is lossy:
//! two names can end up with the same filename, which the registry rejects.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum filename length accepted by common filesystems.
pub const MAX_FILENAME_LEN: usize = 255;

static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

fn invalid_chars() -> &'static Regex {
    INVALID_CHARS.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("invalid character class is a valid regex")
    })
}

/// Map a resource name to a filesystem-safe file stem.
///
/// Strips control characters and `< > : " / \ | ? *`, replaces the first
/// space with `_`, trims surrounding whitespace and truncates the result
/// to [`MAX_FILENAME_LEN`] characters. Never fails.
pub fn sanitize(name: &str) -> String {
    let stripped = invalid_chars().replace_all(name, "");
    let replaced = stripped.replacen(' ', "_", 1);
    let trimmed = replaced.trim();

    match trimmed.char_indices().nth(MAX_FILENAME_LEN) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}
