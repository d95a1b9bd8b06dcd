//! Small text helpers shared across the workspace.

/// Truncate `s` to at most `max_chars` characters, appending `marker` when
/// anything was cut. Counts characters, not bytes, so multi-byte text never
/// splits a UTF-8 boundary. Returns `s` unchanged when it fits.
pub fn truncate_chars(s: &str, max_chars: usize, marker: &str) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str(marker);
    out
}
