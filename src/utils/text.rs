use std::borrow::Cow;

/// Cut `s` to at most `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Keep the first `max_chars` characters of `s` verbatim and append `marker`
/// when anything was cut. Input within budget is borrowed unchanged.
#[must_use]
pub fn truncate_with_marker<'a>(s: &'a str, max_chars: usize, marker: &str) -> Cow<'a, str> {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Owned(format!("{}{marker}", &s[..idx])),
        None => Cow::Borrowed(s),
    }
}
