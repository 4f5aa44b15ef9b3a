// ABOUTME: Source cleaner — normalizes line endings, joins continuations, strips comments

/// Normalizes line endings to `\n`, joins backslash-newline continuations,
/// strips full-line and trailing `#` comments, and drops blank lines.
///
/// The result is a sequence of non-empty logical lines joined by `\n`,
/// ready for the lexer.
pub fn clean(source: &str) -> String {
    let normalized = normalize_line_endings(source);
    let joined = join_continuations(&normalized);

    joined
        .split('\n')
        .filter_map(strip_comment)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line_endings(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

fn join_continuations(source: &str) -> String {
    source.replace("\\\n", "")
}

/// Strips a full-line or trailing `#` comment from a single logical line.
/// Returns `None` only when the whole line was a comment (still filtered
/// later by the blank-line check, `None` is just a shortcut).
fn strip_comment(line: &str) -> Option<&str> {
    if line.trim_start().starts_with('#') {
        return None;
    }

    let last_hash = line.rfind('#');
    let last_quote = line.rfind('"');

    match (last_hash, last_quote) {
        (Some(hash_idx), Some(quote_idx)) if hash_idx > quote_idx => Some(&line[..hash_idx]),
        (Some(hash_idx), None) => Some(&line[..hash_idx]),
        _ => Some(line),
    }
}
