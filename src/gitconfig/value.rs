//! Value quoting rules of the git config format

/// Decode the text to the right of `=` into the value git would see.
///
/// Strips comments outside quotes, removes double quotes and decodes escapes.
/// Leading and trailing unquoted whitespace is dropped; inside the value each
/// unquoted whitespace character becomes one space.
pub fn parse_value(raw: &str) -> Result<String, String> {
    let mut out = String::new();
    let mut in_quotes = false;
    let mut pending_spaces = 0usize;
    let mut chars = raw.trim_start().chars();

    while let Some(c) = chars.next() {
        if !in_quotes && (c == ' ' || c == '\t') {
            pending_spaces += 1;
            continue;
        }
        if !in_quotes && (c == '#' || c == ';') {
            break;
        }
        if pending_spaces > 0 {
            if !out.is_empty() {
                out.extend(std::iter::repeat(' ').take(pending_spaces));
            }
            pending_spaces = 0;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('b') => out.push('\u{8}'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => return Err(format!("invalid escape sequence '\\{}'", other)),
                None => return Err("dangling backslash".to_string()),
            },
            _ => out.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    Ok(out)
}

/// Encode a value so that `parse_value` returns it unchanged
pub fn format_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            _ => escaped.push(c),
        }
    }

    if needs_quotes(value) {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

fn needs_quotes(value: &str) -> bool {
    value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.contains(['#', ';', '"', '\\', '\n', '\t'])
}
