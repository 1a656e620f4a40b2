//! Line-preserving git config document

use std::path::Path;

use crate::error::{GitCtxError, Result};
use crate::fsio;

use super::value::{format_value, parse_value};

/// `[name]` or `[name "subsection"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Lowercased section name
    pub name: String,
    /// Subsection, case preserved
    pub subsection: Option<String>,
}

impl SectionHeader {
    fn is(&self, name: &str) -> bool {
        self.subsection.is_none() && self.name.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Header {
        header: SectionHeader,
        /// `[user] name = x` style entry on the header line
        inline: Option<(String, String)>,
    },
    Entry {
        key: String,
        value: String,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    /// Original text including line terminator(s)
    raw: String,
    kind: LineKind,
}

/// A parsed git config file.
///
/// Lines keep their original text, so rendering a document that was only
/// partially edited reproduces every untouched line exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitConfigDocument {
    lines: Vec<Line>,
}

impl GitConfigDocument {
    /// Parse git config text
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = Vec::new();
        let mut physical = text.split_inclusive('\n').enumerate();
        let mut in_section = false;

        while let Some((idx, first)) = physical.next() {
            let line_no = idx + 1;
            let trimmed = first.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                lines.push(Line {
                    raw: first.to_string(),
                    kind: LineKind::Other,
                });
                continue;
            }

            // Join backslash-continued entry lines into one logical line
            let mut raw = first.to_string();
            let mut logical = strip_eol(first).to_string();
            let is_header = trimmed.starts_with('[');
            while !is_header && ends_with_continuation(&logical) {
                logical.pop();
                match physical.next() {
                    Some((_, next)) => {
                        raw.push_str(next);
                        logical.push_str(strip_eol(next));
                    }
                    None => break,
                }
            }

            let kind = if logical.trim_start().starts_with('[') {
                let (header, rest) = parse_header(logical.trim_start())
                    .map_err(|e| syntax_error(line_no, &e))?;
                let inline = match rest.trim_start() {
                    r if r.is_empty() || r.starts_with('#') || r.starts_with(';') => None,
                    r => Some(parse_entry(r).map_err(|e| syntax_error(line_no, &e))?),
                };
                in_section = true;
                LineKind::Header { header, inline }
            } else {
                if !in_section {
                    return Err(syntax_error(line_no, "variable outside of any section"));
                }
                let (key, value) =
                    parse_entry(logical.trim_start()).map_err(|e| syntax_error(line_no, &e))?;
                LineKind::Entry { key, value }
            };

            lines.push(Line { raw, kind });
        }

        Ok(Self { lines })
    }

    /// Load a file, treating a missing file as an empty document
    pub fn load(path: &Path) -> Result<Self> {
        let text = fsio::read_or_empty(path)?;
        Self::parse(&text).map_err(|e| match e {
            GitCtxError::GitConfig(msg) => {
                GitCtxError::GitConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Write the rendered document to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        fsio::write_atomic(path, &self.render(), 0o644)
    }

    /// Render back to text
    pub fn render(&self) -> String {
        self.lines.iter().map(|l| l.raw.as_str()).collect()
    }

    /// True if at least one `[name]` header exists
    pub fn has_section(&self, name: &str) -> bool {
        self.lines.iter().any(|line| match &line.kind {
            LineKind::Header { header, .. } => header.is(name),
            _ => false,
        })
    }

    /// All `(key, value)` pairs of every `[name]` section, in file order.
    /// Keys are lowercased.
    pub fn entries(&self, name: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut active = false;
        for line in &self.lines {
            match &line.kind {
                LineKind::Header { header, inline } => {
                    active = header.is(name);
                    if let (true, Some((k, v))) = (active, inline) {
                        out.push((k.clone(), v.clone()));
                    }
                }
                LineKind::Entry { key, value } if active => {
                    out.push((key.clone(), value.clone()));
                }
                _ => {}
            }
        }
        out
    }

    /// Every value of `name.key`, in file order
    pub fn get_all(&self, name: &str, key: &str) -> Vec<String> {
        self.entries(name)
            .into_iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
            .collect()
    }

    /// Remove every `[name]` section with all of its lines.
    /// Returns true if anything was removed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.lines.len();
        let mut dropping = false;
        self.lines.retain(|line| {
            if let LineKind::Header { header, .. } = &line.kind {
                dropping = header.is(name);
            }
            !dropping
        });
        self.lines.len() != before
    }

    /// Append `key = value` to the last `[name]` section, creating it if needed
    pub fn add_value(&mut self, name: &str, key: &str, value: &str) {
        let entry = Line {
            raw: format!("\t{} = {}\n", key, format_value(value)),
            kind: LineKind::Entry {
                key: key.to_ascii_lowercase(),
                value: value.to_string(),
            },
        };

        let header_idx = self.lines.iter().rposition(|line| match &line.kind {
            LineKind::Header { header, .. } => header.is(name),
            _ => false,
        });

        let pos = match header_idx {
            Some(idx) => {
                let mut pos = idx + 1;
                for (i, line) in self.lines.iter().enumerate().skip(idx + 1) {
                    match line.kind {
                        LineKind::Header { .. } => break,
                        LineKind::Entry { .. } => pos = i + 1,
                        LineKind::Other => {}
                    }
                }
                pos
            }
            None => {
                self.terminate_last_line();
                self.lines.push(Line {
                    raw: format!("[{}]\n", name),
                    kind: LineKind::Header {
                        header: SectionHeader {
                            name: name.to_ascii_lowercase(),
                            subsection: None,
                        },
                        inline: None,
                    },
                });
                self.lines.len()
            }
        };

        if pos == self.lines.len() {
            self.terminate_last_line();
        }
        self.lines.insert(pos, entry);
    }

    /// True if the document has no lines at all
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn terminate_last_line(&mut self) {
        if let Some(last) = self.lines.last_mut() {
            if !last.raw.ends_with('\n') {
                last.raw.push('\n');
            }
        }
    }
}

fn syntax_error(line_no: usize, msg: &str) -> GitCtxError {
    GitCtxError::GitConfig(format!("line {}: {}", line_no, msg))
}

fn strip_eol(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// True if the line ends in a backslash that is outside any comment and not
/// itself escaped. Quote state carries over from earlier joined segments.
fn ends_with_continuation(line: &str) -> bool {
    let mut in_quotes = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return true;
                }
            }
            '"' => in_quotes = !in_quotes,
            '#' | ';' if !in_quotes => return false,
            _ => {}
        }
    }
    false
}

/// Parse `[name]`, `[name "sub"]` or `[name.sub]`; returns the rest of the line
fn parse_header(text: &str) -> std::result::Result<(SectionHeader, &str), String> {
    let body = &text[1..];
    let mut name = String::new();
    let mut subsection = None;
    let mut chars = body.char_indices();

    loop {
        match chars.next() {
            Some((idx, ']')) => {
                let (name, subsection) = match subsection {
                    Some(sub) => (name, Some(sub)),
                    None => split_legacy_subsection(&name),
                };
                validate_name(&name)?;
                return Ok((
                    SectionHeader {
                        name: name.to_ascii_lowercase(),
                        subsection,
                    },
                    &body[idx + 1..],
                ));
            }
            Some((_, c)) if c.is_whitespace() && subsection.is_none() => {
                let quoted = parse_quoted_subsection(&mut chars)?;
                subsection = Some(quoted);
            }
            Some((_, c)) if subsection.is_none() => name.push(c),
            Some((_, c)) => return Err(format!("unexpected '{}' after subsection", c)),
            None => return Err("unterminated section header".to_string()),
        }
    }
}

fn parse_quoted_subsection(chars: &mut std::str::CharIndices<'_>) -> std::result::Result<String, String> {
    let mut sub = String::new();
    // skip whitespace up to the opening quote
    loop {
        match chars.next() {
            Some((_, '"')) => break,
            Some((_, c)) if c.is_whitespace() => continue,
            _ => return Err("expected quoted subsection".to_string()),
        }
    }
    loop {
        match chars.next() {
            Some((_, '"')) => return Ok(sub),
            Some((_, '\\')) => match chars.next() {
                Some((_, c)) => sub.push(c),
                None => return Err("unterminated subsection".to_string()),
            },
            Some((_, c)) => sub.push(c),
            None => return Err("unterminated subsection".to_string()),
        }
    }
}

fn split_legacy_subsection(name: &str) -> (String, Option<String>) {
    match name.split_once('.') {
        Some((section, sub)) => (section.to_string(), Some(sub.to_ascii_lowercase())),
        None => (name.to_string(), None),
    }
}

fn validate_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        return Err(format!("invalid section name '{}'", name));
    }
    Ok(())
}

/// Parse `key = value` or a bare `key` (boolean true)
fn parse_entry(text: &str) -> std::result::Result<(String, String), String> {
    let key_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(text.len());
    let key = &text[..key_len];
    if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(format!("invalid variable name in '{}'", text.trim_end()));
    }

    let rest = text[key_len..].trim_start();
    let value = if let Some(raw) = rest.strip_prefix('=') {
        parse_value(raw)?
    } else if rest.is_empty() || rest.starts_with('#') || rest.starts_with(';') {
        "true".to_string()
    } else {
        return Err(format!("invalid variable name in '{}'", text.trim_end()));
    };

    Ok((key.to_ascii_lowercase(), value))
}
