//! Template metadata headers.
//!
//! A template may begin with a metadata fence: a line of three markers
//! (`$$$`), a block of `KEY: value` lines (uppercase keys), and a closing
//! fence. The header is stripped before expansion; what happens to its
//! content depends on the requested info level.

/// The metadata fence line.
pub const FENCE: &str = "$$$";

/// Parsed metadata block: the raw lines between the fences.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    lines: Vec<String>,
}

impl Metadata {
    /// Raw header lines in file order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `KEY: value` pairs, skipping freeform lines.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| {
            let (key, value) = line.split_once(": ")?;
            is_key(key).then_some((key, value))
        })
    }

    /// Value for one key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Formats the block for display in place of the message.
    pub fn format_full(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
        }
        out
    }
}

/// Splits an optional leading metadata header from the template body.
///
/// A malformed header (no closing fence) is not an error: the whole input is
/// treated as body, fail-soft.
pub fn split(template: &str) -> (Option<Metadata>, &str) {
    let Some(after) = template.strip_prefix("$$$\n") else {
        return (None, template);
    };
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in after.split_inclusive('\n') {
        let trimmed = line.strip_suffix('\n').unwrap_or(line);
        if trimmed == FENCE {
            let body = &after[offset + line.len()..];
            return (Some(Metadata { lines }), body);
        }
        lines.push(trimmed.to_string());
        offset += line.len();
    }
    tracing::debug!("metadata fence never closed; treating header as body");
    (None, template)
}

fn is_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase() || c == ' ')
}
