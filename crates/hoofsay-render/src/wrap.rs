//! Column-aware message wrapping.
//!
//! Folds a message into lines of a target column width. Widths are measured
//! in terminal columns (escape sequences are copied verbatim at zero width,
//! combining marks are free, wide glyphs cost two). Soft hyphens (U+00AD)
//! mark preferred break points inside words; non-breaking spaces (U+00A0)
//! glue words together. A wrap failure never takes the render down: the
//! original message is emitted unwrapped and the error goes to the log.

use std::collections::VecDeque;

use anyhow::{Context, Result, ensure};

use crate::width::{self, ESC};

/// Invisible preferred-break marker inside a word.
pub const SOFT_HYPHEN: char = '\u{ad}';
/// Space that never breaks.
pub const NO_BREAK_SPACE: char = '\u{a0}';

/// Columns a line may overflow the target before a wrap is forced.
pub const DEFAULT_SLACK: usize = 5;
/// Columns that must accumulate before any wrap is taken.
pub const DEFAULT_FLOOR: usize = 8;

/// Wrapping parameters.
#[derive(Debug, Clone)]
pub struct WrapOptions {
    /// Target column budget per line.
    pub width: usize,
    /// Refuse-to-wrap-too-early / force-wrap-if-too-late slack.
    pub slack: usize,
    /// Hard floor below which no wrap is ever taken.
    pub floor: usize,
    /// Glyph emitted in place of a soft hyphen taken as a break point.
    /// May carry its own escape sequences; they cost no columns.
    pub hyphen: String,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            width: 40,
            slack: DEFAULT_SLACK,
            floor: DEFAULT_FLOOR,
            hyphen: "-".to_string(),
        }
    }
}

/// One word of the message: raw characters (escapes included, soft hyphens
/// removed), visible width, and the recorded break opportunities.
#[derive(Debug, Clone, Default)]
struct Word {
    chars: Vec<char>,
    width: usize,
    breaks: Vec<BreakPoint>,
}

/// A soft-hyphen position: char index into the word and columns before it.
#[derive(Debug, Clone, Copy)]
struct BreakPoint {
    at: usize,
    cols: usize,
}

/// Wraps `message` to the configured column budget.
///
/// Falls back to the unwrapped message (soft hyphens stripped) if the
/// algorithm trips an internal invariant; the failure is reported through
/// the log rather than propagated.
pub fn wrap(message: &str, opts: &WrapOptions) -> String {
    match try_wrap(message, opts) {
        Ok(wrapped) => wrapped,
        Err(err) => {
            tracing::warn!("message wrap failed ({err:#}); emitting message unwrapped");
            strip_markers(message)
        }
    }
}

/// Removes soft-hyphen markers without wrapping.
pub fn strip_markers(message: &str) -> String {
    message.chars().filter(|&c| c != SOFT_HYPHEN).collect()
}

fn try_wrap(message: &str, opts: &WrapOptions) -> Result<String> {
    let mut out = Vec::new();
    for line in message.split('\n') {
        wrap_line(line, opts, &mut out)?;
    }
    Ok(out.join("\n"))
}

fn wrap_line(line: &str, opts: &WrapOptions, out: &mut Vec<String>) -> Result<()> {
    let (indent, words) = tokenize(line);
    if words.is_empty() {
        // Nothing breakable; keep the line as it came in.
        out.push(strip_markers(line));
        return Ok(());
    }

    // The budget never drops below the floor, and continuation lines keep
    // the source line's indentation, so deep indents widen the budget too.
    let budget = opts.width.max(indent + opts.floor);
    let hard = budget + opts.slack;
    let hyphen_width = width::visible_width(&opts.hyphen);
    let indent_prefix = " ".repeat(indent);

    let mut cur = indent_prefix.clone();
    let mut cur_cols = indent;
    let mut cur_empty = true;

    let mut pending: VecDeque<(usize, Word)> = words.into();
    let mut steps = 0usize;
    let step_limit = line.chars().count().saturating_mul(4) + 64;

    while let Some((spaces, word)) = pending.pop_front() {
        steps += 1;
        ensure!(steps <= step_limit, "wrap did not converge on line {line:?}");

        let sep = if cur_empty { 0 } else { spaces.max(1) };
        if cur_cols + sep + word.width <= budget {
            cur.push_str(&" ".repeat(sep));
            cur.extend(word.chars.iter());
            cur_cols += sep + word.width;
            cur_empty = false;
            continue;
        }

        if !cur_empty {
            // Prefer a soft hyphen reaching into the slack zone over an
            // early boundary wrap.
            let remaining = hard.saturating_sub(cur_cols + sep);
            if let Some((head, tail)) = split_soft(&word, remaining, hyphen_width, &opts.hyphen)? {
                cur.push_str(&" ".repeat(sep));
                cur.push_str(&head);
                out.push(std::mem::replace(&mut cur, indent_prefix.clone()));
                cur_cols = indent;
                cur_empty = true;
                pending.push_front((0, tail));
                continue;
            }
            out.push(std::mem::replace(&mut cur, indent_prefix.clone()));
            cur_cols = indent;
            cur_empty = true;
            pending.push_front((0, word));
            continue;
        }

        // Fresh line and the word still does not fit the budget.
        if cur_cols + word.width <= hard {
            // Tolerate overflow into the slack rather than splitting.
            cur.extend(word.chars.iter());
            cur_cols += word.width;
            cur_empty = false;
            continue;
        }

        // Too late to tolerate: break the word, soft hyphen first.
        let remaining = hard.saturating_sub(cur_cols);
        let tail = if let Some((head, tail)) = split_soft(&word, remaining, hyphen_width, &opts.hyphen)? {
            cur.push_str(&head);
            tail
        } else {
            let (head, tail) = split_hard(&word, remaining.max(1))?;
            cur.extend(head.chars.iter());
            tail
        };
        out.push(std::mem::replace(&mut cur, indent_prefix.clone()));
        cur_cols = indent;
        cur_empty = true;
        if !tail.chars.is_empty() {
            pending.push_front((0, tail));
        }
    }

    if !cur_empty {
        out.push(cur);
    }
    Ok(())
}

/// Splits a line into its indentation column and its words.
///
/// A word is a maximal run of non-space characters; escape sequences glue to
/// the word they precede or interrupt, at zero width. Each word carries the
/// count of plain spaces that preceded it.
fn tokenize(line: &str) -> (usize, Vec<(usize, Word)>) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut indent = 0;
    while i < chars.len() && chars[i] == ' ' {
        indent += 1;
        i += 1;
    }

    let mut words = Vec::new();
    let mut spaces = 0usize;
    while i < chars.len() {
        if chars[i] == ' ' {
            spaces += 1;
            i += 1;
            continue;
        }
        let mut word = Word::default();
        while i < chars.len() && chars[i] != ' ' {
            if chars[i] == ESC {
                let n = width::escape_len(&chars, i).max(1);
                let end = (i + n).min(chars.len());
                word.chars.extend_from_slice(&chars[i..end]);
                i = end;
            } else if chars[i] == SOFT_HYPHEN {
                if !word.chars.is_empty() {
                    word.breaks.push(BreakPoint {
                        at: word.chars.len(),
                        cols: word.width,
                    });
                }
                i += 1;
            } else {
                word.width += width::char_width(chars[i]);
                word.chars.push(chars[i]);
                i += 1;
            }
        }
        words.push((spaces, word));
        spaces = 0;
    }
    (indent, words)
}

/// Splits `word` at the last soft hyphen whose prefix plus the hyphen glyph
/// fits in `remaining` columns. Returns the head (hyphen glyph appended) and
/// the tail word, or `None` when no usable break point exists.
fn split_soft(
    word: &Word,
    remaining: usize,
    hyphen_width: usize,
    hyphen: &str,
) -> Result<Option<(String, Word)>> {
    let Some(bp) = word
        .breaks
        .iter()
        .rev()
        .find(|b| b.cols > 0 && b.at < word.chars.len() && b.cols + hyphen_width <= remaining)
    else {
        return Ok(None);
    };

    let mut head: String = word.chars[..bp.at].iter().collect();
    head.push_str(hyphen);

    let tail_width = word
        .width
        .checked_sub(bp.cols)
        .context("soft split width underflow")?;
    let tail = Word {
        chars: word.chars[bp.at..].to_vec(),
        width: tail_width,
        breaks: word
            .breaks
            .iter()
            .filter(|b| b.at > bp.at)
            .map(|b| BreakPoint {
                at: b.at - bp.at,
                cols: b.cols - bp.cols,
            })
            .collect(),
    };
    Ok(Some((head, tail)))
}

/// Splits `word` after as many characters as fit in `limit` columns,
/// taking at least one visible character so the caller always progresses.
fn split_hard(word: &Word, limit: usize) -> Result<(Word, Word)> {
    let mut i = 0;
    let mut cols = 0;
    let mut taken = 0usize;
    while i < word.chars.len() {
        if word.chars[i] == ESC {
            i += width::escape_len(&word.chars, i).max(1);
            i = i.min(word.chars.len());
            continue;
        }
        let w = width::char_width(word.chars[i]);
        if taken > 0 && cols + w > limit {
            break;
        }
        cols += w;
        taken += 1;
        i += 1;
    }
    ensure!(taken > 0, "hard split made no progress");

    let tail_width = word
        .width
        .checked_sub(cols)
        .context("hard split width underflow")?;
    let head = Word {
        chars: word.chars[..i].to_vec(),
        width: cols,
        breaks: Vec::new(),
    };
    let tail = Word {
        chars: word.chars[i..].to_vec(),
        width: tail_width,
        breaks: word
            .breaks
            .iter()
            .filter(|b| b.at >= i)
            .map(|b| BreakPoint {
                at: b.at - i,
                cols: b.cols.saturating_sub(cols),
            })
            .collect(),
    };
    Ok((head, tail))
}
