//! Template expansion.
//!
//! Interprets the pony template's directive dialect and produces the final
//! byte stream: literal art is copied through the colour scope tracker,
//! `$name$` references splice variable values back into the unscanned input,
//! `$name=value$` assigns, `$$` emits a literal marker, and `$balloon...$`
//! materialises the wrapped, boxed message: first row in place, remaining
//! rows overlaid beside the following art lines.
//!
//! Expansion never mutates the template in place: the scanner pops from a
//! work queue and substitutions are pushed back onto its front, so spliced
//! text is itself re-scanned.

use std::collections::{HashMap, VecDeque};

use anyhow::Result;

use crate::balloon::{BalloonStyle, Justify};
use crate::error::UndefinedVariableError;
use crate::metadata;
use crate::scope::{self, ColourScopeStack, Feed};
use crate::width::{self, ESC};
use crate::wrap::{self, WrapOptions};

/// The reserved directive marker.
pub const MARKER: char = '$';
/// Escape lead inside a directive: a backtick takes the next character
/// literally, so names and values may contain the marker itself.
const NAME_ESCAPE: char = '`';
/// Directive keyword that inserts the balloon.
const BALLOON_KEYWORD: &str = "balloon";

/// Message shown at info level 2 when the template has no metadata header.
const NO_METADATA: &str = "(no metadata available)";

/// Columns of breathing room between the border and the message.
const BALLOON_MARGIN: usize = 1;

/// Metadata display behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InfoLevel {
    /// Strip the header silently.
    #[default]
    Hidden,
    /// Emit the header above the art as dimmed commentary.
    Inline,
    /// Replace the message with the formatted header.
    Full,
}

impl InfoLevel {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Hidden,
            1 => Self::Inline,
            _ => Self::Full,
        }
    }
}

/// Everything one render consumes besides the template itself.
///
/// Colour fields are raw SGR parameter strings (`"31"`, `"38;5;196"`); they
/// are applied inside their own colour scope and never leak into the art.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// The message to put in the balloon.
    pub message: String,
    /// Wrap column for the message; `None` disables wrapping.
    pub wrap: Option<usize>,
    /// Terminal width for the final truncation pass; `None` disables it.
    pub term_width: Option<usize>,
    /// Balloon style; `None` renders the pony alone (balloon directives and
    /// link glyphs expand to nothing).
    pub style: Option<BalloonStyle>,
    /// Metadata header behaviour.
    pub info: InfoLevel,
    /// Glyph emitted where a soft hyphen is taken as a break point.
    pub hyphen: String,
    pub hyphen_colour: Option<String>,
    pub link_colour: Option<String>,
    pub balloon_colour: Option<String>,
    pub message_colour: Option<String>,
    pub wrap_slack: usize,
    pub wrap_floor: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            message: String::new(),
            wrap: Some(40),
            term_width: None,
            style: None,
            info: InfoLevel::Hidden,
            hyphen: "-".to_string(),
            hyphen_colour: None,
            link_colour: None,
            balloon_colour: None,
            message_colour: None,
            wrap_slack: wrap::DEFAULT_SLACK,
            wrap_floor: wrap::DEFAULT_FLOOR,
        }
    }
}

/// Expands `template` into the final terminal stream.
///
/// The only fatal failure is a reference to an undefined variable; every
/// other anomaly degrades to best-effort output.
pub fn render(template: &str, opts: &RenderOptions) -> Result<String> {
    Expander::new(opts).run(template)
}

/// Scanner state for directive collection.
enum State {
    Literal,
    Name { buf: String, escaped: bool },
}

/// Balloon rows still waiting to be drawn beside subsequent art lines.
#[derive(Debug)]
struct Overlay {
    rows: VecDeque<String>,
    /// Column the rows align to.
    col: usize,
    /// Set once the directive's own line has ended; rows attach to the
    /// lines after it.
    armed: bool,
}

/// Parsed `balloon[WIDTHSPEC][,HEIGHT]` directive tail.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BalloonSpec {
    width: Option<usize>,
    height: Option<usize>,
    anchor: Option<Justify>,
    offset: usize,
}

impl BalloonSpec {
    /// Parses the directive tail. Malformed specs are not fatal; the parts
    /// that do not parse fall back to defaults.
    fn parse(spec: &str) -> Self {
        let mut out = Self::default();
        if spec.is_empty() {
            return out;
        }
        let (wpart, hpart) = match spec.split_once(',') {
            Some((w, h)) => (w, Some(h)),
            None => (spec, None),
        };
        if let Some(h) = hpart {
            match h.parse() {
                Ok(h) => out.height = Some(h),
                Err(_) => tracing::debug!("ignoring malformed balloon height {h:?}"),
            }
        }
        if wpart.is_empty() {
            return out;
        }
        if let Some(pos) = wpart.find(['l', 'c', 'r']) {
            out.anchor = match &wpart[pos..=pos] {
                "l" => Some(Justify::Left),
                "c" => Some(Justify::Centre),
                _ => Some(Justify::Right),
            };
            out.offset = wpart[..pos].parse().unwrap_or(0);
            let rest = &wpart[pos + 1..];
            if !rest.is_empty() {
                match rest.parse() {
                    Ok(w) => out.width = Some(w),
                    Err(_) => tracing::debug!("ignoring malformed balloon width {rest:?}"),
                }
            }
        } else {
            match wpart.parse() {
                Ok(w) => out.width = Some(w),
                Err(_) => tracing::debug!("ignoring malformed balloon width {wpart:?}"),
            }
        }
        out
    }
}

struct Expander<'a> {
    opts: &'a RenderOptions,
    vars: HashMap<String, String>,
    scopes: ColourScopeStack,
    queue: VecDeque<char>,
    out: String,
    /// Visible column on the output line being built.
    col: usize,
    overlay: Option<Overlay>,
    /// Message effective for this render (may be metadata at info level 2).
    message: String,
}

impl<'a> Expander<'a> {
    fn new(opts: &'a RenderOptions) -> Self {
        let mut vars = HashMap::new();
        let (link, mirror, cross) = match &opts.style {
            Some(style) => (
                style.link.clone(),
                style.linkmirror.clone(),
                style.linkcross.clone(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let colour = opts.link_colour.as_deref();
        vars.insert("\\".to_string(), guarded(&link, colour));
        vars.insert("/".to_string(), guarded(&mirror, colour));
        vars.insert("X".to_string(), guarded(&cross, colour));

        Self {
            opts,
            vars,
            scopes: ColourScopeStack::new(),
            queue: VecDeque::new(),
            out: String::new(),
            col: 0,
            overlay: None,
            message: opts.message.clone(),
        }
    }

    fn run(mut self, template: &str) -> Result<String> {
        let (meta, body) = metadata::split(template);
        match (self.opts.info, &meta) {
            (InfoLevel::Inline, Some(meta)) => {
                for line in meta.lines() {
                    self.out.push_str(&format!("\u{1b}[2m{line}\u{1b}[0m\n"));
                }
            }
            (InfoLevel::Full, Some(meta)) => self.message = meta.format_full(),
            (InfoLevel::Full, None) => self.message = NO_METADATA.to_string(),
            _ => {}
        }

        self.queue = body.chars().collect();
        let mut state = State::Literal;
        while let Some(c) = self.queue.pop_front() {
            match &mut state {
                State::Literal => {
                    if c == MARKER {
                        state = State::Name {
                            buf: String::new(),
                            escaped: false,
                        };
                    } else if c == '\n' {
                        self.end_line();
                    } else if c == ESC {
                        self.copy_escape(c);
                    } else {
                        self.emit_char(c);
                    }
                }
                State::Name { buf, escaped } => {
                    if *escaped {
                        buf.push(c);
                        *escaped = false;
                    } else if c == NAME_ESCAPE {
                        *escaped = true;
                    } else if c == MARKER {
                        let name = std::mem::take(buf);
                        state = State::Literal;
                        self.dispatch(&name)?;
                    } else {
                        buf.push(c);
                    }
                }
            }
        }
        if let State::Name { buf, .. } = state {
            // Unterminated directive at end of template: keep it visible.
            tracing::debug!("unterminated directive {buf:?}; emitting literally");
            self.emit_char(MARKER);
            for c in buf.chars() {
                self.emit_char(c);
            }
        }
        self.flush_overlay();

        let mut out = self.out;
        while out.ends_with('\n') {
            out.pop();
        }
        out.push('\n');
        if let Some(budget) = self.opts.term_width {
            out = truncate(&out, budget);
        }
        Ok(out)
    }

    /// Classifies and executes one completed directive.
    fn dispatch(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            // Two consecutive markers: one literal marker.
            self.emit_char(MARKER);
            return Ok(());
        }
        if let Some((var, value)) = name.split_once('=') {
            self.vars.insert(var.to_string(), value.to_string());
            return Ok(());
        }
        if let Some(spec) = name.strip_prefix(BALLOON_KEYWORD) {
            return self.dispatch_balloon(BalloonSpec::parse(spec));
        }
        match self.vars.get(name).cloned() {
            // A value of two bare markers denotes a literal marker; splicing
            // it back would expand forever.
            Some(v) if v == "$$" => self.emit_char(MARKER),
            Some(v) => {
                for c in v.chars().rev() {
                    self.queue.push_front(c);
                }
            }
            None => {
                return Err(anyhow::Error::new(UndefinedVariableError {
                    name: name.to_string(),
                }));
            }
        }
        Ok(())
    }

    /// Wraps, boxes and places the message balloon.
    fn dispatch_balloon(&mut self, spec: BalloonSpec) -> Result<()> {
        let Some(style) = self.opts.style.clone() else {
            return Ok(());
        };
        let indent = self.col;
        let (west, east) = style.border_cols();

        let wrap_target = spec
            .width
            .map(|w| w.saturating_sub(2 * BALLOON_MARGIN))
            .or_else(|| {
                self.opts
                    .wrap
                    .map(|w| w.saturating_sub(indent + west + east + 2 * BALLOON_MARGIN))
            });
        let hyphen = self.coloured_hyphen();
        let message = self.message.clone();
        let wrapped = match wrap_target {
            Some(target) => wrap::wrap(
                &message,
                &WrapOptions {
                    width: target,
                    slack: self.opts.wrap_slack,
                    floor: self.opts.wrap_floor,
                    hyphen,
                },
            ),
            None => wrap::strip_markers(&message),
        };
        let margin = " ".repeat(BALLOON_MARGIN);
        let lines: Vec<String> = wrapped
            .split('\n')
            .map(|l| format!("{margin}{}{margin}", self.coloured_message_line(l)))
            .collect();

        let rows = style.render(
            spec.width.unwrap_or(0),
            spec.height.unwrap_or(0),
            &lines,
            Justify::Left,
        );
        let box_width = rows.first().map_or(0, |r| width::visible_width(r));

        let mut start = match spec.anchor {
            None => indent,
            Some(Justify::Left) => spec.offset,
            Some(Justify::Right) => spec.offset.saturating_sub(box_width),
            Some(Justify::Centre) => spec.offset.saturating_sub(box_width / 2),
        };
        if let Some(boundary) = self.opts.wrap {
            if start + box_width > boundary {
                start = boundary.saturating_sub(box_width);
            }
        }
        let start = start.max(indent);

        while self.col < start {
            self.emit_char(' ');
        }
        if let Some(first) = rows.first() {
            self.emit_balloon_row(first);
        }
        if rows.len() > 1 {
            self.overlay = Some(Overlay {
                rows: rows[1..].iter().cloned().collect(),
                col: start,
                armed: false,
            });
        }
        Ok(())
    }

    /// Ends the current output line, drawing the next overlay row beside it
    /// when one is due.
    fn end_line(&mut self) {
        let due = match &mut self.overlay {
            Some(overlay) if !overlay.armed => {
                overlay.armed = true;
                None
            }
            Some(overlay) => overlay.rows.pop_front().map(|row| (row, overlay.col)),
            None => None,
        };
        if let Some((row, col)) = due {
            while self.col < col {
                self.emit_char(' ');
            }
            self.emit_balloon_row(&row);
            if matches!(&self.overlay, Some(o) if o.rows.is_empty()) {
                self.overlay = None;
            }
        }
        self.out.push('\n');
        self.col = 0;
    }

    /// Emits balloon rows left over after the template ran out of lines.
    fn flush_overlay(&mut self) {
        let Some(mut overlay) = self.overlay.take() else {
            return;
        };
        while let Some(row) = overlay.rows.pop_front() {
            if !self.out.is_empty() && !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            self.col = 0;
            while self.col < overlay.col {
                self.emit_char(' ');
            }
            self.emit_balloon_row(&row);
        }
    }

    /// One balloon row inside its own colour scope.
    fn emit_balloon_row(&mut self, row: &str) {
        let colour = self.opts.balloon_colour.clone();
        self.emit_text(scope::PUSH_SENTINEL);
        if let Some(c) = colour {
            self.emit_text(&format!("\u{1b}[{c}m"));
        }
        self.emit_text(row);
        self.emit_text(scope::POP_SENTINEL);
    }

    /// Emits a string that may contain escape sequences and sentinels.
    fn emit_text(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == ESC {
                let n = width::escape_len(&chars, i).max(1);
                let end = (i + n).min(chars.len());
                for &c in &chars[i..end] {
                    self.feed_raw(c);
                }
                i = end;
            } else {
                self.emit_char(chars[i]);
                i += 1;
            }
        }
    }

    /// Emits one visible character, keeping the column count current.
    fn emit_char(&mut self, c: char) {
        self.feed_raw(c);
        if !scope::is_sentinel_char(c) {
            self.col += width::char_width(c);
        }
    }

    /// Routes one character through the scope tracker into the output.
    fn feed_raw(&mut self, c: char) {
        match self.scopes.feed(c) {
            Feed::Pass => self.out.push(c),
            Feed::Splice { strip, emission } => {
                for _ in 0..strip {
                    self.out.pop();
                }
                self.out.push_str(&emission);
            }
        }
    }

    /// Copies a whole escape sequence from the queue, at zero columns.
    fn copy_escape(&mut self, first: char) {
        let mut seq = vec![first];
        match self.queue.front() {
            Some('[') => {
                while let Some(c) = self.queue.pop_front() {
                    seq.push(c);
                    if c != '[' && (c.is_ascii_alphabetic() || c == '~') {
                        break;
                    }
                }
            }
            Some(']') => {
                seq.extend(self.queue.pop_front());
                if self.queue.front() == Some(&'P') {
                    // Fixed palette-set form: P plus seven payload chars.
                    for _ in 0..8 {
                        match self.queue.pop_front() {
                            Some(c) => seq.push(c),
                            None => break,
                        }
                    }
                } else {
                    while let Some(c) = self.queue.pop_front() {
                        seq.push(c);
                        if c == '\\' {
                            break;
                        }
                    }
                }
            }
            Some(_) => seq.extend(self.queue.pop_front()),
            None => {}
        }
        for c in seq {
            self.feed_raw(c);
        }
    }

    /// The hyphen glyph with its colour applied, reset after.
    fn coloured_hyphen(&self) -> String {
        match &self.opts.hyphen_colour {
            Some(c) => format!("\u{1b}[{c}m{}\u{1b}[0m", self.opts.hyphen),
            None => self.opts.hyphen.clone(),
        }
    }

    /// A message line with the message colour applied and the balloon
    /// colour restored after it, so the east border keeps its own colour.
    fn coloured_message_line(&self, line: &str) -> String {
        let Some(mc) = &self.opts.message_colour else {
            return line.to_string();
        };
        let restore = match &self.opts.balloon_colour {
            Some(bc) => format!("\u{1b}[0;{bc}m"),
            None => "\u{1b}[0m".to_string(),
        };
        format!("\u{1b}[{mc}m{line}{restore}")
    }
}

/// Wraps nested content in a colour scope, with an optional colour.
fn guarded(text: &str, colour: Option<&str>) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut s = String::from(scope::PUSH_SENTINEL);
    if let Some(c) = colour {
        s.push_str(&format!("\u{1b}[{c}m"));
    }
    s.push_str(text);
    s.push_str(scope::POP_SENTINEL);
    s
}

/// Truncates every line to the terminal column budget. Escape sequences
/// pass through free until the budget is exhausted and are never split;
/// once the budget is spent the rest of the line is dropped whole.
fn truncate(text: &str, budget: usize) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        let mut kept = String::new();
        let mut cols = 0;
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == ESC {
                if cols >= budget {
                    break;
                }
                let n = width::escape_len(&chars, i).max(1);
                let end = (i + n).min(chars.len());
                kept.extend(&chars[i..end]);
                i = end;
            } else {
                let w = width::char_width(chars[i]);
                if cols + w > budget {
                    break;
                }
                kept.push(chars[i]);
                cols += w;
                i += 1;
            }
        }
        out.push(kept);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balloon::BalloonStyle;

    const ROUND: &str = "\\:╲\n/:╱\nX:╳\nww:│\nee:│\nnw:╭\nnnw:\nn:─\nnne:\nne:╮\nnee:│\ne:│\nsee:│\nse:╯\nsse:\ns:─\nssw:\nsw:╰\nsww:│\nw:│\nnww:│\n";

    /// Strips escape sequences so tests can compare visible glyphs.
    fn plain(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut out = String::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == ESC {
                i += width::escape_len(&chars, i).max(1);
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }
        out
    }

    fn with_style(message: &str) -> RenderOptions {
        RenderOptions {
            message: message.to_string(),
            style: Some(BalloonStyle::parse(ROUND).expect("style parses")),
            ..RenderOptions::default()
        }
    }

    #[test]
    fn directive_free_template_is_identity() {
        let template = "an ordinary pony\n  with two lines\n";
        let out = render(template, &RenderOptions::default()).unwrap();
        assert_eq!(out, template);
    }

    #[test]
    fn directive_free_template_with_escapes_is_identity() {
        let template = "\u{1b}[31mred pony\u{1b}[0m\n";
        let out = render(template, &RenderOptions::default()).unwrap();
        assert_eq!(out, template);
    }

    #[test]
    fn double_marker_is_literal() {
        let out = render("price: $$5\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "price: $5\n");
    }

    #[test]
    fn assignment_and_lookup() {
        let out = render("$eye=o$($eye$ $eye$)\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "(o o)\n");
    }

    #[test]
    fn replacement_is_rescanned() {
        // outer's value embeds a whole directive via the backtick escape
        let out = render(
            "$inner=x$$outer=[`$inner`$]$$outer$\n",
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(out, "[x]\n");
    }

    #[test]
    fn marker_valued_variable_does_not_recurse() {
        // d is assigned the literal value "$$"
        let out = render("$d=`$`$$$d$\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "$\n");
    }

    #[test]
    fn escaped_marker_inside_name() {
        // `$ inside the name is taken literally by the backtick escape.
        let out = render("$a`$b=yes$$a`$b$\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "yes\n");
    }

    #[test]
    fn undefined_variable_is_fatal_and_named() {
        let err = render("$nosuch$\n", &RenderOptions::default()).unwrap_err();
        let var = err
            .downcast_ref::<UndefinedVariableError>()
            .expect("typed error");
        assert_eq!(var.name, "nosuch");
    }

    #[test]
    fn links_render_from_style() {
        let out = render("$\\$ hi $/$\n", &with_style("")).unwrap();
        assert!(out.contains('╲'), "{out:?}");
        assert!(out.contains('╱'), "{out:?}");
        assert!(out.contains(" hi "), "{out:?}");
    }

    #[test]
    fn links_vanish_without_style() {
        let out = render("$\\$pony$/$\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "pony\n");
    }

    #[test]
    fn balloon_without_style_is_dropped() {
        let out = render("$balloon5$art\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "art\n");
    }

    #[test]
    fn balloon_min_dimensions() {
        let out = render("$balloon10,3$\n", &with_style("hi")).unwrap();
        let lines: Vec<&str> = out.trim_end_matches('\n').split('\n').collect();
        // at least 3 content rows plus the two border rows
        assert!(lines.len() >= 5, "{out:?}");
        // interior at least 10 columns (plus one border column each side)
        for line in &lines {
            assert!(width::visible_width(line) >= 12, "{line:?}");
        }
        assert!(out.contains("hi"));
    }

    #[test]
    fn balloon_wraps_message() {
        let mut opts = with_style("one two three");
        opts.wrap = Some(9);
        let out = render("$balloon$\n\n\n\n", &opts).unwrap();
        assert!(out.contains("one two"), "{out:?}");
        assert!(out.contains("three"), "{out:?}");
        // The two words must sit on different balloon rows.
        let joined_row = out.lines().any(|l| l.contains("one two three"));
        assert!(!joined_row, "{out:?}");
    }

    #[test]
    fn overlay_rows_sit_beside_following_lines() {
        let mut opts = with_style("hi");
        opts.wrap = None;
        let out = render("ab $balloon$\ncd\nef\ngh\n", &opts).unwrap();
        let lines: Vec<String> = out.lines().map(plain).collect();
        assert_eq!(lines[0], "ab ╭────╮");
        assert_eq!(lines[1], "cd │ hi │");
        assert_eq!(lines[2], "ef ╰────╯");
        assert_eq!(lines[3], "gh");
    }

    #[test]
    fn leftover_overlay_rows_flush_at_end() {
        let mut opts = with_style("hi");
        opts.wrap = None;
        let out = render("$balloon$\n", &opts).unwrap();
        let lines: Vec<String> = out.lines().map(plain).collect();
        assert_eq!(lines, vec!["╭────╮", "│ hi │", "╰────╯"]);
    }

    #[test]
    fn balloon_colours_stay_scoped() {
        let mut opts = with_style("hi");
        opts.wrap = None;
        opts.balloon_colour = Some("34".to_string());
        // Art is red before and after the balloon; the balloon must not
        // inherit red, and the art after must get red restored.
        let out = render("\u{1b}[31mA$balloon$\nB\nC\nD\u{1b}[0m\n", &opts).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        // Balloon row starts with a full reset, then its own colour.
        assert!(lines[0].contains("\u{1b}[0m\u{1b}[34m"), "{lines:?}");
        // After the balloon row the red foreground is restored.
        assert!(lines[0].contains("\u{1b}[0;31m"), "{lines:?}");
    }

    #[test]
    fn message_colour_applies_inside_balloon() {
        let mut opts = with_style("hi");
        opts.wrap = None;
        opts.message_colour = Some("32".to_string());
        let out = render("$balloon$\n", &opts).unwrap();
        assert!(out.contains("\u{1b}[32mhi"), "{out:?}");
    }

    #[test]
    fn truncation_cuts_to_exact_width() {
        let mut opts = RenderOptions::default();
        opts.term_width = Some(10);
        let out = render("\u{1b}[31m12345678901234567890\n", &opts).unwrap();
        let line = out.trim_end_matches('\n');
        assert_eq!(width::visible_width(line), 10);
        assert!(line.starts_with("\u{1b}[31m"), "{line:?}");
        assert_eq!(line, "\u{1b}[31m1234567890");
    }

    #[test]
    fn truncation_never_splits_wide_glyph() {
        let mut opts = RenderOptions::default();
        opts.term_width = Some(5);
        let out = render("ab中文字\n", &opts).unwrap();
        // "ab" + "中" = 4 columns; "文" would reach 6 and is dropped whole.
        assert_eq!(out, "ab中\n");
    }

    #[test]
    fn metadata_hidden_by_default() {
        let template = "$$$\nNAME: pony\n$$$\nart\n";
        let out = render(template, &RenderOptions::default()).unwrap();
        assert_eq!(out, "art\n");
    }

    #[test]
    fn metadata_inline_emits_commentary() {
        let template = "$$$\nNAME: pony\n$$$\nart\n";
        let mut opts = RenderOptions::default();
        opts.info = InfoLevel::Inline;
        let out = render(template, &opts).unwrap();
        assert!(out.contains("\u{1b}[2mNAME: pony\u{1b}[0m"), "{out:?}");
        assert!(out.ends_with("art\n"));
    }

    #[test]
    fn metadata_full_replaces_message() {
        let template = "$$$\nNAME: pony\n$$$\n$balloon$\n";
        let mut opts = with_style("ignored");
        opts.info = InfoLevel::Full;
        opts.wrap = None;
        let out = render(template, &opts).unwrap();
        assert!(out.contains("NAME: pony"), "{out:?}");
        assert!(!out.contains("ignored"));
    }

    #[test]
    fn metadata_full_without_header_uses_placeholder() {
        let mut opts = with_style("ignored");
        opts.info = InfoLevel::Full;
        opts.wrap = None;
        let out = render("$balloon$\n", &opts).unwrap();
        assert!(out.contains(NO_METADATA), "{out:?}");
    }

    #[test]
    fn unterminated_directive_stays_visible() {
        let out = render("oops $tail", &RenderOptions::default()).unwrap();
        assert_eq!(out, "oops $tail\n");
    }

    #[test]
    fn anchored_balloon_clamps_to_wrap_boundary() {
        let mut opts = with_style("hi");
        opts.wrap = Some(12);
        // Left-anchored at column 30 would overflow the wrap boundary.
        let out = render("$balloon30l$\n", &opts).unwrap();
        let first = out.lines().next().unwrap();
        assert!(width::visible_width(first) <= 12, "{first:?}");
    }

    #[test]
    fn no_trailing_blank_line() {
        let out = render("art\n\n\n", &RenderOptions::default()).unwrap();
        assert_eq!(out, "art\n");
    }
}
