//! Nested ANSI colour scopes.
//!
//! Inserted sub-content (the balloon, the wrapped message, link glyphs) must
//! neither inherit colour state from the surrounding art nor leak its own
//! resets back out. Each nesting level gets an independently tracked SGR
//! frame; scope boundaries travel in-band as sentinel strings planted by the
//! expander and recognised (and stripped) here.

use std::fmt::Write as _;

/// Marks the start of a nested colour scope in the emission stream.
pub const PUSH_SENTINEL: &str = "\u{e000}\u{e001}";
/// Marks the end of a nested colour scope in the emission stream.
pub const POP_SENTINEL: &str = "\u{e000}\u{e002}";

/// Returns true for characters reserved for scope sentinels.
///
/// These never appear in templates or terminal output; they exist only
/// between the expander and the scope stack and take no columns.
pub fn is_sentinel_char(c: char) -> bool {
    ('\u{e000}'..='\u{e00f}').contains(&c)
}

/// One saved SGR state: foreground, background, and nine attribute flags
/// (bold, faint, italic, underline, blink, rapid blink, inverse, conceal,
/// strike).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColourState {
    fg: Option<String>,
    bg: Option<String>,
    attrs: [bool; 9],
}

impl ColourState {
    /// Escape that resets to default and re-applies this state in full.
    fn restore_sequence(&self) -> String {
        let mut seq = String::from("\u{1b}[0");
        for (i, on) in self.attrs.iter().enumerate() {
            if *on {
                let _ = write!(seq, ";{}", i + 1);
            }
        }
        if let Some(fg) = &self.fg {
            let _ = write!(seq, ";{fg}");
        }
        if let Some(bg) = &self.bg {
            let _ = write!(seq, ";{bg}");
        }
        seq.push('m');
        seq
    }
}

/// Result of feeding one character to the stack.
#[derive(Debug, PartialEq, Eq)]
pub enum Feed {
    /// Append the character to the output as-is.
    Pass,
    /// A sentinel completed: remove the last `strip` characters already
    /// appended and append `emission` in their place.
    Splice { strip: usize, emission: String },
}

/// Stack of independently scoped SGR states.
///
/// Exactly one frame exists at all times: the root frame is created at
/// construction (its implicit push emits nothing, the terminal is already in
/// its default state) and popping the last frame re-creates a fresh root
/// instead of failing.
#[derive(Debug)]
pub struct ColourScopeStack {
    frames: Vec<ColourState>,
    /// Escape sequence currently being collected, if any.
    esc: Option<String>,
    /// Trailing window of recently fed characters for sentinel matching.
    window: String,
}

impl Default for ColourScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ColourScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![ColourState::default()],
            esc: None,
            window: String::new(),
        }
    }

    fn top_mut(&mut self) -> &mut ColourState {
        if self.frames.is_empty() {
            self.frames.push(ColourState::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Opens a new scope with blank state. Emits a full reset so the nested
    /// content starts from terminal defaults.
    pub fn push(&mut self) -> String {
        self.frames.push(ColourState::default());
        "\u{1b}[0m".to_string()
    }

    /// Closes the innermost scope and emits the escape that restores the
    /// previous frame's state exactly. The last remaining frame is never
    /// removed; popping it re-roots the stack.
    pub fn pop(&mut self) -> String {
        self.frames.pop();
        if self.frames.is_empty() {
            tracing::debug!("colour scope stack popped past root; re-rooting");
            self.frames.push(ColourState::default());
        }
        let last = self.frames.len() - 1;
        self.frames[last].restore_sequence()
    }

    /// Depth of the stack (1 = root only).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Consumes one character of the output stream being built.
    ///
    /// Tracks escape sequences (started by ESC, ended by an ASCII letter or
    /// `~`) and applies completed SGR sequences to the innermost frame. Also
    /// watches for the push/pop sentinels and converts them into the
    /// corresponding scope emission.
    pub fn feed(&mut self, c: char) -> Feed {
        // Sentinel window first: sentinels are planted between sequences,
        // never inside one.
        self.window.push(c);
        while self.window.chars().count() > 2 {
            self.window.remove(0);
        }
        if self.window == PUSH_SENTINEL {
            self.window.clear();
            return Feed::Splice {
                strip: 1,
                emission: self.push(),
            };
        }
        if self.window == POP_SENTINEL {
            self.window.clear();
            return Feed::Splice {
                strip: 1,
                emission: self.pop(),
            };
        }

        if let Some(mut seq) = self.esc.take() {
            seq.push(c);
            if c.is_ascii_alphabetic() || c == '~' {
                // Sequence complete; only SGR updates frame state.
                if c == 'm' && seq.starts_with("\u{1b}[") {
                    let body = &seq[2..seq.len() - 1];
                    self.apply_sgr(body);
                }
            } else {
                self.esc = Some(seq);
            }
            return Feed::Pass;
        }
        if c == crate::width::ESC {
            self.esc = Some(String::from(c));
        }
        Feed::Pass
    }

    /// Applies a `;`-separated SGR parameter list to the innermost frame.
    fn apply_sgr(&mut self, body: &str) {
        let params: Vec<u32> = body
            .split(';')
            .map(|p| if p.is_empty() { 0 } else { p.parse().unwrap_or(u32::MAX) })
            .collect();
        let top = self.top_mut();
        let mut i = 0;
        while i < params.len() {
            let p = params[i];
            match p {
                0 => *top = ColourState::default(),
                1..=9 => top.attrs[(p - 1) as usize] = true,
                21..=29 => top.attrs[(p - 21) as usize] = false,
                30..=37 | 90..=97 => top.fg = Some(p.to_string()),
                39 => top.fg = None,
                40..=47 | 100..=107 => top.bg = Some(p.to_string()),
                49 => top.bg = None,
                38 | 48 => {
                    // Extended colour: the selector consumes the next two
                    // parameters (e.g. 38;5;196).
                    let ext: Vec<String> = params[i + 1..]
                        .iter()
                        .take(2)
                        .map(ToString::to_string)
                        .collect();
                    let joined = if ext.is_empty() {
                        p.to_string()
                    } else {
                        format!("{p};{}", ext.join(";"))
                    };
                    if p == 38 {
                        top.fg = Some(joined);
                    } else {
                        top.bg = Some(joined);
                    }
                    i += ext.len();
                }
                _ => {}
            }
            i += 1;
        }
    }
}
