//! Balloon styles and box rendering.
//!
//! A balloon style names the glyphs for every border piece of the speech or
//! thought bubble: three link glyphs (the connector drawn between balloon
//! and pony, its mirror, and the crossing variant), the single-line west and
//! east pieces, and sixteen compass row-sets for corners, edges and the
//! top/middle/bottom side variants. Styles are parsed once from a
//! line-oriented text format and never mutated afterwards.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};

use crate::width;

/// Horizontal placement of content lines inside the box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Justify {
    #[default]
    Left,
    Centre,
    Right,
}

/// Immutable glyph set for one balloon shape.
#[derive(Debug, Clone)]
pub struct BalloonStyle {
    /// Connector glyph drawn from balloon toward the mouth.
    pub link: String,
    /// Mirrored connector.
    pub linkmirror: String,
    /// Connector for crossing link lines.
    pub linkcross: String,
    ww: Vec<String>,
    ee: Vec<String>,
    nw: Vec<String>,
    nnw: Vec<String>,
    n: Vec<String>,
    nne: Vec<String>,
    ne: Vec<String>,
    nee: Vec<String>,
    e: Vec<String>,
    see: Vec<String>,
    se: Vec<String>,
    sse: Vec<String>,
    s: Vec<String>,
    ssw: Vec<String>,
    sw: Vec<String>,
    sww: Vec<String>,
    w: Vec<String>,
    nww: Vec<String>,
}

fn piece(set: &[String]) -> &str {
    set.first().map_or("", String::as_str)
}

fn set_width(set: &[String]) -> usize {
    set.iter().map(|r| width::visible_width(r)).max().unwrap_or(0)
}

impl BalloonStyle {
    /// Parses the line-oriented style format: `TAG:value` names a tag (and
    /// its first row), `:value` appends another row to the most recently
    /// named tag. All required tags must be present; unknown tags are
    /// ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sets: HashMap<String, Vec<String>> = HashMap::new();
        let mut last: Option<String> = None;

        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            if let Some(value) = line.strip_prefix(':') {
                let tag = last
                    .clone()
                    .with_context(|| format!("line {}: continuation before any tag", idx + 1))?;
                if let Some(rows) = sets.get_mut(&tag) {
                    rows.push(value.to_string());
                }
            } else if let Some((tag, value)) = line.split_once(':') {
                sets.entry(tag.to_string()).or_default().push(value.to_string());
                last = Some(tag.to_string());
            } else {
                bail!("line {}: expected TAG:value or :value", idx + 1);
            }
        }

        let mut take = |tag: &str| -> Result<Vec<String>> {
            sets.remove(tag)
                .with_context(|| format!("balloon style is missing required tag '{tag}'"))
        };

        let style = Self {
            link: take("\\")?.join(""),
            linkmirror: take("/")?.join(""),
            linkcross: take("X")?.join(""),
            ww: take("ww")?,
            ee: take("ee")?,
            nw: take("nw")?,
            nnw: take("nnw")?,
            n: take("n")?,
            nne: take("nne")?,
            ne: take("ne")?,
            nee: take("nee")?,
            e: take("e")?,
            see: take("see")?,
            se: take("se")?,
            sse: take("sse")?,
            s: take("s")?,
            ssw: take("ssw")?,
            sw: take("sw")?,
            sww: take("sww")?,
            w: take("w")?,
            nww: take("nww")?,
        };
        for tag in sets.keys() {
            tracing::debug!("ignoring unknown balloon style tag '{tag}'");
        }
        Ok(style)
    }

    fn top_rows(&self) -> usize {
        [&self.nw, &self.nnw, &self.n, &self.nne, &self.ne]
            .iter()
            .map(|s| s.len())
            .max()
            .unwrap_or(0)
    }

    fn bottom_rows(&self) -> usize {
        [&self.sw, &self.ssw, &self.s, &self.sse, &self.se]
            .iter()
            .map(|s| s.len())
            .max()
            .unwrap_or(0)
    }

    /// Minimum inner width at which the combined inner corner glyphs fit.
    pub fn min_width(&self) -> usize {
        let top = set_width(&self.nnw) + set_width(&self.nne);
        let bottom = set_width(&self.ssw) + set_width(&self.sse);
        top.max(bottom)
    }

    /// Rows the borders alone occupy.
    pub fn min_height(&self) -> usize {
        self.top_rows() + self.bottom_rows()
    }

    /// West and east border column widths, for placement arithmetic.
    pub fn border_cols(&self) -> (usize, usize) {
        (self.west_col(), self.east_col())
    }

    fn west_col(&self) -> usize {
        [&self.ww, &self.w, &self.nww, &self.sww]
            .iter()
            .map(|s| set_width(s))
            .max()
            .unwrap_or(0)
    }

    fn east_col(&self) -> usize {
        [&self.ee, &self.e, &self.nee, &self.see]
            .iter()
            .map(|s| set_width(s))
            .max()
            .unwrap_or(0)
    }

    /// Draws the box around `lines`.
    ///
    /// The content width is `max(min_width, widest line)`; the content
    /// height is `max(min_height, lines)`, padded with blank rows, plus the
    /// border rows. Every returned row has the same visible width.
    pub fn render(
        &self,
        min_width: usize,
        min_height: usize,
        lines: &[String],
        justify: Justify,
    ) -> Vec<String> {
        let inner = lines
            .iter()
            .map(|l| width::visible_width(l))
            .max()
            .unwrap_or(0)
            .max(min_width);
        let top = self.top_rows();
        let bottom = self.bottom_rows();
        let content_rows = lines.len().max(min_height).max(1);
        let w_col = self.west_col();
        let e_col = self.east_col();

        let mut rows = Vec::with_capacity(top + content_rows + bottom);
        for i in 0..top {
            rows.push(self.border_row(
                i, inner, w_col, e_col, &self.nw, &self.nnw, &self.n, &self.nne, &self.ne,
            ));
        }
        for r in 0..content_rows {
            let line = lines.get(r).map_or("", String::as_str);
            let (west, east) = if content_rows == 1 {
                (&self.ww, &self.ee)
            } else if r == 0 {
                (&self.nww, &self.nee)
            } else if r + 1 == content_rows {
                (&self.sww, &self.see)
            } else {
                (&self.w, &self.e)
            };
            let pad = inner.saturating_sub(width::visible_width(line));
            let (lpad, rpad) = match justify {
                Justify::Left => (0, pad),
                Justify::Right => (pad, 0),
                Justify::Centre => (pad / 2, pad - pad / 2),
            };
            rows.push(format!(
                "{}{}{}{}{}",
                pad_to(piece(west), w_col, false),
                " ".repeat(lpad),
                line,
                " ".repeat(rpad),
                pad_to(piece(east), e_col, true),
            ));
        }
        for i in 0..bottom {
            rows.push(self.border_row(
                i, inner, w_col, e_col, &self.sw, &self.ssw, &self.s, &self.sse, &self.se,
            ));
        }
        rows
    }

    #[allow(clippy::too_many_arguments)]
    fn border_row(
        &self,
        i: usize,
        inner: usize,
        w_col: usize,
        e_col: usize,
        corner_l: &[String],
        inner_l: &[String],
        fill: &[String],
        inner_r: &[String],
        corner_r: &[String],
    ) -> String {
        let cl = corner_l.get(i).map_or("", String::as_str);
        let cr = corner_r.get(i).map_or("", String::as_str);
        let il = inner_l.get(i).map_or("", String::as_str);
        let ir = inner_r.get(i).map_or("", String::as_str);
        let f = fill.get(i).map_or("", String::as_str);

        // Inner corner glyphs are drawn only when they jointly fit the span.
        let (il, ir) = if width::visible_width(il) + width::visible_width(ir) <= inner {
            (il, ir)
        } else {
            ("", "")
        };
        let span = inner
            .saturating_sub(width::visible_width(il))
            .saturating_sub(width::visible_width(ir));
        format!(
            "{}{}{}{}{}",
            pad_to(cl, w_col, false),
            il,
            repeat_fill(f, span),
            ir,
            pad_to(cr, e_col, true),
        )
    }
}

/// Pads `piece` with spaces to `target` columns; `lead` pads on the left
/// (east-side pieces hug the border).
fn pad_to(piece: &str, target: usize, lead: bool) -> String {
    let pad = target.saturating_sub(width::visible_width(piece));
    if lead {
        format!("{}{piece}", " ".repeat(pad))
    } else {
        format!("{piece}{}", " ".repeat(pad))
    }
}

/// Repeats `fill` (cycling char by char) to exactly `span` columns.
fn repeat_fill(fill: &str, span: usize) -> String {
    if span == 0 {
        return String::new();
    }
    if fill.is_empty() {
        return " ".repeat(span);
    }
    let mut out = String::new();
    let mut cols = 0;
    for c in fill.chars().cycle() {
        let w = width::char_width(c);
        if cols + w > span {
            break;
        }
        out.push(c);
        cols += w;
        if cols == span {
            break;
        }
    }
    // A wide fill glyph can leave one column short.
    out.push_str(&" ".repeat(span - cols));
    out
}
