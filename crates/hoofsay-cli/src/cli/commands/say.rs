//! Default render command.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use hoofsay_render::{BalloonStyle, InfoLevel, RenderOptions};

use crate::cli::SayArgs;

pub fn run(args: &SayArgs) -> Result<()> {
    let template = load_pony(&args.pony)?;
    let style = if args.pony_only {
        None
    } else {
        Some(load_style(args)?)
    };
    let message = read_message(args)?;
    let wrap = parse_cols(&args.wrap, "wrap")?;
    let term_width = match &args.width {
        Some(w) => parse_cols(w, "width")?,
        None => detected_terminal_width(),
    };

    let opts = RenderOptions {
        message,
        wrap,
        term_width,
        style,
        info: InfoLevel::from_level(args.info),
        hyphen: args.hyphen.clone(),
        hyphen_colour: args.colour_hyphen.clone(),
        link_colour: args.colour_link.clone(),
        balloon_colour: args.colour_balloon.clone(),
        message_colour: args.colour_message.clone(),
        ..RenderOptions::default()
    };

    let rendered = hoofsay_render::render(&template, &opts)?;
    print!("{rendered}");
    Ok(())
}

/// Parses a column count, with "none" meaning unlimited.
fn parse_cols(value: &str, what: &str) -> Result<Option<usize>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let cols = value
        .parse()
        .with_context(|| format!("invalid {what} column count {value:?}"))?;
    Ok(Some(cols))
}

fn detected_terminal_width() -> Option<usize> {
    crossterm::terminal::size().ok().map(|(w, _)| w as usize)
}

/// Embedded pony name first, filesystem path second.
fn load_pony(name: &str) -> Result<String> {
    if let Some(embedded) = hoofsay_assets::pony(name) {
        return Ok(embedded.to_string());
    }
    fs::read_to_string(name).with_context(|| format!("read pony template {name:?}"))
}

fn load_style(args: &SayArgs) -> Result<BalloonStyle> {
    let name = args
        .balloon
        .as_deref()
        .unwrap_or(if args.think { "think" } else { "round" });
    let text = match hoofsay_assets::balloon_style(name) {
        Some(embedded) => embedded.to_string(),
        None => {
            fs::read_to_string(name).with_context(|| format!("read balloon style {name:?}"))?
        }
    };
    BalloonStyle::parse(&text).with_context(|| format!("parse balloon style {name:?}"))
}

fn read_message(args: &SayArgs) -> Result<String> {
    if !args.message.is_empty() {
        return Ok(args.message.join(" "));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read message from stdin")?;
    Ok(buf.trim_end_matches('\n').to_string())
}
