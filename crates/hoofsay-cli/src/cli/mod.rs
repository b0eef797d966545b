//! CLI entry and dispatch.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hoofsay")]
#[command(version)]
#[command(about = "Ponies with speech balloons for your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    say: SayArgs,
}

/// Render options for the default command.
#[derive(clap::Args, Debug)]
pub struct SayArgs {
    /// Message words; read from stdin when empty
    #[arg(value_name = "MESSAGE")]
    pub message: Vec<String>,

    /// Pony template: embedded name or path to a .pony file
    #[arg(short = 'f', long, default_value = "sparkle")]
    pub pony: String,

    /// Balloon style: embedded name or path to a .say file
    #[arg(short, long)]
    pub balloon: Option<String>,

    /// Use the thought-bubble style by default
    #[arg(long)]
    pub think: bool,

    /// Render the art alone, without balloon or links
    #[arg(long = "pony-only", conflicts_with_all = ["balloon", "think"])]
    pub pony_only: bool,

    /// Wrap column for the message ("none" disables wrapping)
    #[arg(short = 'W', long, default_value = "40", value_name = "COLS")]
    pub wrap: String,

    /// Truncate output to this width ("none" disables; defaults to the
    /// detected terminal width)
    #[arg(long, value_name = "COLS")]
    pub width: Option<String>,

    /// Metadata display: 0 hidden, 1 inline, 2 replaces the message
    #[arg(short, long, default_value_t = 0)]
    pub info: u8,

    /// Glyph emitted at soft-hyphen break points
    #[arg(long, default_value = "-")]
    pub hyphen: String,

    /// SGR parameters for the message text (e.g. "1;31")
    #[arg(long, alias = "color-message", value_name = "SGR")]
    pub colour_message: Option<String>,

    /// SGR parameters for the balloon border
    #[arg(long, alias = "color-balloon", value_name = "SGR")]
    pub colour_balloon: Option<String>,

    /// SGR parameters for the link glyphs
    #[arg(long, alias = "color-link", value_name = "SGR")]
    pub colour_link: Option<String>,

    /// SGR parameters for the inserted hyphen glyph
    #[arg(long, alias = "color-hyphen", value_name = "SGR")]
    pub colour_hyphen: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List embedded balloon styles
    Styles,
    /// List embedded pony templates
    Ponies,
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Styles) => commands::styles::list(),
        Some(Commands::Ponies) => commands::ponies::list(),
        None => commands::say::run(&cli.say),
    }
}

/// Logging goes to stderr so the rendered pony owns stdout.
fn init_logging() {
    let filter = EnvFilter::try_from_env("HOOFSAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
