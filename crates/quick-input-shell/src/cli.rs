//! CLI definitions for quick-input-shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "quick-input-shell",
    version,
    about = "Drive quick input sessions from stdin",
    after_help = "Session commands (one per line on stdin):\n  type <text>   clear   up   down   space   enter   esc\n  select <n>   check <n>   uncheck <n>   check-all   uncheck-all\n  next   prev   focus   blur   layout <width> <height>   cancel\n\nExamples:\n  printf 'type re\\nenter\\n' | quick-input-shell pick-one red green blue\n  quick-input-shell input --prompt 'Branch name' --min-len 3"
)]
pub struct Cli {
    /// Directory holding quick-input.toml (defaults to the current directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Print view updates as JSON lines instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick one item. Items are `label` or `label|description`.
    PickOne {
        #[arg(required = true)]
        items: Vec<String>,
        #[arg(long)]
        placeholder: Option<String>,
        /// Also filter on item descriptions.
        #[arg(long)]
        match_on_description: bool,
        /// Deliver the items after this many milliseconds.
        #[arg(long)]
        load_delay_ms: Option<u64>,
        /// Keep the session open when `blur` is received.
        #[arg(long)]
        ignore_focus_lost: bool,
    },
    /// Pick any number of items.
    PickMany {
        #[arg(required = true)]
        items: Vec<String>,
        #[arg(long)]
        placeholder: Option<String>,
        /// Message shown below the input.
        #[arg(long)]
        message: Option<String>,
        /// Labels that start checked.
        #[arg(long)]
        picked: Vec<String>,
        #[arg(long)]
        match_on_description: bool,
        #[arg(long)]
        load_delay_ms: Option<u64>,
        #[arg(long)]
        ignore_focus_lost: bool,
    },
    /// Enter free text.
    Input {
        /// Initial value.
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        placeholder: Option<String>,
        /// Mask the typed text.
        #[arg(long)]
        password: bool,
        /// Reject values shorter than this many characters.
        #[arg(long)]
        min_len: Option<usize>,
        /// Reject values containing this text (repeatable).
        #[arg(long)]
        forbid: Vec<String>,
        /// Simulated validator latency in milliseconds.
        #[arg(long, default_value = "0")]
        validate_delay_ms: u64,
        #[arg(long)]
        ignore_focus_lost: bool,
    },
}
