//! Line-driven host: renders view updates to stdout and feeds stdin
//! commands into the active session.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use quick_input::{
    Dimension, KeyCode, PickItem, QuickInputService, QuickInputView, ResultPromise, Settlement,
    ViewUpdate,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::style;

/// Prints every view update, either as a compact line or as JSON.
pub struct TerminalView {
    json: bool,
}

impl TerminalView {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl QuickInputView for TerminalView {
    fn update(&self, update: ViewUpdate) {
        if self.json {
            match serde_json::to_string(&update) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("{}", style::error(format!("view update: {err}"))),
            }
        } else {
            println!("{}", style::update(update.describe()));
        }
    }
}

/// One stdin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Type(String),
    Clear,
    Up,
    Down,
    Space,
    Enter,
    Escape,
    Select(usize),
    Check { row: usize, checked: bool },
    CheckAll(bool),
    Next,
    Prev,
    Focus,
    Blur,
    Cancel,
    Layout(Dimension),
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let row = |rest: &str| -> anyhow::Result<usize> {
            rest.trim()
                .parse()
                .with_context(|| format!("`{word}` expects a row number"))
        };
        let command = match word {
            "type" => ShellCommand::Type(rest.to_string()),
            "clear" => ShellCommand::Clear,
            "up" => ShellCommand::Up,
            "down" => ShellCommand::Down,
            "space" => ShellCommand::Space,
            "enter" => ShellCommand::Enter,
            "esc" | "escape" => ShellCommand::Escape,
            "select" => ShellCommand::Select(row(rest)?),
            "check" => ShellCommand::Check {
                row: row(rest)?,
                checked: true,
            },
            "uncheck" => ShellCommand::Check {
                row: row(rest)?,
                checked: false,
            },
            "check-all" => ShellCommand::CheckAll(true),
            "uncheck-all" => ShellCommand::CheckAll(false),
            "next" => ShellCommand::Next,
            "prev" => ShellCommand::Prev,
            "focus" => ShellCommand::Focus,
            "blur" => ShellCommand::Blur,
            "cancel" => ShellCommand::Cancel,
            "layout" => {
                let mut parts = rest.split_whitespace().map(str::parse::<u32>);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(Ok(width)), Some(Ok(height)), None) => {
                        ShellCommand::Layout(Dimension { width, height })
                    }
                    _ => bail!("`layout` expects <width> <height>"),
                }
            }
            other => return Err(anyhow!("unknown command `{other}`")),
        };
        Ok(command)
    }
}

async fn apply(service: &QuickInputService<PickItem>, command: ShellCommand) {
    match command {
        ShellCommand::Type(text) => service.set_value(text),
        ShellCommand::Clear => service.set_value(""),
        ShellCommand::Up => service.key_down(KeyCode::Up.into()).await,
        ShellCommand::Down => service.key_down(KeyCode::Down.into()).await,
        ShellCommand::Space => service.key_down(KeyCode::Space.into()).await,
        ShellCommand::Enter => service.key_down(KeyCode::Enter.into()).await,
        ShellCommand::Escape => service.key_down(KeyCode::Escape.into()).await,
        ShellCommand::Select(row) => service.select_item(row).await,
        ShellCommand::Check { row, checked } => service.set_item_checked(row, checked),
        ShellCommand::CheckAll(checked) => service.set_check_all(checked),
        ShellCommand::Next => service.navigate(true, None),
        ShellCommand::Prev => service.navigate(false, None),
        ShellCommand::Focus => service.focus(),
        ShellCommand::Blur => service.focus_lost(),
        ShellCommand::Cancel => service.cancel(),
        ShellCommand::Layout(dimension) => service.layout(dimension),
    }
}

/// Feeds stdin into the session until its promise settles. End of input
/// cancels the session.
pub async fn drive<R: Send + 'static>(
    service: &QuickInputService<PickItem>,
    mut promise: ResultPromise<R>,
) -> anyhow::Result<Settlement<R>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            biased;
            settled = &mut promise => return Ok(settled),
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("reading stdin")? else {
                    debug!("stdin closed; cancelling session");
                    stdin_open = false;
                    service.cancel();
                    continue;
                };
                if line.trim().is_empty() || line.starts_with('#') {
                    continue;
                }
                match line.parse::<ShellCommand>() {
                    Ok(command) => {
                        debug!(?command, "shell command");
                        apply(service, command).await;
                    }
                    Err(err) => eprintln!("{}", style::error(format!("{err:#}"))),
                }
            }
        }
    }
}

/// Parses `label` or `label|description`.
pub fn parse_item(entry: &str) -> PickItem {
    match entry.split_once('|') {
        Some((label, description)) => PickItem::new(label).with_description(description),
        None => PickItem::new(entry),
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Accepted { value: serde_json::Value },
    Dismissed,
}

impl Outcome {
    pub fn from_value<R: Serialize>(value: Option<R>) -> anyhow::Result<Self> {
        Ok(match value {
            Some(value) => Outcome::Accepted {
                value: serde_json::to_value(value)?,
            },
            None => Outcome::Dismissed,
        })
    }
}
