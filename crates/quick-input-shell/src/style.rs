//! Terminal styling for shell output.

use std::io::IsTerminal;

use owo_colors::OwoColorize;

fn should_color() -> bool {
    std::io::stdout().is_terminal()
}

/// A view update line.
pub fn update(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if should_color() {
        format!("{} {}", "·".dimmed(), text.cyan())
    } else {
        format!("· {text}")
    }
}

pub fn accepted(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if should_color() {
        format!("{}", text.green().bold())
    } else {
        text.to_string()
    }
}

pub fn dismissed(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if should_color() {
        format!("{}", text.yellow())
    } else {
        text.to_string()
    }
}

pub fn error(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if std::io::stderr().is_terminal() {
        format!("{}", text.red())
    } else {
        text.to_string()
    }
}
