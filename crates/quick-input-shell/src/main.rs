//! `quick-input-shell` - drive quick input sessions from a terminal.
//!
//! View updates are printed to stdout as they happen; the final result is
//! printed as one JSON object.

mod cli;
mod host;
mod style;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use quick_input::{
    ItemsSource, PickItem, PickManyOptions, PickOneOptions, QuickInputConfig, QuickInputService,
    TextInputOptions,
};
use serde::Serialize;
use tracing::info;

use cli::{Cli, Command};
use host::{Outcome, TerminalView};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{}", style::error(format!("Error: {err:#}")));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let root = match cli.config {
        Some(root) => root,
        None => std::env::current_dir().context("resolving working directory")?,
    };
    let config = QuickInputConfig::load(&root);
    if let Some(path) = &config.config_path {
        info!("using config {}", path.display());
    }
    let service = QuickInputService::<PickItem>::new(TerminalView::new(cli.json), config);

    let outcome = match cli.command {
        Command::PickOne {
            items,
            placeholder,
            match_on_description,
            load_delay_ms,
            ignore_focus_lost,
        } => {
            let items = items.iter().map(|entry| host::parse_item(entry)).collect();
            let mut options = PickOneOptions::new(source(items, load_delay_ms))
                .match_on_description(match_on_description)
                .ignore_focus_lost(ignore_focus_lost);
            if let Some(placeholder) = placeholder {
                options = options.placeholder(placeholder);
            }
            let promise = service
                .pick_one(options)
                .map(|item| item.label.to_string());
            finish(host::drive(&service, promise).await?)?
        }
        Command::PickMany {
            items,
            placeholder,
            message,
            picked,
            match_on_description,
            load_delay_ms,
            ignore_focus_lost,
        } => {
            let items = items
                .iter()
                .map(|entry| {
                    let item = host::parse_item(entry);
                    let checked = picked.iter().any(|label| *label == item.label);
                    item.with_picked(checked)
                })
                .collect();
            let mut options = PickManyOptions::new(source(items, load_delay_ms))
                .match_on_description(match_on_description)
                .ignore_focus_lost(ignore_focus_lost);
            if let Some(placeholder) = placeholder {
                options = options.placeholder(placeholder);
            }
            if let Some(message) = message {
                options = options.message(message);
            }
            let promise = service.pick_many(options).map(|items| {
                items
                    .into_iter()
                    .map(|item| item.label.to_string())
                    .collect::<Vec<_>>()
            });
            finish(host::drive(&service, promise).await?)?
        }
        Command::Input {
            value,
            prompt,
            placeholder,
            password,
            min_len,
            forbid,
            validate_delay_ms,
            ignore_focus_lost,
        } => {
            let mut options = TextInputOptions::new()
                .password(password)
                .ignore_focus_lost(ignore_focus_lost);
            if let Some(value) = value {
                options = options.value(value);
            }
            if let Some(prompt) = prompt {
                options = options.prompt(prompt);
            }
            if let Some(placeholder) = placeholder {
                options = options.placeholder(placeholder);
            }
            if min_len.is_some() || !forbid.is_empty() {
                let forbid: Arc<[String]> = forbid.into();
                let delay = Duration::from_millis(validate_delay_ms);
                options = options.validate_async(move |value| {
                    let forbid = Arc::clone(&forbid);
                    async move {
                        tokio::time::sleep(delay).await;
                        Ok::<_, anyhow::Error>(check_text(&value, min_len, &forbid))
                    }
                });
            }
            finish(host::drive(&service, service.input(options)).await?)?
        }
    };

    service.shutdown();
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

fn source(items: Vec<PickItem>, delay_ms: Option<u64>) -> ItemsSource<PickItem> {
    match delay_ms {
        Some(delay) => ItemsSource::from_future(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(items)
        }),
        None => items.into(),
    }
}

fn finish<R: Serialize>(settled: quick_input::Settlement<R>) -> anyhow::Result<Outcome> {
    let value = settled.context("quick input session failed")?;
    let outcome = Outcome::from_value(value)?;
    match &outcome {
        Outcome::Accepted { .. } => eprintln!("{}", style::accepted("accepted")),
        Outcome::Dismissed => eprintln!("{}", style::dismissed("dismissed")),
    }
    Ok(outcome)
}

fn check_text(value: &str, min_len: Option<usize>, forbid: &[String]) -> Option<String> {
    if let Some(min) = min_len {
        if value.chars().count() < min {
            return Some(format!("Enter at least {min} characters"));
        }
    }
    forbid
        .iter()
        .find(|needle| value.contains(needle.as_str()))
        .map(|needle| format!("'{needle}' is not allowed"))
}
