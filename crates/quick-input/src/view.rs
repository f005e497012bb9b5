//! Host-facing view contract.
//!
//! The controller never renders anything itself. It pushes [`ViewUpdate`]s to
//! a [`QuickInputView`] supplied by the host, in the order they must be
//! applied.

use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::input_box::{InputBox, Severity};
use crate::list::ListRow;
use crate::params::InputKind;

/// Widget regions visible for the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Regions {
    pub check_all: bool,
    pub input_box: bool,
    pub count: bool,
    pub ok: bool,
    pub list: bool,
    pub message: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusRegion {
    Input,
    List,
}

/// Size of the container hosting the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutMetrics {
    pub width: u32,
    pub list_max_height: u32,
}

impl LayoutMetrics {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn compute(container: Dimension, config: &LayoutConfig) -> Self {
        let width = (container.width as f32 * config.width_ratio) as u32;
        let list_max_height = (container.height as f32 * config.list_height_ratio).floor() as u32;
        Self {
            width: width.min(config.max_width),
            list_max_height,
        }
    }
}

/// One change to apply to the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewUpdate {
    Show { kind: InputKind },
    Hide { restore_focus: bool },
    Regions(Regions),
    Input(InputBox),
    Message(String),
    List(Vec<ListRow>),
    CheckAll(bool),
    Count(usize),
    Busy(bool),
    Focus(FocusRegion),
    Layout(LayoutMetrics),
}

impl ViewUpdate {
    /// Compact one-line rendering, used for logs and transcripts.
    pub fn describe(&self) -> String {
        match self {
            ViewUpdate::Show { kind } => format!("show {kind}"),
            ViewUpdate::Hide { restore_focus } => format!("hide restore_focus={restore_focus}"),
            ViewUpdate::Regions(regions) => {
                let names = [
                    ("check_all", regions.check_all),
                    ("input", regions.input_box),
                    ("count", regions.count),
                    ("ok", regions.ok),
                    ("list", regions.list),
                    ("message", regions.message),
                ];
                let visible: Vec<&str> = names
                    .iter()
                    .filter(|(_, shown)| *shown)
                    .map(|(name, _)| *name)
                    .collect();
                format!("regions {}", visible.join(","))
            }
            ViewUpdate::Input(input) => {
                let mut out = format!("input {:?}", input.value);
                if input.password {
                    out.push_str(" password");
                }
                if let Some(selection) = &input.selection {
                    let _ = write!(out, " selection={}..{}", selection.start, selection.end);
                }
                if input.severity == Severity::Error {
                    out.push_str(" error");
                }
                out
            }
            ViewUpdate::Message(message) => format!("message {message:?}"),
            ViewUpdate::List(rows) => {
                let rows: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let mut label = row.label.clone();
                        if row.checked {
                            label.insert_str(0, "[x]");
                        }
                        if row.focused {
                            label.insert(0, '>');
                        }
                        label
                    })
                    .collect();
                format!("list [{}]", rows.join(", "))
            }
            ViewUpdate::CheckAll(checked) => format!("check_all {checked}"),
            ViewUpdate::Count(count) => format!("count {count}"),
            ViewUpdate::Busy(busy) => format!("busy {busy}"),
            ViewUpdate::Focus(region) => format!("focus {region:?}").to_lowercase(),
            ViewUpdate::Layout(metrics) => format!(
                "layout width={} list_max_height={}",
                metrics.width, metrics.list_max_height
            ),
        }
    }
}

/// Receives widget updates from the controller.
pub trait QuickInputView: Send + Sync {
    fn update(&self, update: ViewUpdate);
}

impl<F> QuickInputView for F
where
    F: Fn(ViewUpdate) + Send + Sync,
{
    fn update(&self, update: ViewUpdate) {
        self(update);
    }
}

/// A view that records every update. Used by headless hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    updates: Arc<Mutex<Vec<ViewUpdate>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates.lock().clone()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<ViewUpdate> {
        std::mem::take(&mut *self.updates.lock())
    }

    /// One [`ViewUpdate::describe`] line per recorded update.
    pub fn transcript(&self) -> String {
        self.updates
            .lock()
            .iter()
            .map(|update| update.describe() + "\n")
            .collect()
    }

    pub fn hide_count(&self) -> usize {
        self.updates
            .lock()
            .iter()
            .filter(|update| matches!(update, ViewUpdate::Hide { .. }))
            .count()
    }

    pub fn last_message(&self) -> Option<String> {
        self.updates.lock().iter().rev().find_map(|update| match update {
            ViewUpdate::Message(message) => Some(message.clone()),
            _ => None,
        })
    }

    pub fn last_list(&self) -> Option<Vec<ListRow>> {
        self.updates.lock().iter().rev().find_map(|update| match update {
            ViewUpdate::List(rows) => Some(rows.clone()),
            _ => None,
        })
    }

    pub fn last_input(&self) -> Option<InputBox> {
        self.updates.lock().iter().rev().find_map(|update| match update {
            ViewUpdate::Input(input) => Some(input.clone()),
            _ => None,
        })
    }
}

impl QuickInputView for RecordingView {
    fn update(&self, update: ViewUpdate) {
        self.updates.lock().push(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn layout_follows_container_size() {
        let config = LayoutConfig::default();
        let wide = LayoutMetrics::compute(
            Dimension {
                width: 2000,
                height: 1000,
            },
            &config,
        );
        assert_eq!(wide.width, 600);
        assert_eq!(wide.list_max_height, 400);

        let narrow = LayoutMetrics::compute(
            Dimension {
                width: 500,
                height: 333,
            },
            &config,
        );
        assert_eq!(narrow.width, 310);
        assert_eq!(narrow.list_max_height, 133);
    }

    #[test]
    fn recording_view_describes_updates() {
        let view = RecordingView::new();
        view.update(ViewUpdate::Show {
            kind: InputKind::PickMany,
        });
        view.update(ViewUpdate::Regions(Regions {
            check_all: true,
            input_box: true,
            count: true,
            ok: true,
            list: true,
            message: false,
        }));
        view.update(ViewUpdate::Input(InputBox {
            value: "ab".into(),
            selection: Some(0..2),
            severity: Severity::Error,
            ..InputBox::default()
        }));
        view.update(ViewUpdate::Focus(FocusRegion::List));
        view.update(ViewUpdate::Hide {
            restore_focus: false,
        });

        expect![[r#"
            show pickMany
            regions check_all,input,count,ok,list
            input "ab" selection=0..2 error
            focus list
            hide restore_focus=false
        "#]]
        .assert_eq(&view.transcript());
        assert_eq!(view.hide_count(), 1);
        assert_eq!(view.take().len(), 5);
        assert!(view.updates().is_empty());
    }
}
