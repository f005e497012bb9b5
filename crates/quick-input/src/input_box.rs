//! Text field state shared by every input mode.

use std::ops::Range;

use serde::Serialize;

/// Decoration of the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InputBox {
    pub value: String,
    pub placeholder: Option<String>,
    pub password: bool,
    /// Selected char range, always within `value`.
    pub selection: Option<Range<usize>>,
    pub severity: Severity,
}

impl InputBox {
    /// Replaces the value; any selection is dropped.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.selection = None;
    }

    /// Selects `range` (in chars), clamped to the current value.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.value.chars().count();
        let end = range.end.min(len);
        let start = range.start.min(end);
        self.selection = Some(start..end);
    }

    pub fn select_all(&mut self) {
        self.select(0..usize::MAX);
    }

    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection.clone()?;
        Some(
            self.value
                .chars()
                .skip(range.start)
                .take(range.end - range.start)
                .collect(),
        )
    }
}
