//! Quick pick list model: filtering, focus and checked state.
//!
//! Rows are addressed by their position among the currently visible
//! (filter-matching) elements. Filtering never reorders elements.

use std::ops::Range;

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::Serialize;

use crate::item::QuickPickItem;

/// Focus movement within the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFocus {
    First,
    Last,
    Next,
    Previous,
    None,
}

/// Character ranges of filter matches, per field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Highlights {
    pub label: Vec<Range<usize>>,
    pub description: Vec<Range<usize>>,
    pub detail: Vec<Range<usize>>,
}

/// Snapshot of one visible row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub label: String,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub checked: bool,
    pub focused: bool,
    pub highlights: Highlights,
}

struct ListElement<T> {
    item: T,
    checked: bool,
    hidden: bool,
    highlights: Highlights,
}

pub struct QuickPickList<T> {
    elements: Vec<ListElement<T>>,
    /// Index into `elements`; always a visible element.
    focused: Option<usize>,
    match_on_description: bool,
    match_on_detail: bool,
}

impl<T: QuickPickItem> QuickPickList<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            focused: None,
            match_on_description: false,
            match_on_detail: false,
        }
    }

    pub fn set_match_on_description(&mut self, enabled: bool) {
        self.match_on_description = enabled;
    }

    pub fn set_match_on_detail(&mut self, enabled: bool) {
        self.match_on_detail = enabled;
    }

    /// Replaces every element; checked state starts from `picked`.
    pub fn set_elements(&mut self, items: Vec<T>) {
        self.elements = items
            .into_iter()
            .map(|item| ListElement {
                checked: item.picked(),
                item,
                hidden: false,
                highlights: Highlights::default(),
            })
            .collect();
        self.focused = None;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Hides elements not matching `query` and records match highlights.
    pub fn filter(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            for element in &mut self.elements {
                element.hidden = false;
                element.highlights = Highlights::default();
            }
            return;
        }

        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut buf = Vec::new();
        let (on_description, on_detail) = (self.match_on_description, self.match_on_detail);
        for element in &mut self.elements {
            let label = match_ranges(&pattern, &mut matcher, &mut buf, element.item.label());
            let description = if on_description {
                element
                    .item
                    .description()
                    .and_then(|text| match_ranges(&pattern, &mut matcher, &mut buf, text))
            } else {
                None
            };
            let detail = if on_detail {
                element
                    .item
                    .detail()
                    .and_then(|text| match_ranges(&pattern, &mut matcher, &mut buf, text))
            } else {
                None
            };
            element.hidden = label.is_none() && description.is_none() && detail.is_none();
            element.highlights = Highlights {
                label: label.unwrap_or_default(),
                description: description.unwrap_or_default(),
                detail: detail.unwrap_or_default(),
            };
        }

        if self
            .focused
            .is_some_and(|index| self.elements[index].hidden)
        {
            self.focused = None;
        }
    }

    fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| !element.hidden)
            .map(|(index, _)| index)
    }

    fn element_index_at_row(&self, row: usize) -> Option<usize> {
        self.visible_indices().nth(row)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices().count()
    }

    /// Moves focus; `Next`/`Previous` wrap around. Returns true if the
    /// focused element changed.
    pub fn focus(&mut self, target: ListFocus) -> bool {
        let visible: Vec<usize> = self.visible_indices().collect();
        let current = self
            .focused
            .and_then(|index| visible.iter().position(|candidate| *candidate == index));
        let next_row = match (target, current) {
            _ if visible.is_empty() => None,
            (ListFocus::None, _) => None,
            (ListFocus::First, _) | (ListFocus::Next, None) => Some(0),
            (ListFocus::Last, _) | (ListFocus::Previous, None) => Some(visible.len() - 1),
            (ListFocus::Next, Some(row)) => Some((row + 1) % visible.len()),
            (ListFocus::Previous, Some(row)) => Some((row + visible.len() - 1) % visible.len()),
        };
        let next = next_row.map(|row| visible[row]);
        let changed = next != self.focused;
        self.focused = next;
        changed
    }

    /// Focuses the element at visible `row`. Returns true if focus changed.
    pub fn focus_row(&mut self, row: usize) -> bool {
        let Some(index) = self.element_index_at_row(row) else {
            return false;
        };
        let changed = self.focused != Some(index);
        self.focused = Some(index);
        changed
    }

    pub fn focused_row(&self) -> Option<usize> {
        let focused = self.focused?;
        self.visible_indices().position(|index| index == focused)
    }

    pub fn focused_item(&self) -> Option<&T> {
        self.focused.map(|index| &self.elements[index].item)
    }

    pub fn item_at_row(&self, row: usize) -> Option<&T> {
        self.element_index_at_row(row)
            .map(|index| &self.elements[index].item)
    }

    /// Checked items in list order, hidden ones included.
    pub fn checked_items(&self) -> Vec<T> {
        self.elements
            .iter()
            .filter(|element| element.checked)
            .map(|element| element.item.clone())
            .collect()
    }

    pub fn checked_count(&self) -> usize {
        self.elements.iter().filter(|element| element.checked).count()
    }

    /// True when at least one element is visible and all visible elements
    /// are checked.
    pub fn all_visible_checked(&self) -> bool {
        let mut visible = self.elements.iter().filter(|element| !element.hidden);
        let mut any = false;
        let all = visible.all(|element| {
            any = true;
            element.checked
        });
        any && all
    }

    /// Sets the checked state of every visible element. Returns true if any
    /// element changed.
    pub fn set_all_visible_checked(&mut self, checked: bool) -> bool {
        let mut changed = false;
        for element in self.elements.iter_mut().filter(|element| !element.hidden) {
            if element.checked != checked {
                element.checked = checked;
                changed = true;
            }
        }
        changed
    }

    /// Returns true if the row exists and its state changed.
    pub fn set_checked_at_row(&mut self, row: usize, checked: bool) -> bool {
        let Some(index) = self.element_index_at_row(row) else {
            return false;
        };
        let element = &mut self.elements[index];
        let changed = element.checked != checked;
        element.checked = checked;
        changed
    }

    pub fn toggle_row(&mut self, row: usize) -> bool {
        let Some(index) = self.element_index_at_row(row) else {
            return false;
        };
        let element = &mut self.elements[index];
        element.checked = !element.checked;
        true
    }

    /// Toggles the focused element's checkbox.
    pub fn toggle_focused(&mut self) -> bool {
        let Some(index) = self.focused else {
            return false;
        };
        let element = &mut self.elements[index];
        element.checked = !element.checked;
        true
    }

    pub fn rows(&self) -> Vec<ListRow> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| !element.hidden)
            .map(|(index, element)| ListRow {
                label: element.item.label().to_string(),
                description: element.item.description().map(str::to_string),
                detail: element.item.detail().map(str::to_string),
                checked: element.checked,
                focused: self.focused == Some(index),
                highlights: element.highlights.clone(),
            })
            .collect()
    }
}

impl<T: QuickPickItem> Default for QuickPickList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Match positions of `pattern` in `text` as sorted, merged char ranges.
fn match_ranges(
    pattern: &Pattern,
    matcher: &mut Matcher,
    buf: &mut Vec<char>,
    text: &str,
) -> Option<Vec<Range<usize>>> {
    let mut indices = Vec::new();
    pattern.indices(Utf32Str::new(text, buf), matcher, &mut indices)?;
    indices.sort_unstable();
    indices.dedup();

    let mut ranges: Vec<Range<usize>> = Vec::new();
    for index in indices {
        let index = index as usize;
        match ranges.last_mut() {
            Some(last) if last.end == index => last.end += 1,
            _ => ranges.push(index..index + 1),
        }
    }
    Some(ranges)
}
