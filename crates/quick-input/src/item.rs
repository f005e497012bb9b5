//! Pickable items.

use smol_str::SmolStr;

/// Something that can be shown as a row of a quick pick list.
pub trait QuickPickItem: Clone + Send + Sync + 'static {
    fn label(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn detail(&self) -> Option<&str> {
        None
    }

    /// Initial checked state in pick-many mode.
    fn picked(&self) -> bool {
        false
    }
}

/// Plain quick pick item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PickItem {
    pub label: SmolStr,
    pub description: Option<SmolStr>,
    pub detail: Option<SmolStr>,
    pub picked: bool,
}

impl PickItem {
    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<SmolStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<SmolStr>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_picked(mut self, picked: bool) -> Self {
        self.picked = picked;
        self
    }
}

impl QuickPickItem for PickItem {
    fn label(&self) -> &str {
        &self.label
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    fn picked(&self) -> bool {
        self.picked
    }
}

impl From<&str> for PickItem {
    fn from(label: &str) -> Self {
        PickItem::new(label)
    }
}
