use tracing::trace;

use super::{InputStrategy, ItemsLoader, ResolveOutcome};
use crate::deferred::Settler;
use crate::error::QuickInputError;
use crate::item::QuickPickItem;
use crate::keys::{KeyCode, KeyEvent};
use crate::list::ListFocus;
use crate::params::{InputKind, ItemsSource, PickManyOptions};
use crate::surface::Surface;
use crate::view::{FocusRegion, Regions};

pub(crate) struct PickManyStrategy<T> {
    settler: Settler<Vec<T>>,
    items: Option<ItemsSource<T>>,
    placeholder: Option<String>,
    message: Option<String>,
    match_on_description: bool,
    match_on_detail: bool,
}

impl<T: QuickPickItem> PickManyStrategy<T> {
    pub(crate) fn new(options: PickManyOptions<T>, settler: Settler<Vec<T>>) -> Self {
        Self {
            settler,
            items: Some(options.items),
            placeholder: options.placeholder,
            message: options.message,
            match_on_description: options.match_on_description,
            match_on_detail: options.match_on_detail,
        }
    }

    fn refilter(surface: &mut Surface<T>) {
        let value = surface.input.value.clone();
        surface.list.filter(&value);
        surface.list.focus(ListFocus::First);
        surface.sync_checked();
        surface.publish_list();
    }

    fn checked_changed(surface: &mut Surface<T>) {
        surface.sync_checked();
        surface.publish_list();
    }

    /// Arrow keys move keyboard focus into the list; once there they move
    /// the focused row.
    fn step(surface: &mut Surface<T>, down: bool) {
        let target = match (surface.focus(), down) {
            (FocusRegion::Input, true) => ListFocus::First,
            (FocusRegion::Input, false) => ListFocus::Last,
            (FocusRegion::List, true) => ListFocus::Next,
            (FocusRegion::List, false) => ListFocus::Previous,
        };
        surface.move_focus(FocusRegion::List);
        surface.list.focus(target);
        surface.publish_list();
    }
}

impl<T: QuickPickItem> InputStrategy<T> for PickManyStrategy<T> {
    fn kind(&self) -> InputKind {
        InputKind::PickMany
    }

    fn regions(&self) -> Regions {
        Regions {
            check_all: true,
            input_box: true,
            count: true,
            ok: true,
            list: true,
            message: self.message.is_some(),
        }
    }

    fn attach(&mut self, surface: &mut Surface<T>) -> Option<ItemsLoader<T>> {
        surface.list.set_match_on_description(self.match_on_description);
        surface.list.set_match_on_detail(self.match_on_detail);
        surface.input.placeholder = self.placeholder.clone();
        surface.publish_input();
        if let Some(message) = &self.message {
            surface.set_message(message.clone());
        }
        surface.publish_list();
        surface.publish_checked();
        match self.items.take()? {
            ItemsSource::Ready(items) => {
                self.on_items_loaded(surface, items);
                None
            }
            ItemsSource::Pending(loader) => Some(loader),
        }
    }

    fn on_items_loaded(&mut self, surface: &mut Surface<T>, items: Vec<T>) {
        trace!(count = items.len(), "pick many: candidates delivered");
        surface.list.set_elements(items);
        Self::refilter(surface);
    }

    fn on_value_changed(&mut self, surface: &mut Surface<T>) {
        Self::refilter(surface);
    }

    fn on_key_down(&mut self, surface: &mut Surface<T>, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Down => Self::step(surface, true),
            KeyCode::Up => Self::step(surface, false),
            KeyCode::Space if surface.focus() == FocusRegion::List => self.toggle(surface),
            _ => return false,
        }
        true
    }

    fn select_row(&mut self, surface: &mut Surface<T>, row: usize) -> bool {
        if surface.list.toggle_row(row) {
            surface.list.focus_row(row);
            Self::checked_changed(surface);
        }
        false
    }

    fn set_item_checked(&mut self, surface: &mut Surface<T>, row: usize, checked: bool) {
        if surface.list.set_checked_at_row(row, checked) {
            Self::checked_changed(surface);
        }
    }

    fn set_check_all(&mut self, surface: &mut Surface<T>, checked: bool) {
        surface.list.set_all_visible_checked(checked);
        Self::checked_changed(surface);
    }

    fn toggle(&mut self, surface: &mut Surface<T>) {
        if surface.focus() == FocusRegion::List && surface.list.toggle_focused() {
            Self::checked_changed(surface);
        }
    }

    fn navigate(&mut self, surface: &mut Surface<T>, next: bool) {
        Self::step(surface, next);
    }

    fn confirm(&mut self, surface: &mut Surface<T>) -> ResolveOutcome {
        self.settler.resolve(Some(surface.list.checked_items()));
        ResolveOutcome::Settled
    }

    fn dismiss(&mut self) {
        self.settler.resolve(None);
    }

    fn fail(&mut self, error: QuickInputError) {
        self.settler.reject(error);
    }
}
