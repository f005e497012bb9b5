use tracing::trace;

use super::{focus_list, InputStrategy, ItemsLoader, ResolveOutcome};
use crate::deferred::Settler;
use crate::error::QuickInputError;
use crate::item::QuickPickItem;
use crate::keys::{KeyCode, KeyEvent, QuickNavigateConfiguration};
use crate::list::ListFocus;
use crate::params::{FocusCallback, InputKind, ItemsSource, PickOneOptions};
use crate::surface::Surface;
use crate::view::Regions;

pub(crate) struct PickOneStrategy<T> {
    settler: Settler<T>,
    items: Option<ItemsSource<T>>,
    placeholder: Option<String>,
    match_on_description: bool,
    match_on_detail: bool,
    on_did_focus: Option<FocusCallback<T>>,
    quick_navigate: Option<QuickNavigateConfiguration>,
}

impl<T: QuickPickItem> PickOneStrategy<T> {
    pub(crate) fn new(options: PickOneOptions<T>, settler: Settler<T>) -> Self {
        Self {
            settler,
            items: Some(options.items),
            placeholder: options.placeholder,
            match_on_description: options.match_on_description,
            match_on_detail: options.match_on_detail,
            on_did_focus: options.on_did_focus,
            quick_navigate: None,
        }
    }

    fn refilter(&self, surface: &mut Surface<T>) {
        let value = surface.input.value.clone();
        surface.list.filter(&value);
        focus_list(surface, ListFocus::First, self.on_did_focus.as_ref());
        surface.publish_list();
    }

    fn move_focus(&self, surface: &mut Surface<T>, target: ListFocus) {
        focus_list(surface, target, self.on_did_focus.as_ref());
        surface.publish_list();
    }
}

impl<T: QuickPickItem> InputStrategy<T> for PickOneStrategy<T> {
    fn kind(&self) -> InputKind {
        InputKind::PickOne
    }

    fn regions(&self) -> Regions {
        Regions {
            input_box: true,
            list: true,
            ..Regions::default()
        }
    }

    fn attach(&mut self, surface: &mut Surface<T>) -> Option<ItemsLoader<T>> {
        surface.list.set_match_on_description(self.match_on_description);
        surface.list.set_match_on_detail(self.match_on_detail);
        surface.input.placeholder = self.placeholder.clone();
        surface.publish_input();
        surface.publish_list();
        match self.items.take()? {
            ItemsSource::Ready(items) => {
                self.on_items_loaded(surface, items);
                None
            }
            ItemsSource::Pending(loader) => Some(loader),
        }
    }

    fn on_items_loaded(&mut self, surface: &mut Surface<T>, items: Vec<T>) {
        trace!(count = items.len(), "pick one: candidates delivered");
        surface.list.set_elements(items);
        self.refilter(surface);
    }

    fn on_value_changed(&mut self, surface: &mut Surface<T>) {
        self.refilter(surface);
    }

    fn on_key_down(&mut self, surface: &mut Surface<T>, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Down => self.move_focus(surface, ListFocus::Next),
            KeyCode::Up => self.move_focus(surface, ListFocus::Previous),
            _ => return false,
        }
        true
    }

    fn select_row(&mut self, surface: &mut Surface<T>, row: usize) -> bool {
        if surface.list.item_at_row(row).is_none() {
            return false;
        }
        if surface.list.focus_row(row) {
            super::report_focus(surface, self.on_did_focus.as_ref());
            surface.publish_list();
        }
        true
    }

    fn navigate(&mut self, surface: &mut Surface<T>, next: bool) {
        let target = if next {
            ListFocus::Next
        } else {
            ListFocus::Previous
        };
        self.move_focus(surface, target);
    }

    fn configure_quick_navigate(&mut self, config: QuickNavigateConfiguration) {
        if self.quick_navigate.is_some() {
            trace!("pick one: quick navigate already configured");
            return;
        }
        self.quick_navigate = Some(config);
    }

    fn confirms_on_key_up(&self, key: &KeyEvent) -> bool {
        self.quick_navigate
            .as_ref()
            .is_some_and(|config| config.is_release_trigger(key))
    }

    fn confirm(&mut self, surface: &mut Surface<T>) -> ResolveOutcome {
        self.settler.resolve(surface.list.focused_item().cloned());
        ResolveOutcome::Settled
    }

    fn dismiss(&mut self) {
        self.settler.resolve(None);
    }

    fn fail(&mut self, error: QuickInputError) {
        self.settler.reject(error);
    }
}
