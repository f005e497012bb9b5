//! Per-mode behavior behind one interface.
//!
//! A strategy owns the session's result settler and decides how user events
//! change the surface and when the session resolves. The controller owns
//! everything shared between modes: generations, teardown, busy indication,
//! debouncing and effect dispatch.

mod pick_many;
mod pick_one;
mod text_input;

pub(crate) use pick_many::PickManyStrategy;
pub(crate) use pick_one::PickOneStrategy;
pub(crate) use text_input::TextInputStrategy;

use futures::future::BoxFuture;

use crate::error::QuickInputError;
use crate::item::QuickPickItem;
use crate::keys::{KeyEvent, QuickNavigateConfiguration};
use crate::list::ListFocus;
use crate::params::{FocusCallback, InputKind};
use crate::surface::{Effect, SharedValidation, Surface};
use crate::view::Regions;

pub(crate) type ItemsLoader<T> = BoxFuture<'static, anyhow::Result<Vec<T>>>;

/// A confirmation waiting on a validator run.
pub(crate) struct PendingConfirm {
    pub(crate) requested: String,
    pub(crate) validation: SharedValidation,
}

/// What a resolution attempt did.
pub(crate) enum ResolveOutcome {
    /// The promise was settled; the session must be torn down.
    Settled,
    /// Confirmation refused; the session stays open.
    Rejected,
    /// Confirmation depends on a validator run.
    Deferred(PendingConfirm),
    Failed(QuickInputError),
}

pub(crate) trait InputStrategy<T: QuickPickItem>: Send {
    fn kind(&self) -> InputKind;

    fn regions(&self) -> Regions;

    /// Pushes the initial widget state. Returns the candidate loader when
    /// candidates are not available yet.
    fn attach(&mut self, surface: &mut Surface<T>) -> Option<ItemsLoader<T>>;

    fn on_items_loaded(&mut self, _surface: &mut Surface<T>, _items: Vec<T>) {}

    /// Called after `surface.input.value` changed.
    fn on_value_changed(&mut self, _surface: &mut Surface<T>) {}

    /// Returns true if the key was consumed.
    fn on_key_down(&mut self, _surface: &mut Surface<T>, _key: &KeyEvent) -> bool {
        false
    }

    /// Returns true if the selection confirms the session.
    fn select_row(&mut self, _surface: &mut Surface<T>, _row: usize) -> bool {
        false
    }

    fn set_item_checked(&mut self, _surface: &mut Surface<T>, _row: usize, _checked: bool) {}

    fn set_check_all(&mut self, _surface: &mut Surface<T>, _checked: bool) {}

    fn toggle(&mut self, _surface: &mut Surface<T>) {}

    fn navigate(&mut self, _surface: &mut Surface<T>, _next: bool) {}

    fn configure_quick_navigate(&mut self, _config: QuickNavigateConfiguration) {}

    fn confirms_on_key_up(&self, _key: &KeyEvent) -> bool {
        false
    }

    /// Whether value changes should be debounced into validations.
    fn wants_validation(&self) -> bool {
        false
    }

    fn on_debounced_value(&mut self, _surface: &mut Surface<T>, _value: &str) {}

    /// Applies a finished validator run. Fails with `Canceled` when the value
    /// changed since the run was requested.
    fn apply_validation(
        &mut self,
        _surface: &mut Surface<T>,
        _requested: &str,
        _outcome: Result<Option<String>, QuickInputError>,
    ) -> Result<(), QuickInputError> {
        Ok(())
    }

    fn confirm(&mut self, surface: &mut Surface<T>) -> ResolveOutcome;

    fn complete_confirm(
        &mut self,
        _surface: &mut Surface<T>,
        _requested: String,
        _outcome: Result<Option<String>, QuickInputError>,
    ) -> ResolveOutcome {
        ResolveOutcome::Rejected
    }

    /// Settles with no result.
    fn dismiss(&mut self);

    fn fail(&mut self, error: QuickInputError);
}

/// Moves list focus and reports the newly focused item.
pub(super) fn focus_list<T: QuickPickItem>(
    surface: &mut Surface<T>,
    target: ListFocus,
    on_did_focus: Option<&FocusCallback<T>>,
) {
    if !surface.list.focus(target) {
        return;
    }
    report_focus(surface, on_did_focus);
}

pub(super) fn report_focus<T: QuickPickItem>(
    surface: &mut Surface<T>,
    on_did_focus: Option<&FocusCallback<T>>,
) {
    let (Some(callback), Some(item)) = (on_did_focus, surface.list.focused_item()) else {
        return;
    };
    let effect = Effect::Focused {
        callback: callback.clone(),
        item: item.clone(),
    };
    surface.emit(effect);
}
