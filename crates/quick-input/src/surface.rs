//! Widget state owned by the active session, plus its effect outbox.
//!
//! Strategies mutate the surface while the controller lock is held. Anything
//! that must leave the lock (view updates, user callbacks, validations to
//! await) is queued as an [`Effect`] and dispatched after the lock is
//! released, in the order it was queued.

use futures::future::{BoxFuture, Shared};

use crate::error::QuickInputError;
use crate::input_box::InputBox;
use crate::item::QuickPickItem;
use crate::list::QuickPickList;
use crate::params::FocusCallback;
use crate::view::{FocusRegion, ViewUpdate};

/// A validator run that several waiters may await.
pub(crate) type SharedValidation =
    Shared<BoxFuture<'static, Result<Option<String>, QuickInputError>>>;

pub(crate) enum Effect<T> {
    View(ViewUpdate),
    Focused {
        callback: FocusCallback<T>,
        item: T,
    },
    /// Await `validation` and hand its outcome back to the session that
    /// requested it.
    Validate {
        generation: u64,
        requested: String,
        validation: SharedValidation,
    },
    Report(QuickInputError),
}

pub(crate) struct Surface<T> {
    pub(crate) list: QuickPickList<T>,
    pub(crate) input: InputBox,
    message: Option<String>,
    check_all: bool,
    count: usize,
    focus: FocusRegion,
    generation: u64,
    outbox: Vec<Effect<T>>,
}

impl<T: QuickPickItem> Surface<T> {
    pub(crate) fn new() -> Self {
        Self {
            list: QuickPickList::new(),
            input: InputBox::default(),
            message: None,
            check_all: false,
            count: 0,
            focus: FocusRegion::Input,
            generation: 0,
            outbox: Vec::new(),
        }
    }

    /// Resets the widget state for the session with `generation`.
    pub(crate) fn begin(&mut self, generation: u64) {
        self.list = QuickPickList::new();
        self.input = InputBox::default();
        self.message = None;
        self.check_all = false;
        self.count = 0;
        self.focus = FocusRegion::Input;
        self.generation = generation;
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn focus(&self) -> FocusRegion {
        self.focus
    }

    pub(crate) fn push(&mut self, update: ViewUpdate) {
        self.outbox.push(Effect::View(update));
    }

    pub(crate) fn emit(&mut self, effect: Effect<T>) {
        self.outbox.push(effect);
    }

    pub(crate) fn publish_input(&mut self) {
        let input = self.input.clone();
        self.push(ViewUpdate::Input(input));
    }

    pub(crate) fn publish_list(&mut self) {
        let rows = self.list.rows();
        self.push(ViewUpdate::List(rows));
    }

    pub(crate) fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Updates the message region; nothing is pushed when it is unchanged.
    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.message.as_deref() == Some(message.as_str()) {
            return;
        }
        self.message = Some(message.clone());
        self.push(ViewUpdate::Message(message));
    }

    /// Pushes check-all and count when they changed.
    pub(crate) fn sync_checked(&mut self) {
        let check_all = self.list.all_visible_checked();
        if check_all != self.check_all {
            self.check_all = check_all;
            self.push(ViewUpdate::CheckAll(check_all));
        }
        let count = self.list.checked_count();
        if count != self.count {
            self.count = count;
            self.push(ViewUpdate::Count(count));
        }
    }

    pub(crate) fn publish_checked(&mut self) {
        self.check_all = self.list.all_visible_checked();
        self.count = self.list.checked_count();
        self.push(ViewUpdate::CheckAll(self.check_all));
        self.push(ViewUpdate::Count(self.count));
    }

    pub(crate) fn move_focus(&mut self, region: FocusRegion) {
        if self.focus != region {
            self.focus = region;
            self.push(ViewUpdate::Focus(region));
        }
    }

    pub(crate) fn publish_focus(&mut self) {
        self.push(ViewUpdate::Focus(self.focus));
    }

    pub(crate) fn take_effects(&mut self) -> Vec<Effect<T>> {
        std::mem::take(&mut self.outbox)
    }
}
