//! `quick-input` - modal quick input controller for IDE shells.
//!
//! A [`QuickInputService`] presents one of three input modes (pick one item,
//! pick many items, free text) in a shared widget and resolves each session
//! to a typed [`ResultPromise`]. Rendering belongs to the host, which
//! receives [`ViewUpdate`]s through a [`QuickInputView`].

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

/// Cooperative cancellation tokens.
pub mod cancellation;
/// Controller configuration.
pub mod config;
mod controller;
/// Trailing-edge debouncing.
pub mod debounce;
/// Exactly-once result promises and cancellable timeouts.
pub mod deferred;
/// Errors and error reporting.
pub mod error;
/// Emitters, subscriptions and disposables.
pub mod event;
/// Input box state.
pub mod input_box;
/// Pickable items.
pub mod item;
/// Key events and quick-navigate keybindings.
pub mod keys;
/// Filterable pick list.
pub mod list;
/// Session parameters.
pub mod params;
mod strategy;
mod surface;
/// Host view contract.
pub mod view;

pub use cancellation::{CancellationToken, CancellationTokenSource};
pub use config::QuickInputConfig;
pub use controller::QuickInputService;
pub use deferred::{ResultPromise, Settlement};
pub use error::{LogReporter, QuickInputError, UnexpectedErrorReporter};
pub use item::{PickItem, QuickPickItem};
pub use keys::{KeyCode, KeyEvent, Keybinding, Modifiers, QuickNavigateConfiguration};
pub use params::{
    InputKind, InputParameters, ItemsSource, PickManyOptions, PickOneOptions, QuickInputValue,
    TextInputOptions, Validator,
};
pub use view::{Dimension, QuickInputView, RecordingView, ViewUpdate};
