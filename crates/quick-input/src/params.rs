//! Session parameters for each input mode.

use std::fmt;
use std::future::Future;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

use crate::error::QuickInputError;
use crate::item::QuickPickItem;

/// Candidate list supplier.
pub enum ItemsSource<T> {
    Ready(Vec<T>),
    Pending(BoxFuture<'static, anyhow::Result<Vec<T>>>),
}

impl<T> ItemsSource<T> {
    pub fn from_future(
        future: impl Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
    ) -> Self {
        ItemsSource::Pending(future.boxed())
    }
}

impl<T> From<Vec<T>> for ItemsSource<T> {
    fn from(items: Vec<T>) -> Self {
        ItemsSource::Ready(items)
    }
}

impl<T> Default for ItemsSource<T> {
    fn default() -> Self {
        ItemsSource::Ready(Vec::new())
    }
}

impl<T> fmt::Debug for ItemsSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemsSource::Ready(items) => write!(f, "Ready({} items)", items.len()),
            ItemsSource::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Invoked whenever another item gains list focus.
pub type FocusCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Returns an error message for invalid input, `None` when the value is
/// acceptable.
pub type Validator =
    Arc<dyn Fn(&str) -> BoxFuture<'static, anyhow::Result<Option<String>>> + Send + Sync>;

pub struct PickOneOptions<T> {
    pub items: ItemsSource<T>,
    pub placeholder: Option<String>,
    pub match_on_description: bool,
    pub match_on_detail: bool,
    pub ignore_focus_lost: bool,
    pub on_did_focus: Option<FocusCallback<T>>,
}

impl<T: QuickPickItem> PickOneOptions<T> {
    pub fn new(items: impl Into<ItemsSource<T>>) -> Self {
        Self {
            items: items.into(),
            placeholder: None,
            match_on_description: false,
            match_on_detail: false,
            ignore_focus_lost: false,
            on_did_focus: None,
        }
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn match_on_description(mut self, enabled: bool) -> Self {
        self.match_on_description = enabled;
        self
    }

    #[must_use]
    pub fn match_on_detail(mut self, enabled: bool) -> Self {
        self.match_on_detail = enabled;
        self
    }

    #[must_use]
    pub fn ignore_focus_lost(mut self, enabled: bool) -> Self {
        self.ignore_focus_lost = enabled;
        self
    }

    #[must_use]
    pub fn on_did_focus(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_did_focus = Some(Arc::new(callback));
        self
    }
}

pub struct PickManyOptions<T> {
    pub items: ItemsSource<T>,
    pub placeholder: Option<String>,
    /// Shown below the input when set.
    pub message: Option<String>,
    pub match_on_description: bool,
    pub match_on_detail: bool,
    pub ignore_focus_lost: bool,
}

impl<T: QuickPickItem> PickManyOptions<T> {
    pub fn new(items: impl Into<ItemsSource<T>>) -> Self {
        Self {
            items: items.into(),
            placeholder: None,
            message: None,
            match_on_description: false,
            match_on_detail: false,
            ignore_focus_lost: false,
        }
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn match_on_description(mut self, enabled: bool) -> Self {
        self.match_on_description = enabled;
        self
    }

    #[must_use]
    pub fn match_on_detail(mut self, enabled: bool) -> Self {
        self.match_on_detail = enabled;
        self
    }

    #[must_use]
    pub fn ignore_focus_lost(mut self, enabled: bool) -> Self {
        self.ignore_focus_lost = enabled;
        self
    }
}

#[derive(Default)]
pub struct TextInputOptions {
    pub value: Option<String>,
    /// Char range of `value` selected when the input is shown.
    pub value_selection: Option<Range<usize>>,
    pub prompt: Option<String>,
    pub placeholder: Option<String>,
    pub password: bool,
    pub ignore_focus_lost: bool,
    pub validate_input: Option<Validator>,
}

impl TextInputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn value_selection(mut self, selection: Range<usize>) -> Self {
        self.value_selection = Some(selection);
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: bool) -> Self {
        self.password = password;
        self
    }

    #[must_use]
    pub fn ignore_focus_lost(mut self, enabled: bool) -> Self {
        self.ignore_focus_lost = enabled;
        self
    }

    #[must_use]
    pub fn validate_input(mut self, validator: Validator) -> Self {
        self.validate_input = Some(validator);
        self
    }

    /// Synchronous validator.
    #[must_use]
    pub fn validate_with(
        self,
        validate: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validate_input(Arc::new(move |value: &str| {
            let outcome = validate(value);
            async move { Ok::<_, anyhow::Error>(outcome) }.boxed()
        }))
    }

    /// Asynchronous validator; the future receives an owned copy of the
    /// value.
    #[must_use]
    pub fn validate_async<F, Fut>(self, validate: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
    {
        self.validate_input(Arc::new(move |value: &str| {
            validate(value.to_string()).boxed()
        }))
    }
}

impl fmt::Debug for TextInputOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInputOptions")
            .field("value", &self.value)
            .field("value_selection", &self.value_selection)
            .field("prompt", &self.prompt)
            .field("placeholder", &self.placeholder)
            .field("password", &self.password)
            .field("ignore_focus_lost", &self.ignore_focus_lost)
            .field("validate_input", &self.validate_input.is_some())
            .finish()
    }
}

/// Parameters of one quick input session.
pub enum InputParameters<T> {
    PickOne(PickOneOptions<T>),
    PickMany(PickManyOptions<T>),
    TextInput(TextInputOptions),
}

impl<T> InputParameters<T> {
    pub fn kind(&self) -> InputKind {
        match self {
            InputParameters::PickOne(_) => InputKind::PickOne,
            InputParameters::PickMany(_) => InputKind::PickMany,
            InputParameters::TextInput(_) => InputKind::TextInput,
        }
    }

    pub fn ignore_focus_lost(&self) -> bool {
        match self {
            InputParameters::PickOne(options) => options.ignore_focus_lost,
            InputParameters::PickMany(options) => options.ignore_focus_lost,
            InputParameters::TextInput(options) => options.ignore_focus_lost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputKind {
    #[serde(rename = "pickOne")]
    PickOne,
    #[serde(rename = "pickMany")]
    PickMany,
    #[serde(rename = "textInput")]
    TextInput,
}

impl InputKind {
    pub const ALL: [InputKind; 3] = [InputKind::PickOne, InputKind::PickMany, InputKind::TextInput];

    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::PickOne => "pickOne",
            InputKind::PickMany => "pickMany",
            InputKind::TextInput => "textInput",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = QuickInputError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        InputKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == text)
            .ok_or_else(|| QuickInputError::UnknownKind(text.into()))
    }
}

/// Result of [`crate::QuickInputService::show`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickInputValue<T> {
    One(T),
    Many(Vec<T>),
    Text(String),
}
