use futures::FutureExt;
use tracing::{debug, trace};

use super::{InputStrategy, ItemsLoader, PendingConfirm, ResolveOutcome};
use crate::deferred::Settler;
use crate::error::QuickInputError;
use crate::input_box::Severity;
use crate::item::QuickPickItem;
use crate::params::{InputKind, TextInputOptions, Validator};
use crate::surface::{Effect, SharedValidation, Surface};
use crate::view::Regions;

const DEFAULT_INPUT_MESSAGE: &str = "Press 'Enter' to confirm your input or 'Escape' to cancel";

fn default_message(prompt: Option<&str>) -> String {
    match prompt {
        Some(prompt) if !prompt.is_empty() => {
            format!("{prompt} (Press 'Enter' to confirm or 'Escape' to cancel)")
        }
        _ => DEFAULT_INPUT_MESSAGE.to_string(),
    }
}

pub(crate) struct TextInputStrategy {
    settler: Settler<String>,
    options: TextInputOptions,
    default_message: String,
    /// Value of the most recent validator run that is still pending or was
    /// shown.
    validation_value: Option<String>,
    validation: Option<SharedValidation>,
}

impl TextInputStrategy {
    pub(crate) fn new(options: TextInputOptions, settler: Settler<String>) -> Self {
        Self {
            settler,
            default_message: default_message(options.prompt.as_deref()),
            options,
            validation_value: None,
            validation: None,
        }
    }

    fn validator(&self) -> Option<&Validator> {
        self.options.validate_input.as_ref()
    }

    /// Starts a validator run for `value` and queues its delivery.
    fn did_change<T: QuickPickItem>(
        &mut self,
        surface: &mut Surface<T>,
        value: String,
    ) -> Option<SharedValidation> {
        let validator = self.validator()?;
        trace!(value = %value, "text input: validating");
        let validation: SharedValidation = validator(&value)
            .map(|outcome| outcome.map_err(QuickInputError::unexpected))
            .boxed()
            .shared();
        self.validation_value = Some(value.clone());
        self.validation = Some(validation.clone());
        surface.emit(Effect::Validate {
            generation: surface.generation(),
            requested: value,
            validation: validation.clone(),
        });
        Some(validation)
    }

    fn show_validation(&self, surface: &mut Surface<impl QuickPickItem>, message: Option<String>) {
        let (message, severity) = match message {
            Some(message) if !message.is_empty() => (message, Severity::Error),
            _ => (self.default_message.clone(), Severity::Ignore),
        };
        surface.set_message(message);
        if surface.input.severity != severity {
            surface.input.severity = severity;
            surface.publish_input();
        }
    }
}

impl<T: QuickPickItem> InputStrategy<T> for TextInputStrategy {
    fn kind(&self) -> InputKind {
        InputKind::TextInput
    }

    fn regions(&self) -> Regions {
        Regions {
            input_box: true,
            message: true,
            ..Regions::default()
        }
    }

    fn attach(&mut self, surface: &mut Surface<T>) -> Option<ItemsLoader<T>> {
        let input = &mut surface.input;
        input.set_value(self.options.value.clone().unwrap_or_default());
        if let Some(selection) = self.options.value_selection.clone() {
            input.select(selection);
        }
        input.placeholder = self.options.placeholder.clone();
        input.password = self.options.password;
        surface.publish_input();
        surface.set_message(self.default_message.clone());
        let value = surface.input.value.clone();
        self.did_change(surface, value);
        None
    }

    fn wants_validation(&self) -> bool {
        self.validator().is_some()
    }

    fn on_debounced_value(&mut self, surface: &mut Surface<T>, value: &str) {
        if surface.input.value != value {
            return;
        }
        if self.validation_value.as_deref() == Some(value) {
            return;
        }
        self.did_change(surface, value.to_string());
    }

    fn apply_validation(
        &mut self,
        surface: &mut Surface<T>,
        requested: &str,
        outcome: Result<Option<String>, QuickInputError>,
    ) -> Result<(), QuickInputError> {
        if surface.input.value != requested {
            if self.validation_value.as_deref() == Some(requested) {
                // Discarded without being shown; the value must be checked
                // again if it comes back.
                self.validation_value = None;
                self.validation = None;
            }
            return Err(QuickInputError::Canceled);
        }
        let message = outcome?;
        self.show_validation(surface, message);
        Ok(())
    }

    fn confirm(&mut self, surface: &mut Surface<T>) -> ResolveOutcome {
        let value = surface.input.value.clone();
        if self.validator().is_none() {
            self.settler.resolve(Some(value));
            return ResolveOutcome::Settled;
        }
        let current = match &self.validation {
            Some(validation) if self.validation_value.as_deref() == Some(value.as_str()) => {
                Some(validation.clone())
            }
            _ => None,
        };
        let validation = match current {
            Some(validation) => validation,
            None => match self.did_change(surface, value.clone()) {
                Some(validation) => validation,
                None => return ResolveOutcome::Rejected,
            },
        };
        ResolveOutcome::Deferred(PendingConfirm {
            requested: value,
            validation,
        })
    }

    fn complete_confirm(
        &mut self,
        surface: &mut Surface<T>,
        requested: String,
        outcome: Result<Option<String>, QuickInputError>,
    ) -> ResolveOutcome {
        if self.settler.is_settled() {
            return ResolveOutcome::Settled;
        }
        let message = match outcome {
            Ok(message) => message,
            Err(err) if err.is_canceled() => return ResolveOutcome::Rejected,
            Err(err) => return ResolveOutcome::Failed(err),
        };
        if surface.input.value != requested {
            debug!("text input: value changed while confirming");
            return ResolveOutcome::Rejected;
        }
        if message.as_deref().is_some_and(|message| !message.is_empty()) {
            self.show_validation(surface, message);
            return ResolveOutcome::Rejected;
        }
        self.settler.resolve(Some(requested));
        ResolveOutcome::Settled
    }

    fn dismiss(&mut self) {
        self.settler.resolve(None);
    }

    fn fail(&mut self, error: QuickInputError) {
        self.settler.reject(error);
    }
}
