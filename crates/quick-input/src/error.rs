//! Quick input errors and the unexpected-error reporting hook.

use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::error;

/// Errors produced while running a quick input session.
#[derive(Debug, Clone, Error)]
pub enum QuickInputError {
    /// A resolution attempt was short-circuited (failed validation on confirm,
    /// superseded validation delivery). Never surfaces to callers.
    #[error("canceled")]
    Canceled,

    /// A candidate loader or validator failed.
    #[error("unexpected quick input failure: {0}")]
    Unexpected(Arc<anyhow::Error>),

    /// An input mode name did not match any known mode.
    #[error("unknown input mode '{0}'")]
    UnknownKind(SmolStr),

    /// The settling side of a result promise was dropped without settling.
    #[error("result promise dropped before settling")]
    Dropped,
}

impl QuickInputError {
    pub fn unexpected(err: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected(Arc::new(err.into()))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// Receives failures that are not attributable to the user (loader and
/// validator errors).
pub trait UnexpectedErrorReporter: Send + Sync {
    fn report(&self, error: &QuickInputError);
}

/// Default reporter: logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl UnexpectedErrorReporter for LogReporter {
    fn report(&self, error: &QuickInputError) {
        error!("quick input: {error}");
    }
}

impl<F> UnexpectedErrorReporter for F
where
    F: Fn(&QuickInputError) + Send + Sync,
{
    fn report(&self, error: &QuickInputError) {
        self(error);
    }
}
