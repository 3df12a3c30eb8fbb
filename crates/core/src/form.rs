//! URL submission form state.
//!
//! The form knows nothing about HTTP: it validates input and hands the URL to
//! whatever [`Submit`] implementation it is given.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::validate::validate_url;
use crate::{ExtractionRecord, Result, ValidationError};

/// Message shown when the submission target rejects the URL.
pub const RETRY_MESSAGE: &str = "Failed to extract content. Please try again.";

/// Capability the form depends on: submit a URL, get a record back.
#[async_trait]
pub trait Submit: Send {
    async fn submit(&mut self, url: &str) -> Result<ExtractionRecord>;
}

/// Shared busy indicator.
///
/// Clones observe the same flag, so a UI task can watch a request that is in
/// flight while the form or session holds the `&mut` borrow.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }
}

/// Result of one call to [`SubmissionForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Validation failed; nothing was submitted.
    Rejected(ValidationError),
    /// The target produced a record (which may itself be a failure record).
    Submitted(ExtractionRecord),
    /// The target returned an error.
    Failed,
}

#[derive(Debug, Default, Clone)]
pub struct SubmissionForm {
    input: String,
    error: Option<String>,
    loading: LoadingFlag,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Inline error from the last submission, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// A handle that reads the loading state while a submission is running.
    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    /// Validates the current input and submits it to `target`.
    ///
    /// The input is cleared only when the target returns a record.
    pub async fn submit<S: Submit + ?Sized>(&mut self, target: &mut S) -> FormOutcome {
        self.error = None;

        if let Err(e) = validate_url(&self.input) {
            self.error = Some(e.to_string());
            return FormOutcome::Rejected(e);
        }

        let url = self.input.trim().to_string();
        self.loading.set(true);
        let result = target.submit(&url).await;
        self.loading.set(false);

        match result {
            Ok(record) => {
                self.input.clear();
                FormOutcome::Submitted(record)
            }
            Err(e) => {
                tracing::debug!(error = %e, "submission rejected");
                self.error = Some(RETRY_MESSAGE.to_string());
                FormOutcome::Failed
            }
        }
    }
}
