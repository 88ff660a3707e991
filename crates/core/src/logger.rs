//! Per-invocation logger handed to trigger handlers that ask for one.

use std::fmt::Display;

use tracing::Span;

use crate::trigger::JobName;

/// Logger scoped to a single job invocation.
///
/// Events are emitted through `tracing` as children of a `job_trigger` span
/// that carries the job name, so handler output lines up with the
/// dispatcher's own events.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_name: JobName,
    span: Span,
}

impl JobLogger {
    pub fn new(job_name: JobName) -> Self {
        let span = tracing::info_span!("job_trigger", job_name = %job_name);
        Self { job_name, span }
    }

    pub fn job_name(&self) -> &JobName {
        &self.job_name
    }

    /// The span handler code can enter or instrument futures with.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(parent: &self.span, job_name = %self.job_name, "{message}");
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(parent: &self.span, job_name = %self.job_name, "{message}");
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(parent: &self.span, job_name = %self.job_name, "{message}");
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(parent: &self.span, job_name = %self.job_name, "{message}");
    }
}
