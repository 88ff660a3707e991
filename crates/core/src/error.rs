use std::time::Duration;

/// Errors raised while building the argument list for a trigger handler.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("No service registered for type {type_name}")]
    Unresolved { type_name: &'static str },

    #[error("Payload could not be decoded: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Bound argument for role {found} does not match parameter role {expected}")]
    RoleMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Argument list ended before parameter {position}")]
    MissingArgument { position: usize },
}

/// Failure outcome of a single trigger invocation.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Binding failed: {0}")]
    Binding(#[from] BindingError),

    #[error("Handler did not complete within {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("Handler failed: {0:#}")]
    HandlerFault(anyhow::Error),
}

impl DispatchError {
    /// Short machine-readable label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Binding(_) => "binding",
            DispatchError::Timeout { .. } => "timeout",
            DispatchError::HandlerFault(_) => "handler_fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_message_names_the_type() {
        let err = BindingError::Unresolved {
            type_name: "my_app::Mailer",
        };
        assert_eq!(err.to_string(), "No service registered for type my_app::Mailer");
    }

    #[test]
    fn timeout_message_reports_milliseconds() {
        let err = DispatchError::Timeout {
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "Handler did not complete within 2000ms");
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn handler_fault_keeps_context_chain() {
        let err = DispatchError::HandlerFault(
            anyhow::anyhow!("connection refused").context("sending report"),
        );
        assert_eq!(
            err.to_string(),
            "Handler failed: sending report: connection refused"
        );
    }

    #[test]
    fn binding_converts_into_dispatch_error() {
        let err: DispatchError = BindingError::MissingArgument { position: 2 }.into();
        assert_eq!(err.kind(), "binding");
    }
}
