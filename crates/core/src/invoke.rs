//! Timeout-bounded handler execution.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;
use crate::handler::HandlerResult;

/// Normalize a configured timeout: zero means no bound.
pub fn effective_timeout(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|t| !t.is_zero())
}

/// Run a started handler future as its own task, optionally bounded by
/// `timeout`.
///
/// On timeout `cancel` is triggered and the task is left to observe it; it is
/// not aborted. A panic inside the handler is reported as a handler fault.
pub async fn invoke(
    future: BoxFuture<'static, HandlerResult>,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<(), DispatchError> {
    let mut task = tokio::spawn(future);

    let joined = match effective_timeout(timeout) {
        None => (&mut task).await,
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                cancel.cancel();
                return Err(DispatchError::Timeout { timeout: limit });
            }
        },
    };

    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(DispatchError::HandlerFault(err)),
        Err(join_err) if join_err.is_panic() => {
            let message = panic_message(join_err.into_panic());
            Err(DispatchError::HandlerFault(anyhow::anyhow!(
                "handler panicked: {message}"
            )))
        }
        Err(join_err) => Err(DispatchError::HandlerFault(anyhow::anyhow!(
            "handler task ended unexpectedly: {join_err}"
        ))),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
