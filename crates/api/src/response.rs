//! Mapping of invocation outcomes to HTTP responses.
//!
//! | Outcome                    | Response                                  |
//! |----------------------------|-------------------------------------------|
//! | success                    | `200 OK`, empty body                      |
//! | timeout                    | aborted response (or `504`, see below)    |
//! | binding or handler failure | `500` with the sanitized JSON error body  |

use std::fmt;
use std::io;
use std::str::FromStr;

use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobhook_core::dispatcher::InvocationOutcome;
use jobhook_core::error::DispatchError;

use crate::error::AppError;

/// How a timed-out invocation is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutResponse {
    /// Fail the response body so the transport aborts the request.
    #[default]
    Abort,
    /// Send a regular `504` JSON error.
    Status,
}

impl TimeoutResponse {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeoutResponse::Abort => "abort",
            TimeoutResponse::Status => "status",
        }
    }
}

impl fmt::Display for TimeoutResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeoutResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(TimeoutResponse::Abort),
            "status" => Ok(TimeoutResponse::Status),
            other => Err(format!("expected 'abort' or 'status', got '{other}'")),
        }
    }
}

/// Translate one invocation outcome into the response sent back to the
/// scheduler.
pub fn outcome_response(outcome: InvocationOutcome, on_timeout: TimeoutResponse) -> Response {
    match outcome {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err @ DispatchError::Timeout { .. }) => match on_timeout {
            TimeoutResponse::Abort => aborted_response(),
            TimeoutResponse::Status => AppError::Dispatch(err).into_response(),
        },
        Err(err) => AppError::Dispatch(err).into_response(),
    }
}

/// A response whose body fails on first poll.
///
/// hyper closes the connection when the body errors, so the client observes
/// an aborted request rather than a complete error response. The status is
/// `504` for anything that only inspects the head.
pub fn aborted_response() -> Response {
    let body = Body::from_stream(futures::stream::once(async {
        Err::<Bytes, _>(io::Error::new(
            io::ErrorKind::TimedOut,
            "job trigger handler timed out",
        ))
    }));

    (StatusCode::GATEWAY_TIMEOUT, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timeout_response() {
        assert_eq!("abort".parse::<TimeoutResponse>(), Ok(TimeoutResponse::Abort));
        assert_eq!(" Status ".parse::<TimeoutResponse>(), Ok(TimeoutResponse::Status));
        assert!("drop".parse::<TimeoutResponse>().is_err());
    }

    #[test]
    fn abort_is_the_default() {
        assert_eq!(TimeoutResponse::default(), TimeoutResponse::Abort);
        assert_eq!(TimeoutResponse::default().to_string(), "abort");
    }

    #[test]
    fn success_is_plain_ok() {
        let response = outcome_response(Ok(()), TimeoutResponse::Abort);
        assert_eq!(response.status(), StatusCode::OK);
    }
}
