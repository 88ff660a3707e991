//! Route definition for scheduled-job trigger callbacks.
//!
//! ```text
//! POST   /job/{job_name}      -> trigger_job   (raw body = job payload)
//! POST   /job/                -> missing_job_name (400)
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use jobhook_core::dispatcher::JobTriggerDispatcher;
use jobhook_core::handler::TriggerHandler;
use jobhook_core::resolver::{ServiceRegistry, ServiceResolver};
use jobhook_core::trigger::{JobName, JobNameError, TriggerRequest};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::response::{outcome_response, TimeoutResponse};

/// Path the trigger route is mounted at.
pub const JOB_TRIGGER_PATH: &str = "/job/{job_name}";

/// The trigger prefix with an empty job name segment.
const EMPTY_JOB_NAME_PATH: &str = "/job/";

/// Registration options for [`JobTriggerRouterExt::map_job_trigger_handler`].
#[derive(Clone)]
pub struct TriggerOptions {
    /// Upper bound for one handler run; `None` or zero is unbounded.
    pub timeout: Option<Duration>,
    /// Source of `Service<T>` parameters and job loggers.
    pub resolver: Arc<dyn ServiceResolver>,
    /// How a timed-out invocation is reported.
    pub timeout_response: TimeoutResponse,
    /// Largest accepted payload; `None` accepts any length.
    pub max_payload_bytes: Option<usize>,
}

impl TriggerOptions {
    pub fn new() -> Self {
        Self {
            timeout: None,
            resolver: Arc::new(ServiceRegistry::new()),
            timeout_response: TimeoutResponse::Abort,
            max_payload_bytes: None,
        }
    }

    /// Options matching the server configuration, with an empty registry.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            timeout: config.job_timeout(),
            timeout_response: config.timeout_response,
            max_payload_bytes: config.max_payload_bytes(),
            ..Self::new()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn ServiceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn timeout_response(mut self, timeout_response: TimeoutResponse) -> Self {
        self.timeout_response = timeout_response;
        self
    }

    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Mount a job trigger handler on an existing router.
///
/// # Example
///
/// ```ignore
/// async fn on_trigger(name: JobName, payload: Payload) { /* ... */ }
///
/// let app = Router::new()
///     .map_job_trigger_handler(on_trigger, TriggerOptions::new().timeout(Duration::from_secs(5)));
/// ```
pub trait JobTriggerRouterExt {
    fn map_job_trigger_handler<H, T>(self, handler: H, options: TriggerOptions) -> Self
    where
        H: TriggerHandler<T>,
        T: 'static;
}

impl<S> JobTriggerRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn map_job_trigger_handler<H, T>(self, handler: H, options: TriggerOptions) -> Self
    where
        H: TriggerHandler<T>,
        T: 'static,
    {
        let dispatcher = JobTriggerDispatcher::new(handler)
            .with_optional_timeout(options.timeout)
            .with_resolver(options.resolver);

        tracing::info!(
            path = JOB_TRIGGER_PATH,
            timeout_ms = dispatcher.timeout().map(|t| t.as_millis() as u64),
            on_timeout = %options.timeout_response,
            max_payload_bytes = options.max_payload_bytes,
            params = ?dispatcher.descriptor().roles(),
            "Registered job trigger handler",
        );

        self.merge(router(
            dispatcher,
            options.timeout_response,
            options.max_payload_bytes,
        ))
    }
}

#[derive(Clone)]
struct TriggerEndpoint {
    dispatcher: Arc<JobTriggerDispatcher>,
    timeout_response: TimeoutResponse,
}

/// Routes for a single dispatcher, usable with any outer router state.
///
/// Without `max_payload_bytes` the body limit is disabled, so payloads of any
/// length reach the handler.
pub fn router<S>(
    dispatcher: JobTriggerDispatcher,
    timeout_response: TimeoutResponse,
    max_payload_bytes: Option<usize>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let body_limit = match max_payload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route(JOB_TRIGGER_PATH, post(trigger_job))
        .route(EMPTY_JOB_NAME_PATH, post(missing_job_name))
        .layer(body_limit)
        .with_state(TriggerEndpoint {
            dispatcher: Arc::new(dispatcher),
            timeout_response,
        })
}

/// POST /job/{job_name}
///
/// Dispatch one trigger invocation with the raw body as payload.
async fn trigger_job(
    State(endpoint): State<TriggerEndpoint>,
    Path(job_name): Path<String>,
    body: Bytes,
) -> Response {
    let job_name = match JobName::new(job_name) {
        Ok(name) => name,
        Err(e) => return AppError::BadRequest(e.to_string()).into_response(),
    };

    let request = TriggerRequest::new(job_name, body.to_vec());
    let outcome = endpoint.dispatcher.dispatch(request).await;

    outcome_response(outcome, endpoint.timeout_response)
}

/// POST /job/
///
/// The router never matches an empty `{job_name}` segment, so it is rejected
/// here with the same error as any other invalid name.
async fn missing_job_name() -> Response {
    AppError::BadRequest(JobNameError::Empty.to_string()).into_response()
}
