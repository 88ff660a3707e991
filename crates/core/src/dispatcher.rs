//! Job trigger dispatcher.
//!
//! Owns one registered handler and turns each [`TriggerRequest`] into exactly
//! one outcome: bind parameters, run the handler as its own task under the
//! configured timeout, report.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::binding::{bind, HandlerDescriptor};
use crate::error::DispatchError;
use crate::handler::{BoxedTriggerHandler, TriggerHandler};
use crate::invoke::{effective_timeout, invoke};
use crate::resolver::{ServiceRegistry, ServiceResolver};
use crate::state::InvocationState;
use crate::trigger::TriggerRequest;

/// Outcome of one trigger invocation.
pub type InvocationOutcome = Result<(), DispatchError>;

/// Dispatches trigger invocations to a single registered handler.
///
/// Cheap to share behind an `Arc`; holds no per-invocation state.
#[derive(Clone)]
pub struct JobTriggerDispatcher {
    handler: BoxedTriggerHandler,
    timeout: Option<Duration>,
    resolver: Arc<dyn ServiceResolver>,
}

impl JobTriggerDispatcher {
    /// Register `handler` with no timeout and an empty [`ServiceRegistry`].
    pub fn new<H, T>(handler: H) -> Self
    where
        H: TriggerHandler<T>,
        T: 'static,
    {
        Self {
            handler: BoxedTriggerHandler::new(handler),
            timeout: None,
            resolver: Arc::new(ServiceRegistry::new()),
        }
    }

    /// Bound each invocation by `timeout`. A zero duration disables the bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = effective_timeout(Some(timeout));
        self
    }

    pub fn with_optional_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = effective_timeout(timeout);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ServiceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn descriptor(&self) -> &HandlerDescriptor {
        self.handler.descriptor()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Handle one trigger invocation.
    ///
    /// If the returned future is dropped before it resolves (for example the
    /// caller disconnected), the handler's cancellation token is triggered.
    pub async fn dispatch(&self, request: TriggerRequest) -> InvocationOutcome {
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();

        let outcome = self.run(&request, &cancel).await;

        // Completed or timed out: the token's fate is already decided.
        guard.disarm();

        let state = InvocationState::terminal_for(&outcome);
        match &outcome {
            Ok(()) => {
                tracing::debug!(job_name = %request.job_name(), %state, "Job trigger handled");
            }
            Err(DispatchError::Timeout { timeout }) => {
                tracing::warn!(
                    job_name = %request.job_name(),
                    %state,
                    timeout_ms = timeout.as_millis() as u64,
                    "Job trigger handler timed out, cancellation requested",
                );
            }
            Err(e) => {
                tracing::error!(
                    job_name = %request.job_name(),
                    %state,
                    kind = e.kind(),
                    error = %e,
                    "Job trigger failed",
                );
            }
        }

        outcome
    }

    async fn run(&self, request: &TriggerRequest, cancel: &CancellationToken) -> InvocationOutcome {
        tracing::debug!(
            job_name = %request.job_name(),
            payload_len = request.payload().len(),
            state = %InvocationState::Received,
            "Job trigger received",
        );

        let args = bind(
            self.handler.descriptor(),
            request,
            self.resolver.as_ref(),
            cancel,
        )?;
        let future = self.handler.call(args)?;
        tracing::trace!(job_name = %request.job_name(), state = %InvocationState::Bound, "Handler arguments bound");

        tracing::trace!(
            job_name = %request.job_name(),
            state = %InvocationState::Running,
            timeout_ms = self.timeout.map(|t| t.as_millis() as u64),
            "Invoking job trigger handler",
        );
        invoke(future, self.timeout, cancel).await
    }
}

impl std::fmt::Debug for JobTriggerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTriggerDispatcher")
            .field("handler", &self.handler)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;
    use crate::binding::{Payload, Service};
    use crate::error::BindingError;
    use crate::logger::JobLogger;
    use crate::trigger::JobName;

    type Seen = Arc<Mutex<Vec<(String, Vec<u8>)>>>;

    fn request(name: &str, payload: &[u8]) -> TriggerRequest {
        TriggerRequest::new(JobName::new(name).unwrap(), payload.to_vec())
    }

    struct Counter {
        hits: std::sync::atomic::AtomicUsize,
    }

    #[tokio::test]
    async fn dispatches_name_and_payload() {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let dispatcher = JobTriggerDispatcher::new(move |name: JobName, payload: Payload| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((name.into_inner(), payload.into_inner()));
            }
        });

        dispatcher.dispatch(request("daily", b"\x00\x01\x02")).await.unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[("daily".to_string(), vec![0u8, 1, 2])]
        );
    }

    #[tokio::test]
    async fn binds_payload_before_name() {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let dispatcher = JobTriggerDispatcher::new(
            move |payload: Payload, name: JobName, _logger: Option<JobLogger>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().unwrap().push((name.into_inner(), payload.into_inner()));
                }
            },
        );

        dispatcher.dispatch(request("weekly", b"{}")).await.unwrap();

        assert_eq!(seen.lock().unwrap()[0].0, "weekly");
        assert_eq!(seen.lock().unwrap()[0].1, b"{}");
    }

    #[tokio::test]
    async fn resolves_services_from_resolver() {
        let counter = Arc::new(Counter {
            hits: Default::default(),
        });
        let mut registry = ServiceRegistry::new();
        registry.insert_arc(Arc::clone(&counter));

        let dispatcher = JobTriggerDispatcher::new(|counter: Service<Counter>| async move {
            counter.hits.fetch_add(1, Ordering::SeqCst);
        })
        .with_resolver(Arc::new(registry));

        dispatcher.dispatch(request("a", b"")).await.unwrap();
        dispatcher.dispatch(request("b", b"")).await.unwrap();

        assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_service_never_runs_handler() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let dispatcher = JobTriggerDispatcher::new(move |_counter: Service<Counter>| {
            let flag = Arc::clone(&flag);
            async move { flag.store(true, Ordering::SeqCst) }
        });

        let outcome = dispatcher.dispatch(request("job", b"")).await;

        assert_matches!(outcome, Err(DispatchError::Binding(BindingError::Unresolved { .. })));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn timeout_triggers_handler_cancellation() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let dispatcher = JobTriggerDispatcher::new(move |cancel: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::select! {
                    _ = cancel.cancelled() => flag.store(true, Ordering::SeqCst),
                    _ = tokio::time::sleep(Duration::from_millis(400)) => {}
                }
            }
        })
        .with_timeout(Duration::from_millis(100));

        let outcome = dispatcher.dispatch(request("slow", b"")).await;
        assert_matches!(outcome, Err(DispatchError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn finishes_inside_timeout() {
        let dispatcher = JobTriggerDispatcher::new(|_name: JobName| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        })
        .with_timeout(Duration::from_millis(500));

        assert!(dispatcher.dispatch(request("quick", b"")).await.is_ok());
    }

    #[tokio::test]
    async fn dropped_dispatch_cancels_handler() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let dispatcher = JobTriggerDispatcher::new(move |cancel: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                cancel.cancelled().await;
                flag.store(true, Ordering::SeqCst);
            }
        });

        let pending = tokio::time::timeout(
            Duration::from_millis(50),
            dispatcher.dispatch(request("abandoned", b"")),
        )
        .await;
        assert!(pending.is_err());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn zero_timeout_is_unbounded() {
        let dispatcher = JobTriggerDispatcher::new(|| async {}).with_timeout(Duration::ZERO);
        assert_eq!(dispatcher.timeout(), None);
    }
}
