//! Job trigger dispatch core.
//!
//! Transport-independent pieces of the `/job/{job_name}` callback: the trigger
//! request, role-based parameter binding, service resolution, timeout-bounded
//! invocation and the dispatcher that ties them together. The HTTP adapter
//! lives in `jobhook-api`.

pub mod binding;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod invoke;
pub mod logger;
pub mod resolver;
pub mod state;
pub mod trigger;

pub use binding::{FromBinding, HandlerDescriptor, JsonPayload, ParamRole, Payload, Service};
pub use dispatcher::{InvocationOutcome, JobTriggerDispatcher};
pub use error::{BindingError, DispatchError};
pub use handler::{IntoHandlerResult, TriggerHandler};
pub use logger::JobLogger;
pub use resolver::{ServiceKey, ServiceRegistry, ServiceResolver};
pub use trigger::{JobName, JobNameError, TriggerRequest};

pub use tokio_util::sync::CancellationToken;
