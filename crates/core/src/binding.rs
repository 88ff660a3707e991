//! Role-based parameter binding.
//!
//! Every handler parameter type implements [`FromBinding`], which names the
//! [`ParamRole`] it fills. The role list is collected into a
//! [`HandlerDescriptor`] once, when the handler is registered. Per invocation
//! [`bind`] walks the descriptor and produces one [`BoundArg`] per role, and
//! each parameter takes its value back out of that list positionally.

use std::ops::Deref;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::BindingError;
use crate::logger::JobLogger;
use crate::resolver::{ServiceKey, ServiceResolver};
use crate::trigger::{JobName, TriggerRequest};

/// What a handler parameter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    JobName,
    Payload,
    Logger,
    Cancellation,
    Service(ServiceKey),
}

impl ParamRole {
    pub fn label(&self) -> &'static str {
        match self {
            ParamRole::JobName => "job_name",
            ParamRole::Payload => "payload",
            ParamRole::Logger => "logger",
            ParamRole::Cancellation => "cancellation",
            ParamRole::Service(_) => "service",
        }
    }
}

/// Registration-time description of a handler's parameters, in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    roles: Vec<ParamRole>,
}

impl HandlerDescriptor {
    pub fn new(roles: Vec<ParamRole>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &[ParamRole] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Service types this handler needs from the resolver, in order.
    pub fn service_keys(&self) -> impl Iterator<Item = ServiceKey> + '_ {
        self.roles.iter().filter_map(|role| match role {
            ParamRole::Service(key) => Some(*key),
            _ => None,
        })
    }

    pub fn requires_service(&self) -> bool {
        self.service_keys().next().is_some()
    }

    pub fn accepts_cancellation(&self) -> bool {
        self.roles.contains(&ParamRole::Cancellation)
    }
}

/// A bound argument value, one per descriptor role.
#[derive(Debug, Clone)]
pub enum BoundArg {
    JobName(JobName),
    Payload(Vec<u8>),
    Logger(Option<JobLogger>),
    Cancellation(CancellationToken),
    Service(ServiceKey, crate::resolver::SharedService),
}

impl BoundArg {
    fn role_label(&self) -> &'static str {
        match self {
            BoundArg::JobName(_) => "job_name",
            BoundArg::Payload(_) => "payload",
            BoundArg::Logger(_) => "logger",
            BoundArg::Cancellation(_) => "cancellation",
            BoundArg::Service(..) => "service",
        }
    }

    fn mismatch(self, expected: &'static str) -> BindingError {
        BindingError::RoleMismatch {
            expected,
            found: self.role_label(),
        }
    }
}

/// Build the ordered argument list for one invocation.
///
/// The logger is looked up at most once and may be absent. A service role
/// that the resolver cannot satisfy fails the whole binding.
pub fn bind(
    descriptor: &HandlerDescriptor,
    request: &TriggerRequest,
    resolver: &dyn ServiceResolver,
    cancel: &CancellationToken,
) -> Result<Vec<BoundArg>, BindingError> {
    let mut logger: Option<Option<JobLogger>> = None;
    let mut args = Vec::with_capacity(descriptor.len());

    for role in descriptor.roles() {
        let arg = match role {
            ParamRole::JobName => BoundArg::JobName(request.job_name().clone()),
            ParamRole::Payload => BoundArg::Payload(request.payload().to_vec()),
            ParamRole::Logger => BoundArg::Logger(
                logger
                    .get_or_insert_with(|| resolver.logger(request.job_name()))
                    .clone(),
            ),
            ParamRole::Cancellation => BoundArg::Cancellation(cancel.clone()),
            ParamRole::Service(key) => {
                let service = resolver.resolve(key).ok_or(BindingError::Unresolved {
                    type_name: key.type_name(),
                })?;
                BoundArg::Service(*key, service)
            }
        };
        args.push(arg);
    }

    Ok(args)
}

/// A handler parameter type that can be filled from a [`BoundArg`].
pub trait FromBinding: Sized + Send + 'static {
    /// Role recorded in the handler descriptor for this parameter.
    fn role() -> ParamRole;

    /// Take the value out of the argument bound for [`FromBinding::role`].
    fn from_arg(arg: BoundArg) -> Result<Self, BindingError>;
}

impl FromBinding for JobName {
    fn role() -> ParamRole {
        ParamRole::JobName
    }

    fn from_arg(arg: BoundArg) -> Result<Self, BindingError> {
        match arg {
            BoundArg::JobName(name) => Ok(name),
            other => Err(other.mismatch("job_name")),
        }
    }
}

/// Raw request body, exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload(pub Vec<u8>);

impl Payload {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Payload {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl FromBinding for Payload {
    fn role() -> ParamRole {
        ParamRole::Payload
    }

    fn from_arg(arg: BoundArg) -> Result<Self, BindingError> {
        match arg {
            BoundArg::Payload(bytes) => Ok(Payload(bytes)),
            other => Err(other.mismatch("payload")),
        }
    }
}

/// Request body decoded as JSON into `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPayload<T>(pub T);

impl<T> Deref for JsonPayload<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromBinding for JsonPayload<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn role() -> ParamRole {
        ParamRole::Payload
    }

    fn from_arg(arg: BoundArg) -> Result<Self, BindingError> {
        match arg {
            BoundArg::Payload(bytes) => Ok(JsonPayload(serde_json::from_slice(&bytes)?)),
            other => Err(other.mismatch("payload")),
        }
    }
}

impl FromBinding for Option<JobLogger> {
    fn role() -> ParamRole {
        ParamRole::Logger
    }

    fn from_arg(arg: BoundArg) -> Result<Self, BindingError> {
        match arg {
            BoundArg::Logger(logger) => Ok(logger),
            other => Err(other.mismatch("logger")),
        }
    }
}

impl FromBinding for CancellationToken {
    fn role() -> ParamRole {
        ParamRole::Cancellation
    }

    fn from_arg(arg: BoundArg) -> Result<Self, BindingError> {
        match arg {
            BoundArg::Cancellation(token) => Ok(token),
            other => Err(other.mismatch("cancellation")),
        }
    }
}

/// A service resolved by type from the [`ServiceResolver`].
#[derive(Debug)]
pub struct Service<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> Clone for Service<T> {
    fn clone(&self) -> Self {
        Service(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Service<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromBinding for Service<T>
where
    T: Send + Sync + 'static,
{
    fn role() -> ParamRole {
        ParamRole::Service(ServiceKey::of::<T>())
    }

    fn from_arg(arg: BoundArg) -> Result<Self, BindingError> {
        match arg {
            BoundArg::Service(key, service) => {
                service
                    .downcast::<T>()
                    .map(Service)
                    .map_err(|_| BindingError::Unresolved {
                        type_name: key.type_name(),
                    })
            }
            other => Err(other.mismatch("service")),
        }
    }
}
