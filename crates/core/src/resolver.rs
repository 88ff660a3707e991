//! Service resolution for handler parameters.
//!
//! The dispatcher never owns application services. It asks a
//! [`ServiceResolver`] for each `Service<T>` parameter at bind time and hands
//! the returned `Arc` to the handler for that one invocation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::logger::JobLogger;
use crate::trigger::JobName;

/// Type-erased service instance as stored by a resolver.
pub type SharedService = Arc<dyn Any + Send + Sync>;

/// Identifies a service by its Rust type.
///
/// Equality and hashing use the [`TypeId`] only; the type name is kept for
/// error messages and logs.
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({})", self.name)
    }
}

/// Source of services and loggers for handler parameters.
///
/// Implementations must be cheap to query; the dispatcher calls them once per
/// parameter per invocation and does not cache the results.
pub trait ServiceResolver: Send + Sync {
    /// Look up a service instance. `None` fails binding for that parameter.
    fn resolve(&self, key: &ServiceKey) -> Option<SharedService>;

    /// Logger for an invocation. `None` is always acceptable.
    fn logger(&self, job_name: &JobName) -> Option<JobLogger> {
        let _ = job_name;
        None
    }
}

/// In-memory [`ServiceResolver`] keyed by type.
///
/// Built at startup, then shared behind an `Arc`:
///
/// ```ignore
/// let mut services = ServiceRegistry::new();
/// services.insert(Mailer::new(config));
/// let resolver: Arc<dyn ServiceResolver> = Arc::new(services);
/// ```
pub struct ServiceRegistry {
    services: HashMap<ServiceKey, SharedService>,
    logging: bool,
}

impl ServiceRegistry {
    /// Empty registry that hands out job loggers.
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            logging: true,
        }
    }

    /// Register `service`, replacing any earlier instance of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) -> &mut Self {
        self.insert_arc(Arc::new(service))
    }

    /// Register an already shared instance.
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, service: Arc<T>) -> &mut Self {
        let previous = self.services.insert(ServiceKey::of::<T>(), service);
        if previous.is_some() {
            tracing::debug!(
                service = std::any::type_name::<T>(),
                "Replaced registered service"
            );
        }
        self
    }

    /// Builder-style variant of [`ServiceRegistry::insert`].
    pub fn with<T: Send + Sync + 'static>(mut self, service: T) -> Self {
        self.insert(service);
        self
    }

    /// Stop handing out loggers; handlers then receive `None`.
    pub fn without_logger(mut self) -> Self {
        self.logging = false;
        self
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.services.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceResolver for ServiceRegistry {
    fn resolve(&self, key: &ServiceKey) -> Option<SharedService> {
        self.services.get(key).cloned()
    }

    fn logger(&self, job_name: &JobName) -> Option<JobLogger> {
        self.logging.then(|| JobLogger::new(job_name.clone()))
    }
}
