//! Trigger handler abstraction.
//!
//! User code registers a plain async function or closure whose parameters are
//! [`FromBinding`] types, in any order:
//!
//! ```ignore
//! async fn on_trigger(payload: Payload, name: JobName, cancel: CancellationToken) {
//!     // ...
//! }
//! ```
//!
//! [`TriggerHandler`] is implemented for such functions up to eight
//! parameters. [`BoxedTriggerHandler`] erases the parameter tuple so the
//! dispatcher can store any handler behind one type.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::binding::{BoundArg, FromBinding, HandlerDescriptor};
use crate::error::BindingError;

/// Result of a handler body once it has run to completion.
pub type HandlerResult = Result<(), anyhow::Error>;

/// Conversion of a handler's return value into success or fault.
///
/// The success value itself is discarded.
pub trait IntoHandlerResult: Send + 'static {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map(|_| ()).map_err(Into::into)
    }
}

/// An async function usable as a job trigger handler.
///
/// `T` is the tuple of parameter types; it only exists to keep the impls for
/// different arities apart.
pub trait TriggerHandler<T>: Clone + Send + Sync + 'static {
    /// Parameter roles, computed from the parameter types.
    fn descriptor() -> HandlerDescriptor;

    /// Convert the bound arguments into parameters and start the handler.
    ///
    /// Fails only if the arguments cannot be converted, for example a JSON
    /// payload that does not decode.
    fn call(self, args: Vec<BoundArg>) -> Result<BoxFuture<'static, HandlerResult>, BindingError>;
}

macro_rules! impl_trigger_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        impl<F, Fut, R, $($ty,)*> TriggerHandler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoHandlerResult,
            $($ty: FromBinding,)*
        {
            fn descriptor() -> HandlerDescriptor {
                HandlerDescriptor::new(vec![$($ty::role(),)*])
            }

            fn call(
                self,
                args: Vec<BoundArg>,
            ) -> Result<BoxFuture<'static, HandlerResult>, BindingError> {
                let mut args = args.into_iter();
                let mut position = 0usize;
                $(
                    let arg = args
                        .next()
                        .ok_or(BindingError::MissingArgument { position })?;
                    let $ty = $ty::from_arg(arg)?;
                    position += 1;
                )*
                Ok(Box::pin(async move { (self)($($ty),*).await.into_handler_result() }))
            }
        }
    };
}

impl_trigger_handler!();
impl_trigger_handler!(T1);
impl_trigger_handler!(T1, T2);
impl_trigger_handler!(T1, T2, T3);
impl_trigger_handler!(T1, T2, T3, T4);
impl_trigger_handler!(T1, T2, T3, T4, T5);
impl_trigger_handler!(T1, T2, T3, T4, T5, T6);
impl_trigger_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_trigger_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

/// Object-safe view of a [`TriggerHandler`].
trait ErasedHandler: Send + Sync {
    fn call(&self, args: Vec<BoundArg>) -> Result<BoxFuture<'static, HandlerResult>, BindingError>;
}

struct HandlerFn<H, T> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<H, T> ErasedHandler for HandlerFn<H, T>
where
    H: TriggerHandler<T>,
    T: 'static,
{
    fn call(&self, args: Vec<BoundArg>) -> Result<BoxFuture<'static, HandlerResult>, BindingError> {
        self.handler.clone().call(args)
    }
}

/// A registered handler together with its descriptor.
#[derive(Clone)]
pub struct BoxedTriggerHandler {
    descriptor: Arc<HandlerDescriptor>,
    inner: Arc<dyn ErasedHandler>,
}

impl BoxedTriggerHandler {
    pub fn new<H, T>(handler: H) -> Self
    where
        H: TriggerHandler<T>,
        T: 'static,
    {
        Self {
            descriptor: Arc::new(H::descriptor()),
            inner: Arc::new(HandlerFn {
                handler,
                _marker: PhantomData,
            }),
        }
    }

    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    pub fn call(
        &self,
        args: Vec<BoundArg>,
    ) -> Result<BoxFuture<'static, HandlerResult>, BindingError> {
        self.inner.call(args)
    }
}

impl std::fmt::Debug for BoxedTriggerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedTriggerHandler")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
