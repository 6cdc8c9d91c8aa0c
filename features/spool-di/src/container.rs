//! Interface to the external injection container.
//!
//! The container is consumed, never owned: this crate registers producers and
//! values into it and asks it for handles, while the container keeps the
//! actual deferred resolution and caching engine to itself.

use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};

use crate::{
    errors::ResolveError,
    types::{DynError, Identifier, Injectable, Lifecycle, Value},
};

/// Producer registered for one identifier.
///
/// The container resolves the registered dependency identifiers and passes
/// the values in declaration order.
pub type ProducerFn =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, DynError>> + Send + Sync>;

/// One injection container, scoped to a single session
pub trait Container: Send + Sync {
    fn register_factory(
        &self,
        identifier: Identifier,
        producer: ProducerFn,
        dependencies: Vec<Identifier>,
        lifecycle: Lifecycle,
    );

    fn register_instance(
        &self,
        identifier: Identifier,
        value: Value,
        dependencies: Vec<Identifier>,
        lifecycle: Lifecycle,
    );

    /// `None` signals "not yet registered"
    fn get_dep(&self, identifier: &Identifier) -> Option<Arc<dyn Handle>>;
}

/// Container-issued handle for one identifier's pending or completed resolution
pub trait Handle: Send + Sync {
    /// Drives the resolution to completion
    fn inject(&self) -> BoxFuture<'static, Result<Value, DynError>>;

    /// The resolved value, once available
    fn injected(&self) -> Option<Value>;
}

/// Typed convenience over [Handle]
pub trait HandleExt {
    /// Awaits [Handle::inject] and downcasts the result
    fn inject_as<T: Injectable>(&self) -> BoxFuture<'_, Result<Arc<T>, DynError>>;
}

impl<H: Handle + ?Sized> HandleExt for H {
    fn inject_as<T: Injectable>(&self) -> BoxFuture<'_, Result<Arc<T>, DynError>> {
        async move {
            let value = self.inject().await?;
            value.downcast::<T>().map_err(|actual_type| {
                ResolveError::DowncastFailed {
                    required_type: std::any::type_name::<T>(),
                    actual_type,
                }
                .into()
            })
        }
        .boxed()
    }
}
