use std::sync::Arc;

use crate::{
    container::{Container, ProducerFn},
    descriptor::{Descriptor, Produce},
    errors::RegisterError,
};

/// Registers a producer that invokes the bound factory function with the
/// resolved positional values.
pub(crate) fn register(
    descriptor: &Descriptor,
    produce: Arc<dyn Produce>,
    container: &Arc<dyn Container>,
) -> Result<(), RegisterError> {
    let positional = descriptor.positional()?;

    let producer: ProducerFn = Arc::new(move |args| produce.invoke(args));

    tracing::debug!("registering factory '{}'", descriptor.identifier);
    container.register_factory(
        descriptor.identifier.clone(),
        producer,
        positional,
        descriptor.lifecycle,
    );
    Ok(())
}
