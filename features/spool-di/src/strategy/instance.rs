use std::sync::Arc;

use crate::{
    container::Container,
    descriptor::Descriptor,
    errors::RegisterError,
    types::{Identifier, Value},
};

/// Registers the captured value directly. Declared children ride along
/// untouched; instances undergo no further injection here.
pub(crate) fn register(
    descriptor: &Descriptor,
    value: Value,
    container: &Arc<dyn Container>,
) -> Result<(), RegisterError> {
    let declared: Vec<Identifier> = descriptor.params.iter().flatten().cloned().collect();

    tracing::debug!("registering instance '{}'", descriptor.identifier);
    container.register_instance(
        descriptor.identifier.clone(),
        value,
        declared,
        descriptor.lifecycle,
    );
    Ok(())
}
