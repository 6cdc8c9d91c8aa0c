//! One registration strategy per descriptor kind.

use std::sync::Arc;

use crate::{
    container::Container,
    descriptor::{DepKind, Descriptor, Target},
    errors::RegisterError,
    registry::DescriptorRegistry,
};

pub(crate) mod factory;
pub(crate) mod instance;
pub(crate) mod typed;

/// Registers one descriptor with the container using the strategy its kind
/// selects. A kind/target disagreement marks a corrupted descriptor and is a
/// programming error, not a recoverable condition.
pub(crate) fn register_node(
    descriptor: &Descriptor,
    registry: &Arc<DescriptorRegistry>,
    container: &Arc<dyn Container>,
) -> Result<(), RegisterError> {
    let target = descriptor
        .target
        .as_ref()
        .ok_or_else(|| RegisterError::UnboundTarget {
            identifier: descriptor.identifier.clone(),
        })?;

    match (descriptor.kind, target) {
        (DepKind::Factory, Target::Factory(produce)) => {
            factory::register(descriptor, produce.clone(), container)
        }
        (DepKind::Instance, Target::Instance(value)) => {
            instance::register(descriptor, value.clone(), container)
        }
        (DepKind::Type, Target::Type(construct)) => {
            typed::register(descriptor, construct.clone(), registry, container)
        }
        (kind, _) => Err(RegisterError::UnknownKind {
            identifier: descriptor.identifier.clone(),
            kind,
        }),
    }
}
