use std::sync::Arc;

use futures::{stream::FuturesUnordered, FutureExt, StreamExt};

use crate::{
    container::{Container, ProducerFn},
    descriptor::{Construct, Descriptor},
    errors::{RegisterError, ResolveError},
    registry::DescriptorRegistry,
    types::Value,
};

/// Registers a two-phase construction producer.
///
/// The base value is built from the resolved positional arguments; property
/// children are then resolved together and attached before the value becomes
/// visible to anyone. A failing position, property, or assignment fails the
/// whole produced value - a partially built instance is never exposed.
pub(crate) fn register(
    descriptor: &Descriptor,
    construct: Arc<dyn Construct>,
    registry: &Arc<DescriptorRegistry>,
    container: &Arc<dyn Container>,
) -> Result<(), RegisterError> {
    let positional = descriptor.positional()?;
    let identifier = descriptor.identifier.clone();
    let lifecycle = descriptor.lifecycle;

    let producer_registry = registry.clone();
    let producer_container = Arc::clone(container);
    let producer_id = identifier.clone();

    let producer: ProducerFn = Arc::new(move |args| {
        let construct = construct.clone();
        let registry = producer_registry.clone();
        let container = producer_container.clone();
        let identifier = producer_id.clone();

        async move {
            let mut base = construct.construct(args)?;

            // Property children are read back by identifier at production
            // time, so members declared after registration still count.
            let properties = registry
                .get(&identifier)
                .map(|descriptor| descriptor.properties)
                .unwrap_or_default();

            if !properties.is_empty() {
                let mut pending = FuturesUnordered::new();
                for property in properties {
                    let handle =
                        container
                            .get_dep(&property.identifier)
                            .ok_or(ResolveError::Unregistered {
                                identifier: property.identifier.clone(),
                            })?;
                    let owner = identifier.clone();
                    pending.push(async move {
                        match handle.inject().await {
                            Ok(value) => Ok((property.member, value)),
                            Err(error) => Err(ResolveError::Property {
                                owner,
                                member: property.member,
                                error,
                            }),
                        }
                    });
                }

                // All resolutions run together; the value is withheld until
                // every one of them has landed.
                let mut patch: Vec<(Arc<str>, Value)> = Vec::with_capacity(pending.len());
                while let Some(next) = pending.next().await {
                    patch.push(next?);
                }

                for (member, value) in patch {
                    construct
                        .assign(base.as_mut(), &member, value)
                        .map_err(|error| ResolveError::Property {
                            owner: identifier.clone(),
                            member,
                            error,
                        })?;
                }
            }

            Ok(Value::from_boxed(construct.token(), base))
        }
        .boxed()
    });

    tracing::debug!("registering type '{identifier}'");
    container.register_factory(identifier, producer, positional, lifecycle);
    Ok(())
}
