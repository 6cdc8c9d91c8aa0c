use std::sync::Arc;

use crate::{
    descriptor::{Construct, DepKind, Produce, PropertyDep, Target},
    errors::{DeclarationSite, DeclareError},
    reflect::{ReflectedType, TypeReflector},
    registry::DescriptorRegistry,
    types::{Identifier, Lifecycle, TypeToken, Value},
};

/// A root declaration target: a constructible type or a callable factory
pub enum RootTarget {
    Constructible(Arc<dyn Construct>),
    Callable(Arc<dyn Produce>),
}
impl RootTarget {
    pub fn of_type<T: crate::descriptor::Constructible>() -> RootTarget {
        RootTarget::Constructible(Arc::new(crate::descriptor::TypedConstruct::<T>::default()))
    }

    pub fn callable(produce: impl Produce + 'static) -> RootTarget {
        RootTarget::Callable(Arc::new(produce))
    }

    fn token(&self) -> TypeToken {
        match self {
            RootTarget::Constructible(construct) => construct.token(),
            RootTarget::Callable(produce) => produce.token(),
        }
    }
}

/// Translates declaration events into registry updates.
///
/// Implicit parameter dependencies come from the reflected type metadata,
/// explicit overrides from supplied identifiers; a declaration that cannot be
/// uniquely addressed is rejected and commits nothing.
pub struct DescriptorBuilder {
    registry: Arc<DescriptorRegistry>,
    reflector: Arc<dyn TypeReflector>,
}

impl DescriptorBuilder {
    pub fn new(registry: Arc<DescriptorRegistry>, reflector: Arc<dyn TypeReflector>) -> Self {
        DescriptorBuilder {
            registry,
            reflector,
        }
    }

    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    /// Declares a type or factory root.
    ///
    /// The identifier is the explicit one when given; otherwise the target's
    /// own type for constructibles, or the reflected return type for
    /// factories. Positions already annotated through
    /// [declare_parameter](Self::declare_parameter) are left untouched; the
    /// remaining ones are filled from the reflected parameter sequence.
    pub fn declare_root(
        &self,
        target: RootTarget,
        explicit: Option<Identifier>,
        lifecycle: Option<Lifecycle>,
    ) -> Result<Identifier, DeclareError> {
        let token = target.token();
        let (kind, bound) = match target {
            RootTarget::Constructible(construct) => (DepKind::Type, Target::Type(construct)),
            RootTarget::Callable(produce) => (DepKind::Factory, Target::Factory(produce)),
        };

        let identifier = match explicit {
            Some(identifier) => identifier,
            None if kind == DepKind::Type => Identifier::Type(token),
            // Return-type reflection is only a fallback for factories
            None => match self.reflector.return_type(&token, None) {
                Some(ReflectedType::Class(returned)) => Identifier::Type(returned),
                _ => {
                    return Err(DeclareError::MissingIdentifier {
                        owner: Identifier::Type(token),
                        site: DeclarationSite::ReturnType,
                    })
                }
            },
        };

        // Stage the parameter sequence fully before committing anything, so a
        // rejected position leaves the registry untouched.
        let reflected = self.reflector.param_types(&token, None);
        let mut params = self
            .registry
            .get(&identifier)
            .map(|descriptor| descriptor.params)
            .unwrap_or_default();
        if params.len() < reflected.len() {
            params.resize(reflected.len(), None);
        }

        let mut implicit_children = Vec::new();
        for (index, ty) in reflected.iter().enumerate() {
            if params[index].is_some() {
                // Explicitly annotated earlier
                continue;
            }
            match ty {
                ReflectedType::Class(child) => {
                    let child_id = Identifier::Type(*child);
                    implicit_children.push(child_id.clone());
                    params[index] = Some(child_id);
                }
                ReflectedType::Simple(_) | ReflectedType::Opaque => {
                    return Err(DeclareError::MissingIdentifier {
                        owner: identifier.clone(),
                        site: DeclarationSite::Parameter(index),
                    });
                }
            }
        }

        for child in implicit_children {
            self.registry.ensure_then(&child, |_| {});
        }
        self.registry.ensure_then(&identifier, |descriptor| {
            descriptor.kind = kind;
            descriptor.target = Some(bound);
            if let Some(lifecycle) = lifecycle {
                descriptor.lifecycle = lifecycle;
            }
            descriptor.params = params;
        });

        tracing::debug!("declared {kind:?} root '{identifier}'");
        Ok(identifier)
    }

    /// Declares one positional parameter of `owner`.
    ///
    /// A simple-typed or unreflectable parameter must carry an explicit
    /// identifier; a primitive type has no unique registrable identity.
    pub fn declare_parameter(
        &self,
        owner: &Identifier,
        index: usize,
        reflected: ReflectedType,
        explicit: Option<Identifier>,
        lifecycle: Option<Lifecycle>,
    ) -> Result<Identifier, DeclareError> {
        let child = match explicit {
            Some(identifier) => identifier,
            None => match reflected {
                ReflectedType::Class(token) => Identifier::Type(token),
                ReflectedType::Simple(_) | ReflectedType::Opaque => {
                    return Err(DeclareError::MissingIdentifier {
                        owner: owner.clone(),
                        site: DeclarationSite::Parameter(index),
                    });
                }
            },
        };

        self.registry.ensure_then(&child, |descriptor| {
            if let Some(lifecycle) = lifecycle {
                descriptor.lifecycle = lifecycle;
            }
        });
        self.registry.ensure_then(owner, |descriptor| {
            if descriptor.params.len() <= index {
                descriptor.params.resize(index + 1, None);
            }
            descriptor.params[index] = Some(child.clone());
        });

        tracing::debug!("declared parameter {index} of '{owner}' as '{child}'");
        Ok(child)
    }

    /// Declares a property-style member of `owner`.
    ///
    /// A member that already holds a concrete value becomes a standalone
    /// instance in the registry, addressable by other consumers regardless of
    /// whether the owner itself ever registers.
    pub fn declare_property(
        &self,
        owner: &Identifier,
        member: &str,
        explicit: Option<Identifier>,
        value: Option<Value>,
    ) -> Result<Identifier, DeclareError> {
        let child = match explicit {
            Some(identifier) => identifier,
            None => {
                let reflected = match owner {
                    Identifier::Type(token) => self.reflector.return_type(token, Some(member)),
                    Identifier::Named(_) => None,
                };
                match reflected {
                    Some(ReflectedType::Class(token)) => Identifier::Type(token),
                    _ => {
                        return Err(DeclareError::MissingIdentifier {
                            owner: owner.clone(),
                            site: DeclarationSite::Property(member.into()),
                        });
                    }
                }
            }
        };

        match value {
            Some(value) => self.registry.ensure_then(&child, |descriptor| {
                descriptor.kind = DepKind::Instance;
                descriptor.target = Some(Target::Instance(value));
            }),
            None => self.registry.ensure_then(&child, |_| {}),
        }

        self.registry.ensure_then(owner, |descriptor| {
            match descriptor
                .properties
                .iter_mut()
                .find(|property| property.member.as_ref() == member)
            {
                Some(existing) => existing.identifier = child.clone(),
                None => descriptor.properties.push(PropertyDep {
                    member: member.into(),
                    identifier: child.clone(),
                }),
            }
        });

        tracing::debug!("declared property '{member}' of '{owner}' as '{child}'");
        Ok(child)
    }

    /// Registers a standalone precomputed value under `identifier`
    pub fn declare_instance(
        &self,
        identifier: impl Into<Identifier>,
        value: Value,
        lifecycle: Option<Lifecycle>,
    ) -> Identifier {
        let identifier = identifier.into();
        self.registry.ensure_then(&identifier, |descriptor| {
            descriptor.kind = DepKind::Instance;
            descriptor.target = Some(Target::Instance(value));
            if let Some(lifecycle) = lifecycle {
                descriptor.lifecycle = lifecycle;
            }
        });
        identifier
    }
}
