//! Component registry.
//!
//! # Responsibilities
//! - Resolve scanned type names against the catalog
//! - Instantiate exactly one object per controller type
//! - Record, but survive, per-component failures
//!
//! # Design Decisions
//! - Keyed by simple type name: same-named types in different namespaces
//!   collide and the one processed last wins
//! - Non-controller types are skipped without a fault
//! - A panicking constructor is a fault, not a crash

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::container::catalog::{Catalog, ComponentType, ConstructError, Instance};
use crate::observability::metrics;

/// Why a scanned type did not make it into the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationFault {
    #[error("type `{0}` cannot be resolved")]
    Unresolvable(String),
    #[error("cannot construct `{name}`: {source}")]
    Construct {
        name: String,
        #[source]
        source: ConstructError,
    },
    #[error("constructor of `{name}` panicked: {message}")]
    Panicked { name: String, message: String },
}

impl RegistrationFault {
    fn kind(&self) -> &'static str {
        match self {
            RegistrationFault::Unresolvable(_) => "unresolvable",
            RegistrationFault::Construct { .. } => "construct",
            RegistrationFault::Panicked { .. } => "panicked",
        }
    }
}

/// A live controller object together with its type description.
#[derive(Debug, Clone)]
pub struct ComponentInstance {
    ty: Arc<ComponentType>,
    instance: Instance,
}

impl ComponentInstance {
    pub fn component_type(&self) -> &Arc<ComponentType> {
        &self.ty
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Borrow the object as its concrete type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }
}

/// One instance per controller type, keyed by simple type name.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, ComponentInstance>,
    faults: Vec<RegistrationFault>,
}

impl ComponentRegistry {
    /// Resolve and instantiate `names` in the order given.
    pub fn register_all<I, S>(catalog: &Catalog, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for name in names {
            registry.register(catalog, name.as_ref());
        }

        tracing::info!(
            components = registry.components.len(),
            faults = registry.faults.len(),
            "Component registry built"
        );
        registry
    }

    fn register(&mut self, catalog: &Catalog, name: &str) {
        let ty = match catalog.resolve(name) {
            Some(ty) => ty,
            None => return self.fault(RegistrationFault::Unresolvable(name.to_string())),
        };

        if !ty.is_controller() {
            tracing::trace!(component = %name, "Skipping type without controller marker");
            return;
        }

        let built = panic::catch_unwind(AssertUnwindSafe(|| ty.instantiate()));
        let instance = match built {
            Ok(Ok(instance)) => instance,
            Ok(Err(source)) => {
                return self.fault(RegistrationFault::Construct {
                    name: name.to_string(),
                    source,
                })
            }
            Err(payload) => {
                return self.fault(RegistrationFault::Panicked {
                    name: name.to_string(),
                    message: panic_message(&*payload),
                })
            }
        };

        let key = ty.simple_name().to_string();
        tracing::debug!(component = %name, key = %key, "Component registered");
        if let Some(previous) = self
            .components
            .insert(key.clone(), ComponentInstance { ty, instance })
        {
            tracing::debug!(
                key = %key,
                replaced = %previous.ty.name(),
                by = %name,
                "Component name collision, later type wins"
            );
        }
    }

    fn fault(&mut self, fault: RegistrationFault) {
        tracing::warn!(error = %fault, "Component registration failed");
        metrics::record_registration_fault(fault.kind());
        self.faults.push(fault);
    }

    /// Look up an instance by simple type name.
    pub fn get(&self, name: &str) -> Option<&ComponentInstance> {
        self.components.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentInstance)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn faults(&self) -> &[RegistrationFault] {
        &self.faults
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
