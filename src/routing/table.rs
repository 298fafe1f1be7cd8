//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Combine each controller's base path with its routed methods' sub-paths
//! - Classify every formal parameter into a [`ParameterSpec`]
//! - Answer exact-match lookups by route key
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact string keys: no patterns, no trailing-slash normalisation
//! - Duplicate keys: the entry built last replaces the earlier one
//! - Parameters with neither an injectable type nor a named-value marker
//!   reject the whole build

use std::collections::HashMap;
use std::fmt;

use crate::container::catalog::{HandlerFn, Instance, MethodDecl, ParamDecl, ParamType};
use crate::container::registry::ComponentRegistry;

/// How to fill one handler argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSpec {
    InjectedRequest,
    InjectedResponse,
    NamedValue(String),
}

/// Error raised while building the route table.
#[derive(Debug, thiserror::Error)]
pub enum RouteBuildError {
    #[error("parameter {index} of `{component}::{method}` has no binding (route `{route}`)")]
    UnboundParameter {
        component: String,
        method: String,
        route: String,
        index: usize,
    },
}

/// A resolved handler for one route key.
#[derive(Clone)]
pub struct RouteEntry {
    key: String,
    component: String,
    method: String,
    instance: Instance,
    handler: HandlerFn,
    params: Vec<ParameterSpec>,
}

impl RouteEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Registry key of the owning component.
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("key", &self.key)
            .field("component", &self.component)
            .field("method", &self.method)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Immutable map from route key to handler.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: HashMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build routes for every controller in the registry.
    pub fn build(registry: &ComponentRegistry) -> Result<Self, RouteBuildError> {
        let mut entries = HashMap::new();

        for (component, registered) in registry.iter() {
            let ty = registered.component_type();
            let Some(base_path) = ty.base_path() else {
                continue;
            };

            for method in ty.methods() {
                let Some(sub_path) = method.route() else {
                    continue;
                };
                let key = format!("{}{}", base_path, sub_path);
                let params = classify(component, method, &key)?;

                tracing::debug!(route = %key, component = %component, method = %method.name(), "Route mapped");
                let entry = RouteEntry {
                    key: key.clone(),
                    component: component.to_string(),
                    method: method.name().to_string(),
                    instance: registered.instance().clone(),
                    handler: method.handler().clone(),
                    params,
                };
                if let Some(previous) = entries.insert(key.clone(), entry) {
                    tracing::debug!(
                        route = %key,
                        replaced = %format!("{}::{}", previous.component, previous.method),
                        "Route key collision, later mapping wins"
                    );
                }
            }
        }

        tracing::info!(routes = entries.len(), "Route table built");
        Ok(Self { entries })
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &str) -> Option<&RouteEntry> {
        self.entries.get(key)
    }

    /// Instance owning the handler for `key`.
    pub fn instance_for(&self, key: &str) -> Option<&Instance> {
        self.entries.get(key).map(RouteEntry::instance)
    }

    /// Route keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn classify(component: &str, method: &MethodDecl, route: &str) -> Result<Vec<ParameterSpec>, RouteBuildError> {
    method
        .params()
        .iter()
        .enumerate()
        .map(|(index, param)| {
            spec_for(param).ok_or_else(|| RouteBuildError::UnboundParameter {
                component: component.to_string(),
                method: method.name().to_string(),
                route: route.to_string(),
                index,
            })
        })
        .collect()
}

/// Declared type first, then the named-value marker.
fn spec_for(param: &ParamDecl) -> Option<ParameterSpec> {
    match param.ty() {
        ParamType::Request => Some(ParameterSpec::InjectedRequest),
        ParamType::Response => Some(ParameterSpec::InjectedResponse),
        ParamType::Text => param.name().map(|key| ParameterSpec::NamedValue(key.to_string())),
    }
}
