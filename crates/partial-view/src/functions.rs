/*
 * functions.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template function namespace.
//!
//! Two kinds of callables are visible to templates:
//!
//! - **Built-ins** ([`Builtin`]): the fixed set of primitives the rendering
//!   engine provides (`child`, `selection`, `requestTargetValue`, ...). Their
//!   names are protected and can never be registered by users.
//! - **User functions** ([`TemplateFunction`]): an open map collected in a
//!   [`FunctionRegistry`]. Each node has its own registry; at render time the
//!   node's entries are completed with its ancestors' (a node-local entry is
//!   never overwritten by an inherited one).

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use minijinja::Value;

/// The primitives provided by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Child,
    ChildIf,
    Selection,
    Action,
    Url,
    UrlIs,
    UrlStarts,
    UrlContains,
    RequestTargetHeader,
    RequestTargetValue,
    RequestTargetIfSelected,
    RequestSelectionHeader,
    RequestSelectionValue,
    RequestSelectionIfSelected,
    RequestActionHeader,
    RequestActionValue,
    RequestActionIfSelected,
    OobSwapEnabled,
    OobSwapIfEnabled,
    BasePath,
}

impl Builtin {
    pub const ALL: [Builtin; 20] = [
        Builtin::Child,
        Builtin::ChildIf,
        Builtin::Selection,
        Builtin::Action,
        Builtin::Url,
        Builtin::UrlIs,
        Builtin::UrlStarts,
        Builtin::UrlContains,
        Builtin::RequestTargetHeader,
        Builtin::RequestTargetValue,
        Builtin::RequestTargetIfSelected,
        Builtin::RequestSelectionHeader,
        Builtin::RequestSelectionValue,
        Builtin::RequestSelectionIfSelected,
        Builtin::RequestActionHeader,
        Builtin::RequestActionValue,
        Builtin::RequestActionIfSelected,
        Builtin::OobSwapEnabled,
        Builtin::OobSwapIfEnabled,
        Builtin::BasePath,
    ];

    /// The name templates call this primitive by.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Child => "child",
            Builtin::ChildIf => "childIf",
            Builtin::Selection => "selection",
            Builtin::Action => "action",
            Builtin::Url => "url",
            Builtin::UrlIs => "urlIs",
            Builtin::UrlStarts => "urlStarts",
            Builtin::UrlContains => "urlContains",
            Builtin::RequestTargetHeader => "requestTargetHeader",
            Builtin::RequestTargetValue => "requestTargetValue",
            Builtin::RequestTargetIfSelected => "requestTargetIfSelected",
            Builtin::RequestSelectionHeader => "requestSelectionHeader",
            Builtin::RequestSelectionValue => "requestSelectionValue",
            Builtin::RequestSelectionIfSelected => "requestSelectionIfSelected",
            Builtin::RequestActionHeader => "requestActionHeader",
            Builtin::RequestActionValue => "requestActionValue",
            Builtin::RequestActionIfSelected => "requestActionIfSelected",
            Builtin::OobSwapEnabled => "oobSwapEnabled",
            Builtin::OobSwapIfEnabled => "oobSwapIfEnabled",
            Builtin::BasePath => "basePath",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Whether `name` belongs to a built-in primitive.
pub fn is_protected(name: &str) -> bool {
    Builtin::from_name(name).is_some()
}

type FunctionImpl = dyn Fn(&[Value]) -> Result<Value, minijinja::Error> + Send + Sync;

/// A user-supplied template function.
///
/// Arguments arrive as a slice of values; [`minijinja::value::from_args`]
/// converts them into typed parameters.
#[derive(Clone)]
pub struct TemplateFunction(Arc<FunctionImpl>);

impl TemplateFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, minijinja::Error> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, minijinja::Error> {
        (self.0)(args)
    }

    /// Identity of the underlying callable.
    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for TemplateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplateFunction({:#x})", self.addr())
    }
}

/// Ordered map of user function names to callables.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, TemplateFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`.
    ///
    /// Protected names are rejected with a warning and leave the registry
    /// untouched. Returns whether the function was registered.
    pub fn insert(&mut self, name: impl Into<String>, function: TemplateFunction) -> bool {
        let name = name.into();
        if is_protected(&name) {
            tracing::warn!(function = %name, "function name is protected and cannot be overwritten");
            return false;
        }
        self.functions.insert(name, function);
        true
    }

    /// Register every entry of `other`, overriding same-named entries.
    pub fn merge(&mut self, other: &FunctionRegistry) {
        for (name, function) in &other.functions {
            self.insert(name.clone(), function.clone());
        }
    }

    /// Fill in entries of `inherited` that this registry does not define.
    pub fn merge_missing(&mut self, inherited: &FunctionRegistry) {
        for (name, function) in &inherited.functions {
            if !self.functions.contains_key(name) {
                self.functions.insert(name.clone(), function.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TemplateFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateFunction)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Identity token of this namespace.
    ///
    /// Two registries share a fingerprint exactly when they bind the same names
    /// to the same callables, so copies of a registry (which share their
    /// callables) compile to the same cached template.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (name, function) in &self.functions {
            name.hash(&mut hasher);
            function.addr().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl<N: Into<String>> FromIterator<(N, TemplateFunction)> for FunctionRegistry {
    fn from_iter<I: IntoIterator<Item = (N, TemplateFunction)>>(iter: I) -> Self {
        let mut registry = FunctionRegistry::new();
        for (name, function) in iter {
            registry.insert(name, function);
        }
        registry
    }
}
