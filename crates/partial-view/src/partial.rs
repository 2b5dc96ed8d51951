/*
 * partial.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The partial node.
//!
//! A [`Partial`] is a named unit of markup: an ordered template list, a data
//! scope, child partials it can pull in by id, and capability overrides
//! (connector, filesystem, cache) that descendants inherit when they do not
//! set their own.
//!
//! Nodes are built with a consuming builder and then treated as immutable
//! definitions. Children are held behind `Arc`, so a tree can be shared by
//! concurrent renders; rendering never mutates a definition, it works on
//! cheap clones instead.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hashlink::{LinkedHashMap, LinkedHashSet};
use minijinja::Value;
use partial_connector::Connector;

use crate::cache::TemplateCache;
use crate::fs::FileSystem;
use crate::functions::{FunctionRegistry, TemplateFunction};
use crate::helpers::default_functions;
use crate::scope::Scope;

/// Key to value map exposed to templates.
pub type Data = BTreeMap<String, Value>;

/// Callback that decides which node to render.
///
/// Receives the node being rendered and its resolved scope and returns the
/// node to render instead (possibly a modified copy of the input).
pub type ActionFn = dyn Fn(&Partial, &Scope) -> anyhow::Result<Partial> + Send + Sync;

/// Named alternatives resolved by the request's select value.
#[derive(Debug, Clone)]
pub struct Selection {
    pub default: String,
    pub partials: LinkedHashMap<String, Arc<Partial>>,
}

impl Selection {
    pub fn get(&self, key: &str) -> Option<&Arc<Partial>> {
        self.partials.get(key)
    }
}

/// A composable unit of server-rendered markup.
#[derive(Clone)]
pub struct Partial {
    pub(crate) id: String,
    pub(crate) templates: Vec<String>,
    pub(crate) data: Data,
    pub(crate) layout_data: Data,
    pub(crate) global_data: Data,
    pub(crate) functions: FunctionRegistry,
    pub(crate) children: LinkedHashMap<String, Arc<Partial>>,
    pub(crate) oob_children: LinkedHashSet<String>,
    pub(crate) selection: Option<Arc<Selection>>,
    pub(crate) action: Option<Arc<ActionFn>>,
    pub(crate) template_action: Option<Arc<ActionFn>>,
    pub(crate) swap_oob: bool,
    pub(crate) always_swap_oob: bool,
    pub(crate) connector: Option<Arc<dyn Connector>>,
    pub(crate) file_system: Option<Arc<dyn FileSystem>>,
    pub(crate) cache: Option<Arc<TemplateCache>>,
    pub(crate) use_cache: Option<bool>,
    pub(crate) response_headers: Option<BTreeMap<String, String>>,
    pub(crate) base_path: Option<String>,
}

impl Partial {
    /// Create a node with id `root` rendering `templates`.
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: "root".to_string(),
            templates: templates.into_iter().map(Into::into).collect(),
            data: Data::new(),
            layout_data: Data::new(),
            global_data: Data::new(),
            functions: default_functions(),
            children: LinkedHashMap::new(),
            oob_children: LinkedHashSet::new(),
            selection: None,
            action: None,
            template_action: None,
            swap_oob: false,
            always_swap_oob: false,
            connector: None,
            file_system: None,
            cache: None,
            use_cache: None,
            response_headers: None,
            base_path: None,
        }
    }

    /// Create a node with the given id.
    pub fn with_id<I, S>(id: impl Into<String>, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(templates).id(id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    /// Clear data, children and out-of-band markers.
    pub fn reset(mut self) -> Self {
        self.data.clear();
        self.layout_data.clear();
        self.global_data.clear();
        self.children.clear();
        self.oob_children.clear();
        self
    }

    /// Replace the node-local data.
    pub fn data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn add_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Merge `data` into the node-local data.
    ///
    /// Existing keys are only replaced when `overwrite` is set.
    pub fn merge_data(mut self, data: Data, overwrite: bool) -> Self {
        merge_into(&mut self.data, data, overwrite);
        self
    }

    pub fn layout_data(mut self, data: Data) -> Self {
        self.layout_data = data;
        self
    }

    pub fn global_data(mut self, data: Data) -> Self {
        self.global_data = data;
        self
    }

    /// Register a template function on this node.
    ///
    /// Built-in names are rejected with a warning.
    pub fn add_function(mut self, name: impl Into<String>, function: TemplateFunction) -> Self {
        self.functions.insert(name, function);
        self
    }

    /// Register every function of `functions`, overriding same-named ones.
    pub fn merge_functions(mut self, functions: &FunctionRegistry) -> Self {
        self.functions.merge(functions);
        self
    }

    /// Replace the node's function registry, dropping the default helpers.
    pub fn functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Attach `child`, replacing any child with the same id.
    pub fn with_child(mut self, child: Partial) -> Self {
        self.oob_children.remove(&child.id);
        self.children.insert(child.id.clone(), Arc::new(child));
        self
    }

    /// Attach `child` and mark it as out-of-band.
    pub fn with_oob(mut self, child: Partial) -> Self {
        let id = child.id.clone();
        self = self.with_child(child);
        self.oob_children.insert(id);
        self
    }

    /// Declare the alternatives rendered by the `selection` primitive.
    pub fn with_selection<I>(mut self, default: impl Into<String>, partials: I) -> Self
    where
        I: IntoIterator<Item = (String, Partial)>,
    {
        let partials = partials
            .into_iter()
            .map(|(key, partial)| (key, Arc::new(partial)))
            .collect();
        self.selection = Some(Arc::new(Selection {
            default: default.into(),
            partials,
        }));
        self
    }

    /// Run `action` before rendering; the node it returns is rendered instead.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Partial, &Scope) -> anyhow::Result<Partial> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Supply the node rendered by the `action` template primitive.
    pub fn with_template_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Partial, &Scope) -> anyhow::Result<Partial> + Send + Sync + 'static,
    {
        self.template_action = Some(Arc::new(action));
        self
    }

    /// Render this node even when an ancestor's out-of-band pass reaches it
    /// on the way to the requested target.
    pub fn always_swap_oob(mut self, always: bool) -> Self {
        self.always_swap_oob = always;
        self
    }

    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.file_system = Some(fs);
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Compile into `cache` instead of the process-wide cache.
    pub fn cache(mut self, cache: Arc<TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn response_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.response_headers = Some(headers);
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_templates(&self) -> &[String] {
        &self.templates
    }

    pub fn get_data(&self) -> &Data {
        &self.data
    }

    pub fn get_child(&self, id: &str) -> Option<&Arc<Partial>> {
        self.children.get(id)
    }

    pub fn children(&self) -> impl Iterator<Item = &Arc<Partial>> {
        self.children.values()
    }

    /// Ids of out-of-band children in declaration order.
    pub fn oob_ids(&self) -> impl Iterator<Item = &str> {
        self.oob_children.iter().map(String::as_str)
    }

    pub fn is_oob(&self, id: &str) -> bool {
        self.oob_children.contains(id)
    }

    pub fn get_selection(&self) -> Option<&Selection> {
        self.selection.as_deref()
    }

    pub fn get_response_headers(&self) -> Option<&BTreeMap<String, String>> {
        self.response_headers.as_ref()
    }

    pub fn get_function(&self, name: &str) -> Option<&TemplateFunction> {
        self.functions.get(name)
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("id", &self.id)
            .field("templates", &self.templates)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .field("oob_children", &self.oob_children)
            .field("swap_oob", &self.swap_oob)
            .finish_non_exhaustive()
    }
}

/// Merge `from` into `into`, keeping existing keys unless `overwrite` is set.
pub(crate) fn merge_into(into: &mut Data, from: Data, overwrite: bool) {
    for (key, value) in from {
        if overwrite || !into.contains_key(&key) {
            into.insert(key, value);
        }
    }
}
