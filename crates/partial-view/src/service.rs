/*
 * service.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Application entry points.
//!
//! A [`Service`] holds what every page of an application shares: service-wide
//! data, the function namespace, the connector and the template cache. Each
//! request builds a [`Layout`] from it, sets the content partial and
//! optionally a wrapper, and renders.

use std::io;
use std::sync::Arc;

use http::HeaderMap;
use minijinja::Value;
use parking_lot::RwLock;
use partial_connector::{Connector, HeaderConnector, RequestHead};

use crate::cache::TemplateCache;
use crate::context::RenderContext;
use crate::error::{PartialError, Result};
use crate::fs::FileSystem;
use crate::functions::{FunctionRegistry, TemplateFunction};
use crate::helpers::default_functions;
use crate::partial::{Data, Partial, merge_into};
use crate::render::{Frame, RenderState, Rendered, render_root};

/// Service configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Fragment-request adapter; the `X-Target` family of headers when unset.
    pub connector: Option<Arc<dyn Connector>>,
    /// Cache compiled templates. Off recompiles on every render.
    pub use_cache: bool,
    /// Function namespace; the default helper library when unset.
    pub functions: Option<FunctionRegistry>,
    /// Template source for every layout of the service.
    pub file_system: Option<Arc<dyn FileSystem>>,
    /// Cache instance; a fresh cache owned by the service when unset.
    pub cache: Option<Arc<TemplateCache>>,
}

/// Shared rendering configuration of an application.
#[derive(Debug)]
pub struct Service {
    connector: Arc<dyn Connector>,
    use_cache: bool,
    file_system: Option<Arc<dyn FileSystem>>,
    cache: Arc<TemplateCache>,
    data: RwLock<Data>,
    functions: RwLock<FunctionRegistry>,
}

impl Service {
    pub fn new(config: Config) -> Self {
        Self {
            connector: config
                .connector
                .unwrap_or_else(|| Arc::new(HeaderConnector::default())),
            use_cache: config.use_cache,
            file_system: config.file_system,
            cache: config.cache.unwrap_or_default(),
            data: RwLock::new(Data::new()),
            functions: RwLock::new(config.functions.unwrap_or_else(default_functions)),
        }
    }

    /// Start a layout for one request.
    pub fn new_layout(&self) -> Layout {
        Layout {
            connector: Arc::clone(&self.connector),
            use_cache: self.use_cache,
            cache: Arc::clone(&self.cache),
            file_system: self.file_system.clone(),
            service_data: self.data.read().clone(),
            functions: self.functions.read().clone(),
            data: Data::new(),
            content: None,
            wrapper: None,
        }
    }

    /// Replace the service-wide data.
    pub fn set_data(&self, data: Data) {
        *self.data.write() = data;
    }

    pub fn add_data(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.write().insert(key.into(), value.into());
    }

    pub fn data(&self) -> Data {
        self.data.read().clone()
    }

    /// Register a function for every layout created afterwards.
    pub fn add_function(&self, name: impl Into<String>, function: TemplateFunction) -> bool {
        self.functions.write().insert(name, function)
    }

    /// Register every entry of `functions`, overriding same-named entries.
    pub fn merge_functions(&self, functions: &FunctionRegistry) {
        self.functions.write().merge(functions);
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Content partial, optional wrapper and the configuration applied to them.
#[derive(Debug, Clone)]
pub struct Layout {
    connector: Arc<dyn Connector>,
    use_cache: bool,
    cache: Arc<TemplateCache>,
    file_system: Option<Arc<dyn FileSystem>>,
    service_data: Data,
    functions: FunctionRegistry,
    data: Data,
    content: Option<Partial>,
    wrapper: Option<Partial>,
}

impl Layout {
    /// Read templates from `fs`.
    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Set the content partial.
    pub fn set(mut self, content: Partial) -> Self {
        self.content = Some(content);
        self
    }

    /// Wrap the content in `wrapper`, which pulls it in as a child.
    pub fn wrap(mut self, wrapper: Partial) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// Replace the layout data.
    pub fn data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn add_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn add_function(mut self, name: impl Into<String>, function: TemplateFunction) -> Self {
        self.functions.insert(name, function);
        self
    }

    pub fn merge_functions(mut self, functions: &FunctionRegistry) -> Self {
        self.functions.merge(functions);
        self
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    /// Copy of `partial` carrying the layout's configuration.
    ///
    /// Data and functions the partial sets itself take precedence.
    fn apply(&self, partial: &Partial) -> Partial {
        let mut applied = partial.clone();
        applied.connector = Some(Arc::clone(&self.connector));
        if let Some(fs) = &self.file_system {
            applied.file_system = Some(Arc::clone(fs));
        }
        applied.use_cache = Some(self.use_cache);
        applied.cache = Some(Arc::clone(&self.cache));
        merge_into(&mut applied.global_data, self.service_data.clone(), false);
        merge_into(&mut applied.layout_data, self.data.clone(), false);
        applied.functions.merge_missing(&self.functions);
        applied
    }

    /// The frame renders start from, and the content frame a fragment
    /// request without a target renders.
    fn frames(&self, state: Arc<RenderState>) -> Result<(Arc<Frame>, Option<Arc<Frame>>)> {
        let content = self.content.as_ref().ok_or_else(|| {
            tracing::error!("layout has no content partial");
            PartialError::NoContent
        })?;
        let content = self.apply(content);

        match &self.wrapper {
            Some(wrapper) => {
                let content = Arc::new(content);
                let mut wrapper = self.apply(wrapper);
                wrapper.oob_children.remove(&content.id);
                wrapper
                    .children
                    .insert(content.id.clone(), Arc::clone(&content));
                let root = Frame::root(Arc::new(wrapper), state);
                let content = root.child(content);
                Ok((root, Some(content)))
            }
            None => Ok((Frame::root(Arc::new(content), state), None)),
        }
    }

    /// Render for `request`, honoring fragment requests.
    pub fn render_with_request(&self, ctx: &RenderContext, request: &RequestHead) -> Result<String> {
        self.render_response(ctx, request).map(|rendered| rendered.body)
    }

    /// Render without a request.
    pub fn render(&self, ctx: &RenderContext) -> Result<String> {
        let (root, _) = self.frames(RenderState::new(ctx, None))?;
        render_root(root, None).map(|rendered| rendered.body)
    }

    /// Render for `request`, keeping the response headers set on the tree.
    pub fn render_response(&self, ctx: &RenderContext, request: &RequestHead) -> Result<Rendered> {
        let (root, content) = self.frames(RenderState::new(ctx, Some(request)))?;
        render_root(root, content).inspect_err(|err| {
            tracing::error!(error = %err, "error rendering layout");
        })
    }

    /// Render for `request`, apply the collected headers to `headers` and
    /// write the markup to `out`.
    pub fn write_with_request<W: io::Write>(
        &self,
        ctx: &RenderContext,
        request: &RequestHead,
        headers: &mut HeaderMap,
        out: &mut W,
    ) -> Result<()> {
        self.render_response(ctx, request)?.write_to(headers, out)
    }
}
