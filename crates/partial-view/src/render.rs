/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rendering pipeline.
//!
//! A render walks the definition tree through [`Frame`]s: one frame per node
//! being rendered, linked to the frame of the node that pulled it in. Frames
//! carry the upward links that the definitions themselves do not have, so
//! every inherited lookup (connector, filesystem, cache, data layers,
//! functions) is answered by walking the frame chain.
//!
//! Full-page requests render the root as itself. Fragment requests render the
//! requested target, found by a depth-first search, followed by the
//! out-of-band children of each of its ancestors.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::sync::Arc;

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Response};
use minijinja::Value;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use partial_connector::{Connector, HeaderConnector, RequestHead};

use crate::cache::{CompiledTemplate, TemplateCache, cache_key};
use crate::context::RenderContext;
use crate::error::{PartialError, Result};
use crate::fs::{DirFs, FileSystem};
use crate::functions::FunctionRegistry;
use crate::partial::Partial;
use crate::primitives::{FRAME_KEY, FrameHandle};
use crate::scope::{Scope, layered};

static DEFAULT_CONNECTOR: Lazy<Arc<dyn Connector>> =
    Lazy::new(|| Arc::new(HeaderConnector::default()));

/// Shared so that cache keys stay stable across renders.
static WORKING_DIR_FS: Lazy<Arc<dyn FileSystem>> = Lazy::new(|| Arc::new(DirFs::working_dir()));

/// State shared by every frame of one render call.
pub(crate) struct RenderState {
    pub(crate) context: RenderContext,
    pub(crate) request: Option<RequestHead>,
    headers: Mutex<Option<BTreeMap<String, String>>>,
    failure: Mutex<Option<PartialError>>,
}

impl RenderState {
    pub(crate) fn new(context: &RenderContext, request: Option<&RequestHead>) -> Arc<Self> {
        Arc::new(Self {
            context: context.clone(),
            request: request.cloned(),
            headers: Mutex::new(None),
            failure: Mutex::new(None),
        })
    }

    fn set_headers(&self, headers: Option<BTreeMap<String, String>>) {
        *self.headers.lock() = headers;
    }

    /// Remember a hard failure raised inside a template primitive.
    pub(crate) fn set_failure(&self, err: PartialError) {
        *self.failure.lock() = Some(err);
    }

    fn take_failure(&self) -> Option<PartialError> {
        self.failure.lock().take()
    }
}

/// One node being rendered and the frame that pulled it in.
pub(crate) struct Frame {
    pub(crate) node: Arc<Partial>,
    pub(crate) parent: Option<Arc<Frame>>,
    pub(crate) state: Arc<RenderState>,
    rendered: Arc<Mutex<HashSet<String>>>,
}

impl Frame {
    pub(crate) fn root(node: Arc<Partial>, state: Arc<RenderState>) -> Arc<Frame> {
        Arc::new(Frame {
            node,
            parent: None,
            state,
            rendered: Arc::default(),
        })
    }

    /// Frame for `node` rendered from within this frame.
    pub(crate) fn child(self: &Arc<Self>, node: Arc<Partial>) -> Arc<Frame> {
        Arc::new(Frame {
            node,
            parent: Some(Arc::clone(self)),
            state: Arc::clone(&self.state),
            rendered: Arc::default(),
        })
    }

    /// Same position in the tree, different node.
    fn substitute(&self, node: Arc<Partial>) -> Arc<Frame> {
        Arc::new(Frame {
            node,
            parent: self.parent.clone(),
            state: Arc::clone(&self.state),
            rendered: Arc::clone(&self.rendered),
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.node.id
    }

    /// This frame followed by its ancestors, nearest first.
    fn ancestors(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(Some(self), |frame| frame.parent.as_deref())
    }

    pub(crate) fn request(&self) -> Option<&RequestHead> {
        self.state.request.as_ref()
    }

    pub(crate) fn connector(&self) -> Arc<dyn Connector> {
        self.ancestors()
            .find_map(|frame| frame.node.connector.clone())
            .unwrap_or_else(|| Arc::clone(&DEFAULT_CONNECTOR))
    }

    pub(crate) fn file_system(&self) -> Arc<dyn FileSystem> {
        match self.ancestors().find_map(|frame| frame.node.file_system.clone()) {
            Some(fs) => fs,
            None => {
                tracing::debug!(id = %self.id(), "no filesystem configured, reading templates from the working directory");
                Arc::clone(&WORKING_DIR_FS)
            }
        }
    }

    fn cache(&self) -> Arc<TemplateCache> {
        self.ancestors()
            .find_map(|frame| frame.node.cache.clone())
            .unwrap_or_else(TemplateCache::global)
    }

    fn use_cache(&self) -> bool {
        self.ancestors()
            .find_map(|frame| frame.node.use_cache)
            .unwrap_or(false)
    }

    pub(crate) fn base_path(&self) -> String {
        self.ancestors()
            .find_map(|frame| frame.node.base_path.clone())
            .unwrap_or_default()
    }

    /// Headers set on this node or its nearest ancestor that has any.
    pub(crate) fn response_headers(&self) -> Option<BTreeMap<String, String>> {
        self.ancestors()
            .find_map(|frame| frame.node.response_headers.clone())
    }

    /// The node's functions completed with every ancestor's.
    pub(crate) fn functions(&self) -> FunctionRegistry {
        let mut merged = self.node.functions.clone();
        for ancestor in self.ancestors().skip(1) {
            merged.merge_missing(&ancestor.node.functions);
        }
        merged
    }

    pub(crate) fn scope(&self) -> Scope {
        let chain: Vec<&Frame> = self.ancestors().collect();
        Scope {
            context: self.state.context.clone(),
            request: self.state.request.clone(),
            data: self.node.data.clone(),
            layout: layered(chain.iter().rev().map(|frame| &frame.node.layout_data)),
            service: layered(chain.iter().rev().map(|frame| &frame.node.global_data)),
        }
    }

    /// Record that this frame's template pulled in child `id`.
    pub(crate) fn mark_rendered(&self, id: &str) {
        self.rendered.lock().insert(id.to_string());
    }

    fn was_rendered(&self, id: &str) -> bool {
        self.rendered.lock().contains(id)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<&str> = self.ancestors().map(Frame::id).collect();
        f.debug_struct("Frame").field("path", &path).finish()
    }
}

/// Run the node's pre-render action, if any, and return the frame of the
/// node that actually renders.
fn resolve_action(frame: Arc<Frame>) -> Result<Arc<Frame>> {
    let Some(action) = frame.node.action.clone() else {
        return Ok(frame);
    };
    let scope = frame.scope();
    let node = action(frame.node.as_ref(), &scope).map_err(|err| {
        tracing::error!(id = %frame.id(), error = %err, "error in action function");
        PartialError::Action {
            id: frame.id().to_string(),
            source: err.into(),
        }
    })?;
    Ok(frame.substitute(Arc::new(node)))
}

/// Render the frame's node as itself.
pub(crate) fn render_self(frame: Arc<Frame>) -> Result<String> {
    render_node(&resolve_action(frame)?)
}

/// Render a node whose action already ran.
fn render_node(frame: &Arc<Frame>) -> Result<String> {
    let span = tracing::debug_span!("partial", id = %frame.id());
    let _enter = span.enter();

    let node = &frame.node;
    if node.templates.is_empty() {
        tracing::error!(id = %node.id, "no templates provided for rendering");
        return Err(PartialError::NoTemplates {
            id: node.id.clone(),
        });
    }

    let functions = frame.functions();
    let fs = frame.file_system();
    let key = cache_key(&node.templates, &functions, &fs);
    let compiled = frame
        .cache()
        .get_or_compile(&key, frame.use_cache(), || {
            CompiledTemplate::compile(&node.templates, &fs, &functions)
        })
        .inspect_err(|err| {
            tracing::error!(id = %node.id, error = %err, "error getting or parsing template");
        })?;

    let ctx = frame.scope().to_value(
        &node.id,
        [(
            FRAME_KEY.to_string(),
            Value::from_object(FrameHandle(Arc::clone(frame))),
        )],
    );

    compiled.render(ctx).map_err(|err| match frame.state.take_failure() {
        Some(failure) => failure,
        None => {
            tracing::error!(template = %compiled.entry(), error = %err, "error executing template");
            err
        }
    })
}

/// Render the node whose output is returned, recording the response headers
/// of its nearest ancestor that set any.
fn render_primary(frame: Arc<Frame>) -> Result<(Arc<Frame>, String)> {
    let frame = resolve_action(frame)?;
    frame.state.set_headers(frame.response_headers());
    let out = render_node(&frame)?;
    Ok((frame, out))
}

/// Full-page render: the node itself, then any out-of-band children its
/// template did not pull in.
fn render_full(frame: Arc<Frame>) -> Result<String> {
    let (frame, mut out) = render_primary(frame)?;
    out.push_str(&render_oob_children(&frame, frame.node.swap_oob, OobPass::Appended)?);
    Ok(out)
}

/// Fragment render addressed to `target`.
fn render_fragment(frame: Arc<Frame>, target: &str) -> Result<String> {
    if target.is_empty() || target == frame.id() {
        let (frame, mut out) = render_primary(frame)?;
        out.push_str(&render_ancestor_oob(&frame)?);
        return Ok(out);
    }

    let mut visited = HashSet::new();
    let Some(path) = find_descendant(&frame.node, target, &mut visited) else {
        tracing::error!(id = %target, parent = %frame.id(), "requested partial not found in parent");
        return Err(PartialError::TargetNotFound {
            target: target.to_string(),
            parent: frame.id().to_string(),
        });
    };

    let found = path
        .into_iter()
        .fold(frame, |current, node| current.child(node));
    render_fragment(found, target)
}

/// Path from `node` (exclusive) down to the descendant with id `target`.
///
/// Direct children are checked before descending.
fn find_descendant(
    node: &Arc<Partial>,
    target: &str,
    visited: &mut HashSet<*const Partial>,
) -> Option<Vec<Arc<Partial>>> {
    if !visited.insert(Arc::as_ptr(node)) {
        return None;
    }

    if let Some(child) = node.children.get(target) {
        return Some(vec![Arc::clone(child)]);
    }

    for child in node.children.values() {
        if let Some(mut path) = find_descendant(child, target, visited) {
            path.insert(0, Arc::clone(child));
            return Some(path);
        }
    }

    None
}

/// Which out-of-band children an OOB pass renders.
#[derive(Debug, Clone, Copy)]
enum OobPass<'a> {
    /// After a full-page body: those the template did not reference.
    Appended,
    /// After a fragment, for one of its ancestors: all of them except the
    /// child `on_path` leading down to the fragment.
    Ancestor { on_path: &'a str },
}

fn render_ancestor_oob(frame: &Arc<Frame>) -> Result<String> {
    let mut out = String::new();
    let mut below = frame;
    while let Some(ancestor) = &below.parent {
        let chunk = render_oob_children(ancestor, true, OobPass::Ancestor { on_path: below.id() })
            .inspect_err(|err| {
                tracing::error!(error = %err, "error rendering OOB children from ancestors");
            })?;
        out.push_str(&chunk);
        below = ancestor;
    }
    Ok(out)
}

fn render_oob_children(frame: &Arc<Frame>, swap_oob: bool, pass: OobPass<'_>) -> Result<String> {
    let mut out = String::new();
    for id in &frame.node.oob_children {
        let Some(child) = frame.node.children.get(id) else {
            continue;
        };
        let skip = match pass {
            OobPass::Appended => frame.was_rendered(id),
            OobPass::Ancestor { on_path } => id == on_path && !child.always_swap_oob,
        };
        if skip {
            continue;
        }

        let mut oob = (**child).clone();
        oob.swap_oob = swap_oob;
        let chunk = render_self(frame.child(Arc::new(oob))).map_err(|err| PartialError::OutOfBand {
            id: id.clone(),
            parent: frame.id().to_string(),
            source: Box::new(err),
        })?;
        out.push_str(&chunk);
    }
    Ok(out)
}

/// Render a tree rooted at `root` for the frame's request.
///
/// A fragment request without a target renders `default_target` when given,
/// otherwise the root.
pub(crate) fn render_root(
    root: Arc<Frame>,
    default_target: Option<Arc<Frame>>,
) -> Result<Rendered> {
    let body = match root.request() {
        Some(request) => {
            let connector = root.connector();
            if connector.is_fragment_request(request) {
                let target = connector.target_value(request);
                match default_target {
                    Some(frame) if target.is_empty() => render_fragment(frame, "")?,
                    _ => render_fragment(Arc::clone(&root), &target)?,
                }
            } else {
                render_full(Arc::clone(&root))?
            }
        }
        None => render_full(Arc::clone(&root))?,
    };

    let headers = root.state.headers.lock().take();
    Ok(Rendered {
        body,
        headers: header_map(headers)?,
    })
}

fn header_map(headers: Option<BTreeMap<String, String>>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers.into_iter().flatten() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| PartialError::InvalidHeader { name: name.clone() })?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|_| PartialError::InvalidHeader { name: name.clone() })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Markup plus the response headers collected while producing it.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub body: String,
    pub headers: HeaderMap,
}

impl Rendered {
    /// An HTML response carrying the body and collected headers.
    pub fn into_response(self) -> Response<String> {
        let mut response = Response::new(self.body);
        *response.headers_mut() = self.headers;
        response
            .headers_mut()
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("text/html; charset=utf-8"));
        response
    }

    /// Copy the headers into `headers` and write the body to `out`.
    pub fn write_to<W: io::Write>(self, headers: &mut HeaderMap, out: &mut W) -> Result<()> {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        out.write_all(self.body.as_bytes()).inspect_err(|err| {
            tracing::error!(error = %err, "error writing partial to response");
        })?;
        Ok(())
    }
}

impl Partial {
    /// Render for `request`, honoring fragment requests.
    pub fn render_with_request(&self, ctx: &RenderContext, request: &RequestHead) -> Result<String> {
        self.render_response(ctx, request).map(|rendered| rendered.body)
    }

    /// Render without a request.
    ///
    /// Request primitives report empty values and the whole tree is rendered.
    pub fn render(&self, ctx: &RenderContext) -> Result<String> {
        let state = RenderState::new(ctx, None);
        render_root(Frame::root(Arc::new(self.clone()), state), None).map(|rendered| rendered.body)
    }

    /// Render for `request`, keeping the response headers set on the tree.
    pub fn render_response(&self, ctx: &RenderContext, request: &RequestHead) -> Result<Rendered> {
        let state = RenderState::new(ctx, Some(request));
        render_root(Frame::root(Arc::new(self.clone()), state), None)
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
        self.render_response(ctx, request)
            .inspect_err(|err| tracing::error!(id = %self.id, error = %err, "error rendering partial"))?
            .write_to(headers, out)
    }
}
