/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Server-side partial page rendering.
//!
//! A page is a tree of [`Partial`]s, each bound to templates and a data
//! scope. A full-page request renders the whole tree; a fragment request,
//! recognized by a [`Connector`], renders only the requested partial plus the
//! out-of-band partials its ancestors declare, so one response can update the
//! target and unrelated widgets together.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use partial_view::{InMemoryFs, Partial, RenderContext, RequestHead, Service};
//!
//! let fs = Arc::new(InMemoryFs::with_files([
//!     ("index.html", "<main>{{ child(\"content\") }}</main>"),
//!     ("content.html", "<p>{{ data.text }}</p>"),
//! ]));
//! let page = Partial::new(["index.html"])
//!     .with_child(Partial::with_id("content", ["content.html"]).add_data("text", "hello"));
//!
//! let service = Service::default();
//! let layout = service.new_layout().file_system(fs).set(page);
//!
//! let full = RequestHead::new(http::Method::GET, "/".parse().unwrap(), http::HeaderMap::new());
//! assert_eq!(
//!     layout.render_with_request(&RenderContext::new(), &full).unwrap(),
//!     "<main><p>hello</p></main>"
//! );
//!
//! let mut headers = http::HeaderMap::new();
//! headers.insert("X-Target", "content".parse().unwrap());
//! let fragment = RequestHead::new(http::Method::GET, "/".parse().unwrap(), headers);
//! assert_eq!(
//!     layout.render_with_request(&RenderContext::new(), &fragment).unwrap(),
//!     "<p>hello</p>"
//! );
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod flow;
pub mod fs;
pub mod functions;
pub mod helpers;
pub mod partial;
mod primitives;
mod render;
pub mod scope;
pub mod service;
pub mod tree;

pub use cache::{CompiledTemplate, TemplateCache};
pub use context::{CsrfToken, CsrfTokenValue, Localizer, RenderContext};
pub use error::{PartialError, Result};
pub use flow::{FlowSession, FlowStep, PageFlow};
pub use fs::{DirFs, FileSystem, InMemoryFs};
pub use functions::{Builtin, FunctionRegistry, TemplateFunction};
pub use helpers::default_functions;
pub use partial::{Data, Partial, Selection};
pub use render::Rendered;
pub use scope::Scope;
pub use service::{Config, Layout, Service};
pub use tree::{TreeNode, tree};

pub use minijinja::Value;
pub use partial_connector::{Connector, ConnectorConfig, HeaderConnector, RequestHead};
