/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Front-end library adapters for partial page rendering.
//!
//! A [`Connector`] decides whether an incoming request asks for a fragment of
//! the page instead of the full document, and which partial, selection and
//! action the client wants. Each hypermedia library announces this through its
//! own request headers:
//!
//! | Adapter | Target header | Fragment when |
//! |---------|---------------|---------------|
//! | [`HeaderConnector::partial`] | `X-Target` | target header is set |
//! | [`HeaderConnector::htmx`] | `HX-Target` | `HX-Request`/`HX-Boosted` is `true` |
//! | [`HeaderConnector::turbo`] | `Turbo-Frame` | target header is set |
//! | [`HeaderConnector::unpoly`] | `X-Up-Target` | target header is set |
//! | [`HeaderConnector::alpine`] | `X-Alpine-Target` | target header is set |
//! | [`HeaderConnector::alpine_ajax`] | `X-Alpine-Target` | target header is set |
//! | [`HeaderConnector::stimulus`] | `X-Stimulus-Target` | target header is set |
//! | [`HeaderConnector::vue`] | `X-Vue-Target` | target header is set |
//!
//! Adapters only look at the request head, so every request is first reduced
//! to a [`RequestHead`].
//!
//! # Example
//!
//! ```
//! use partial_connector::{Connector, ConnectorConfig, HeaderConnector, RequestHead};
//!
//! let request = http::Request::builder()
//!     .uri("/items?select=tab2")
//!     .header("HX-Request", "true")
//!     .header("HX-Target", "items")
//!     .body(())
//!     .unwrap();
//! let head = RequestHead::from_request(&request);
//!
//! let htmx = HeaderConnector::htmx(ConnectorConfig { use_url_query: true });
//! assert!(htmx.is_fragment_request(&head));
//! assert_eq!(htmx.target_value(&head), "items");
//! assert_eq!(htmx.select_value(&head), "tab2");
//! ```

pub mod adapters;
pub mod request;

pub use adapters::{Detection, HeaderConnector};
pub use request::RequestHead;

use std::fmt;

/// Options shared by the header-based adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Fall back to the `target`, `select` and `action` query parameters when
    /// the corresponding header is absent.
    pub use_url_query: bool,
}

/// Classifies requests for the partial rendering engine.
///
/// Implementations must be cheap to call: the engine consults the connector
/// several times per render (once per request-derived template function).
pub trait Connector: fmt::Debug + Send + Sync {
    /// Whether this request asks for a fragment rather than the full page.
    fn is_fragment_request(&self, request: &RequestHead) -> bool;

    /// The id of the partial the client wants rendered, or `""`.
    fn target_value(&self, request: &RequestHead) -> String;

    /// The selection key the client asked for, or `""`.
    fn select_value(&self, request: &RequestHead) -> String;

    /// The action the client asked for, or `""`.
    fn action_value(&self, request: &RequestHead) -> String;

    fn target_header(&self) -> &str;

    fn select_header(&self) -> &str;

    fn action_header(&self) -> &str;

    /// Attribute the client library reads to apply an out-of-band fragment.
    fn oob_attribute(&self) -> &str {
        "x-swap-oob"
    }
}
