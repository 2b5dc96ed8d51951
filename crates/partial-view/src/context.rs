/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Request-scoped render context.
//!
//! A [`RenderContext`] travels with every render call and is handed to action
//! callbacks. Applications stash request-scoped values in it (the CSRF
//! provider, the localizer, an authenticated user); lookups fall back to
//! process-wide defaults when nothing was stored.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use http::Extensions;

/// Header name the default CSRF provider reports as its key.
pub const DEFAULT_CSRF_KEY: &str = "X-CSRF-Token";

/// Locale reported when no [`Localizer`] is stored in the context.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Type map of request-scoped values.
#[derive(Clone, Default)]
pub struct RenderContext {
    extensions: Extensions,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a request's extensions.
    pub fn from_extensions(extensions: Extensions) -> Self {
        Self { extensions }
    }

    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    /// Builder form of [`RenderContext::insert`].
    pub fn with<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn with_csrf(self, csrf: Arc<dyn CsrfToken>) -> Self {
        self.with(csrf)
    }

    pub fn with_localizer(self, localizer: Arc<dyn Localizer>) -> Self {
        self.with(localizer)
    }

    /// The CSRF provider for this request, or the default one.
    pub fn csrf(&self) -> Arc<dyn CsrfToken> {
        match self.get::<Arc<dyn CsrfToken>>() {
            Some(csrf) => Arc::clone(csrf),
            None => Arc::new(DefaultCsrf::new()),
        }
    }

    /// The localizer for this request, or the default one.
    pub fn localizer(&self) -> Arc<dyn Localizer> {
        match self.get::<Arc<dyn Localizer>>() {
            Some(localizer) => Arc::clone(localizer),
            None => Arc::new(DefaultLocalizer::default()),
        }
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("len", &self.extensions.len())
            .finish()
    }
}

/// Supplies the CSRF token rendered into forms.
pub trait CsrfToken: Send + Sync {
    fn token(&self, context: &RenderContext) -> String;

    /// Name of the header or form field that carries the token.
    fn key(&self) -> String;
}

/// A raw token stored in the context, picked up by the default provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfTokenValue(pub String);

#[derive(Debug, Clone)]
struct DefaultCsrf {
    token: String,
}

impl DefaultCsrf {
    fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self {
            token: format!("invalid-token-{nanos}"),
        }
    }
}

impl CsrfToken for DefaultCsrf {
    fn token(&self, context: &RenderContext) -> String {
        match context.get::<CsrfTokenValue>() {
            Some(CsrfTokenValue(token)) => token.clone(),
            None => self.token.clone(),
        }
    }

    fn key(&self) -> String {
        DEFAULT_CSRF_KEY.to_string()
    }
}

/// Supplies the locale of the current request.
pub trait Localizer: Send + Sync {
    fn locale(&self) -> String;
}

#[derive(Debug, Clone)]
struct DefaultLocalizer {
    locale: String,
}

impl Default for DefaultLocalizer {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl Localizer for DefaultLocalizer {
    fn locale(&self) -> String {
        self.locale.clone()
    }
}
