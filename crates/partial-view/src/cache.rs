/*
 * cache.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiled template cache.
//!
//! A compiled template is a minijinja environment holding every template of a
//! node's ordered template list plus the function namespace active when it was
//! compiled. Entries are keyed by the template list, the namespace
//! fingerprint and the identity of the filesystem the sources came from.
//!
//! Lookups are optimistic reads; on a miss a per-key mutex serializes
//! compilation so each key compiles at most once while unrelated keys compile
//! in parallel.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use minijinja::value::Rest;
use minijinja::{AutoEscape, Environment, Value};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::error::{PartialError, Result};
use crate::fs::FileSystem;
use crate::functions::FunctionRegistry;
use crate::primitives;

static GLOBAL_CACHE: Lazy<Arc<TemplateCache>> = Lazy::new(|| Arc::new(TemplateCache::new()));

/// Build the cache key for a template list read from `fs` under a function
/// namespace.
///
/// Filesystems are keyed by identity: the same paths read through two
/// filesystem instances compile to separate entries.
pub fn cache_key(
    templates: &[String],
    functions: &FunctionRegistry,
    fs: &Arc<dyn FileSystem>,
) -> String {
    let fs_id = Arc::as_ptr(fs).cast::<()>() as usize;
    format!(
        "{};funcs:{:016x};fs:{fs_id:x}",
        templates.join(";"),
        functions.fingerprint()
    )
}

/// A parsed template set ready to render.
pub struct CompiledTemplate {
    env: Environment<'static>,
    entry: String,
    /// Held so the filesystem's address, part of the cache key, cannot be
    /// reused by another filesystem while this entry is cached.
    source: Arc<dyn FileSystem>,
}

impl CompiledTemplate {
    /// Parse every template in `templates` from `fs` and register the
    /// built-in primitives and `functions`.
    ///
    /// Templates are registered under their paths, so the first template can
    /// reach the others through `include`, `extends` and `import`. Output is
    /// HTML-escaped whatever the template's extension.
    pub fn compile(
        templates: &[String],
        fs: &Arc<dyn FileSystem>,
        functions: &FunctionRegistry,
    ) -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        for path in templates {
            let source = fs
                .read_to_string(path)
                .map_err(|source| PartialError::TemplateSource {
                    path: path.clone(),
                    source,
                })?;
            env.add_template_owned(path.clone(), source)
                .map_err(|source| PartialError::TemplateSyntax {
                    template: path.clone(),
                    source,
                })?;
        }

        primitives::install(&mut env);

        for (name, function) in functions.iter() {
            let function = function.clone();
            env.add_function(name.to_string(), move |args: Rest<Value>| {
                function.call(&args)
            });
        }

        let entry = templates.first().cloned().unwrap_or_default();
        Ok(Self {
            env,
            entry,
            source: Arc::clone(fs),
        })
    }

    /// Name of the template that is executed.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// The filesystem the sources were read from.
    pub fn source(&self) -> &Arc<dyn FileSystem> {
        &self.source
    }

    pub(crate) fn render(&self, ctx: Value) -> Result<String> {
        let template = self
            .env
            .get_template(&self.entry)
            .map_err(|source| PartialError::TemplateSyntax {
                template: self.entry.clone(),
                source,
            })?;
        template
            .render(ctx)
            .map_err(|source| PartialError::TemplateRender {
                template: self.entry.clone(),
                source,
            })
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// Memoized template compilation shared by concurrent renders.
#[derive(Default)]
pub struct TemplateCache {
    templates: RwLock<HashMap<String, Arc<CompiledTemplate>>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    compilations: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by nodes that were not given one.
    pub fn global() -> Arc<TemplateCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    pub fn get(&self, key: &str) -> Option<Arc<CompiledTemplate>> {
        self.templates.read().get(key).cloned()
    }

    /// Return the cached template for `key`, compiling it on a miss.
    ///
    /// With `use_cache` off the template is compiled on every call and never
    /// stored.
    pub fn get_or_compile<F>(
        &self,
        key: &str,
        use_cache: bool,
        compile: F,
    ) -> Result<Arc<CompiledTemplate>>
    where
        F: FnOnce() -> Result<CompiledTemplate>,
    {
        if !use_cache {
            return self.compile_counted(compile).map(Arc::new);
        }

        if let Some(template) = self.get(key) {
            return Ok(template);
        }

        let key_lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        let _guard = key_lock.lock();

        if let Some(template) = self.get(key) {
            return Ok(template);
        }

        let template = Arc::new(self.compile_counted(compile)?);
        self.templates
            .write()
            .insert(key.to_string(), Arc::clone(&template));
        tracing::debug!(key = %key, "compiled template");
        Ok(template)
    }

    fn compile_counted<F>(&self, compile: F) -> Result<CompiledTemplate>
    where
        F: FnOnce() -> Result<CompiledTemplate>,
    {
        self.compilations.fetch_add(1, Ordering::Relaxed);
        compile()
    }

    /// Number of compilations performed so far, cached or not.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    /// Drop every cached template.
    pub fn clear(&self) {
        self.templates.write().clear();
        self.locks.lock().clear();
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("len", &self.len())
            .field("compilations", &self.compilations())
            .finish()
    }
}
