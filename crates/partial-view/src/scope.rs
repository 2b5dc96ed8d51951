/*
 * scope.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Data visible to a rendering node.

use minijinja::Value;
use partial_connector::RequestHead;

use crate::context::RenderContext;
use crate::partial::Data;

/// The resolved data scope of one node render.
///
/// Built fresh for every render: `layout` and `service` are accumulated from
/// the outermost ancestor inward, so nothing merged for one request is visible
/// to another.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub context: RenderContext,
    pub request: Option<RequestHead>,
    /// Node-local data.
    pub data: Data,
    pub layout: Data,
    pub service: Data,
}

impl Scope {
    /// Template root value.
    pub(crate) fn to_value(
        &self,
        id: &str,
        extra: impl IntoIterator<Item = (String, Value)>,
    ) -> Value {
        let csrf = self.context.csrf();
        let mut root = Data::new();
        root.insert("id".to_string(), Value::from(id));
        root.insert("data".to_string(), Value::from(self.data.clone()));
        root.insert("layout".to_string(), Value::from(self.layout.clone()));
        root.insert("service".to_string(), Value::from(self.service.clone()));
        root.insert("global".to_string(), Value::from(self.service.clone()));
        root.insert(
            "csrf".to_string(),
            Value::from_iter([
                ("token", Value::from(csrf.token(&self.context))),
                ("key", Value::from(csrf.key())),
            ]),
        );
        root.insert(
            "locale".to_string(),
            Value::from(self.context.localizer().locale()),
        );
        if let Some(request) = &self.request {
            root.insert("request".to_string(), request_value(request));
        }
        root.extend(extra);
        Value::from(root)
    }
}

fn request_value(request: &RequestHead) -> Value {
    Value::from_iter([
        ("method", Value::from(request.method.as_str())),
        ("path", Value::from(request.path())),
        ("query", Value::from(request.uri.query().unwrap_or_default())),
        ("uri", Value::from(request.uri.to_string())),
    ])
}

/// Accumulate `layers`, ordered outermost first; later layers win.
pub fn layered<'a>(layers: impl IntoIterator<Item = &'a Data>) -> Data {
    let mut merged = Data::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
