/*
 * primitives.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in template primitives.
//!
//! Compiled templates are shared between renders, so the primitives are
//! registered once per environment and find the node they run for through a
//! hidden frame handle in the template context.

use std::sync::Arc;

use minijinja::value::{Object, ObjectRepr, Rest};
use minijinja::{Environment, Error, ErrorKind, HtmlEscape, State, Value};

use crate::error::PartialError;
use crate::functions::Builtin;
use crate::partial::merge_into;
use crate::render::{Frame, render_self};

/// Context key holding the current [`FrameHandle`].
pub(crate) const FRAME_KEY: &str = "__partial_frame";

/// Template-visible handle on the frame being rendered.
#[derive(Debug)]
pub(crate) struct FrameHandle(pub(crate) Arc<Frame>);

impl Object for FrameHandle {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }
}

/// Register every built-in primitive on `env`.
pub(crate) fn install(env: &mut Environment<'static>) {
    env.add_function(Builtin::Child.name(), child);
    env.add_function(Builtin::ChildIf.name(), child_if);
    env.add_function(Builtin::Selection.name(), selection);
    env.add_function(Builtin::Action.name(), action);
    env.add_function(Builtin::Url.name(), url);
    env.add_function(Builtin::UrlIs.name(), url_is);
    env.add_function(Builtin::UrlStarts.name(), url_starts);
    env.add_function(Builtin::UrlContains.name(), url_contains);
    env.add_function(Builtin::RequestTargetHeader.name(), request_target_header);
    env.add_function(Builtin::RequestTargetValue.name(), request_target_value);
    env.add_function(Builtin::RequestTargetIfSelected.name(), request_target_if_selected);
    env.add_function(Builtin::RequestSelectionHeader.name(), request_selection_header);
    env.add_function(Builtin::RequestSelectionValue.name(), request_selection_value);
    env.add_function(
        Builtin::RequestSelectionIfSelected.name(),
        request_selection_if_selected,
    );
    env.add_function(Builtin::RequestActionHeader.name(), request_action_header);
    env.add_function(Builtin::RequestActionValue.name(), request_action_value);
    env.add_function(Builtin::RequestActionIfSelected.name(), request_action_if_selected);
    env.add_function(Builtin::OobSwapEnabled.name(), oob_swap_enabled);
    env.add_function(Builtin::OobSwapIfEnabled.name(), oob_swap_if_enabled);
    env.add_function(Builtin::BasePath.name(), base_path);
}

fn current_frame(state: &State) -> Result<Arc<Frame>, Error> {
    state
        .lookup(FRAME_KEY)
        .and_then(|value| value.downcast_object::<FrameHandle>())
        .map(|handle| Arc::clone(&handle.0))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                "partial primitives are only available while rendering a partial",
            )
        })
}

/// Stash a hard failure on the render and abort template execution.
fn fail(frame: &Frame, err: PartialError) -> Error {
    let message = err.to_string();
    frame.state.set_failure(err);
    Error::new(ErrorKind::InvalidOperation, message)
}

/// Inline diagnostic rendered in place of a failing fragment.
fn diagnostic(message: String) -> Value {
    Value::from_safe_string(message)
}

fn child(state: &State, id: String, pairs: Rest<Value>) -> Result<Value, Error> {
    let frame = current_frame(state)?;
    render_child(&frame, &id, &pairs, false)
}

fn child_if(state: &State, id: String, pairs: Rest<Value>) -> Result<Value, Error> {
    let frame = current_frame(state)?;
    render_child(&frame, &id, &pairs, true)
}

fn render_child(frame: &Arc<Frame>, id: &str, pairs: &[Value], optional: bool) -> Result<Value, Error> {
    let Some(definition) = frame.node.children.get(id) else {
        if optional {
            return Ok(Value::from(""));
        }
        tracing::warn!(id = %id, parent = %frame.id(), "child partial not found");
        return Ok(diagnostic(format!(
            "child partial '{}' not found in parent '{}'",
            HtmlEscape(id),
            HtmlEscape(frame.id())
        )));
    };

    if pairs.len() % 2 != 0 {
        tracing::warn!(id = %id, "invalid child data for partial, they come in key-value pairs");
        return Ok(diagnostic(format!(
            "invalid child data for partial '{}'",
            HtmlEscape(id)
        )));
    }

    let mut extra = crate::partial::Data::new();
    for pair in pairs.chunks(2) {
        let Some(key) = pair[0].as_str() else {
            tracing::warn!(id = %id, key = %pair[0], "invalid child data key for partial, it must be a string");
            return Ok(diagnostic(format!(
                "invalid child data key for partial '{}', want string, got {}",
                HtmlEscape(id),
                pair[0].kind()
            )));
        };
        extra.insert(key.to_string(), pair[1].clone());
    }

    let mut node = (**definition).clone();
    merge_into(&mut node.data, extra, true);
    frame.mark_rendered(id);

    let html = render_self(frame.child(Arc::new(node))).map_err(|err| {
        tracing::error!(id = %id, error = %err, "error rendering partial");
        fail(frame, err)
    })?;
    Ok(Value::from_safe_string(html))
}

fn selection(state: &State) -> Result<Value, Error> {
    let frame = current_frame(state)?;
    let Some(selection) = frame.node.selection.clone() else {
        tracing::error!(id = %frame.id(), "no selection partials found");
        return Ok(diagnostic(format!(
            "no selection partials found in parent '{}'",
            HtmlEscape(frame.id())
        )));
    };

    let requested = frame
        .request()
        .map(|request| frame.connector().select_value(request))
        .unwrap_or_default();
    let key = if requested.is_empty() {
        selection.default.clone()
    } else {
        requested
    };

    let Some(alternative) = selection.get(&key) else {
        tracing::error!(id = %key, parent = %frame.id(), "selected partial not found");
        return Ok(diagnostic(format!(
            "selected partial '{}' not found in parent '{}'",
            HtmlEscape(&key),
            HtmlEscape(frame.id())
        )));
    };

    let mut node = (**alternative).clone();
    node.file_system = Some(frame.file_system());

    let html = render_self(frame.child(Arc::new(node))).map_err(|err| {
        tracing::error!(id = %key, parent = %frame.id(), error = %err, "error rendering selected partial");
        fail(&frame, err)
    })?;
    Ok(Value::from_safe_string(html))
}

fn action(state: &State) -> Result<Value, Error> {
    let frame = current_frame(state)?;
    let Some(callback) = frame.node.template_action.clone() else {
        tracing::error!(id = %frame.id(), "no action callback found");
        return Ok(diagnostic(format!(
            "no action callback found in partial '{}'",
            HtmlEscape(frame.id())
        )));
    };

    let scope = frame.scope();
    let node = callback(frame.node.as_ref(), &scope).map_err(|err| {
        tracing::error!(id = %frame.id(), error = %err, "error in template action");
        fail(
            &frame,
            PartialError::TemplateAction {
                id: frame.id().to_string(),
                source: err.into(),
            },
        )
    })?;

    let html = render_self(frame.child(Arc::new(node))).map_err(|err| {
        tracing::error!(id = %frame.id(), error = %err, "error rendering action partial");
        fail(&frame, err)
    })?;
    Ok(Value::from_safe_string(html))
}

/// The request URI, safe to place in text and quoted attributes.
///
/// A parsed URI cannot hold `<`, `>` or `"`, so only `&` and `'` need
/// escaping; `/` is left alone.
fn url(state: &State) -> Result<Value, Error> {
    let frame = current_frame(state)?;
    Ok(frame.request().map_or(Value::UNDEFINED, |request| {
        let uri = request.uri.to_string();
        Value::from_safe_string(uri.replace('&', "&amp;").replace('\'', "&#x27;"))
    }))
}

fn current_path(state: &State) -> Result<Option<String>, Error> {
    let frame = current_frame(state)?;
    Ok(frame.request().map(|request| request.path().to_string()))
}

fn url_is(state: &State, candidate: String) -> Result<bool, Error> {
    Ok(current_path(state)?
        .is_some_and(|path| path.trim_matches('/') == candidate.trim_matches('/')))
}

fn url_starts(state: &State, prefix: String) -> Result<bool, Error> {
    Ok(current_path(state)?.is_some_and(|path| path.starts_with(prefix.as_str())))
}

fn url_contains(state: &State, needle: String) -> Result<bool, Error> {
    Ok(current_path(state)?.is_some_and(|path| path.contains(needle.as_str())))
}

/// The connector value of kind `kind` for the current request.
fn requested(frame: &Frame, kind: Builtin) -> String {
    let Some(request) = frame.request() else {
        return String::new();
    };
    let connector = frame.connector();
    match kind {
        Builtin::RequestTargetValue => connector.target_value(request),
        Builtin::RequestSelectionValue => connector.select_value(request),
        _ => connector.action_value(request),
    }
}

fn if_selected(current: &str, value: Value, candidates: &[String]) -> Value {
    if candidates.iter().any(|candidate| candidate == current) {
        value
    } else {
        Value::UNDEFINED
    }
}

fn request_target_header(state: &State) -> Result<String, Error> {
    Ok(current_frame(state)?.connector().target_header().to_string())
}

fn request_target_value(state: &State) -> Result<String, Error> {
    Ok(requested(&*current_frame(state)?, Builtin::RequestTargetValue))
}

fn request_target_if_selected(
    state: &State,
    value: Value,
    candidates: Rest<String>,
) -> Result<Value, Error> {
    let current = requested(&*current_frame(state)?, Builtin::RequestTargetValue);
    Ok(if_selected(&current, value, &candidates))
}

fn request_selection_header(state: &State) -> Result<String, Error> {
    Ok(current_frame(state)?.connector().select_header().to_string())
}

fn request_selection_value(state: &State) -> Result<String, Error> {
    let frame = current_frame(state)?;
    let value = requested(&frame, Builtin::RequestSelectionValue);
    if value.is_empty() {
        return Ok(frame
            .node
            .selection
            .as_ref()
            .map(|selection| selection.default.clone())
            .unwrap_or_default());
    }
    Ok(value)
}

fn request_selection_if_selected(
    state: &State,
    value: Value,
    candidates: Rest<String>,
) -> Result<Value, Error> {
    let current = requested(&*current_frame(state)?, Builtin::RequestSelectionValue);
    Ok(if_selected(&current, value, &candidates))
}

fn request_action_header(state: &State) -> Result<String, Error> {
    Ok(current_frame(state)?.connector().action_header().to_string())
}

fn request_action_value(state: &State) -> Result<String, Error> {
    Ok(requested(&*current_frame(state)?, Builtin::RequestActionValue))
}

fn request_action_if_selected(
    state: &State,
    value: Value,
    candidates: Rest<String>,
) -> Result<Value, Error> {
    let current = requested(&*current_frame(state)?, Builtin::RequestActionValue);
    Ok(if_selected(&current, value, &candidates))
}

fn oob_swap_enabled(state: &State) -> Result<bool, Error> {
    Ok(current_frame(state)?.node.swap_oob)
}

fn oob_swap_if_enabled(state: &State, value: String) -> Result<Value, Error> {
    let frame = current_frame(state)?;
    if !frame.node.swap_oob {
        return Ok(Value::from_safe_string(String::new()));
    }
    let attribute = format!(
        "{}=\"{}\"",
        frame.connector().oob_attribute(),
        HtmlEscape(&value)
    );
    Ok(Value::from_safe_string(attribute))
}

/// The configured base path, emitted verbatim.
fn base_path(state: &State) -> Result<Value, Error> {
    Ok(Value::from_safe_string(current_frame(state)?.base_path()))
}
