/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for partial rendering.
//!
//! Only structural problems are errors. Content-level problems inside a
//! template (a missing child, an unknown selection key, malformed child
//! arguments) render an inline diagnostic instead and never reach the caller.

use thiserror::Error;

/// Boxed error produced by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Hard failures that abort a render.
#[derive(Debug, Error)]
pub enum PartialError {
    /// The node has no template to render.
    #[error("no templates provided for partial '{id}'")]
    NoTemplates { id: String },

    /// A fragment request named a target that is not in the addressed subtree.
    #[error("requested partial '{target}' not found in parent '{parent}'")]
    TargetNotFound { target: String, parent: String },

    /// The pre-render action callback failed.
    #[error("action for partial '{id}' failed: {source}")]
    Action {
        id: String,
        #[source]
        source: BoxError,
    },

    /// The template action callback failed.
    #[error("template action for partial '{id}' failed: {source}")]
    TemplateAction {
        id: String,
        #[source]
        source: BoxError,
    },

    /// A template source could not be read from the filesystem.
    #[error("unable to read template '{path}': {source}")]
    TemplateSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A template source failed to parse.
    #[error("error parsing template '{template}': {source}")]
    TemplateSyntax {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// A template failed while executing.
    #[error("error executing template '{template}': {source}")]
    TemplateRender {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// Rendering an out-of-band child of an ancestor failed.
    #[error("error rendering OOB child '{id}' of '{parent}': {source}")]
    OutOfBand {
        id: String,
        parent: String,
        #[source]
        source: Box<PartialError>,
    },

    /// A response header collected on the tree is not a valid HTTP header.
    #[error("invalid response header '{name}'")]
    InvalidHeader { name: String },

    /// A layout was rendered without content.
    #[error("layout has no content partial")]
    NoContent,

    /// Writing the rendered output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for partial rendering.
pub type Result<T> = std::result::Result<T, PartialError>;
