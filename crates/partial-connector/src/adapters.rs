/*
 * adapters.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Header-based connector adapters.
//!
//! Every supported front-end library uses the same shape of protocol: one
//! header names the target partial, one the selection key, one the action.
//! Libraries only differ in the header names and in how a fragment request is
//! recognised, so a single [`HeaderConnector`] covers all of them.

use crate::request::RequestHead;
use crate::{Connector, ConnectorConfig};

/// How a [`HeaderConnector`] recognises a fragment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// The target header carries a non-empty value.
    TargetHeader,

    /// htmx semantics: `request` or `boosted` is `"true"` and the request is
    /// not a history restore.
    Htmx {
        request: &'static str,
        boosted: &'static str,
        history_restore: &'static str,
    },
}

/// A connector driven entirely by request headers.
#[derive(Debug, Clone)]
pub struct HeaderConnector {
    config: ConnectorConfig,
    target_header: &'static str,
    select_header: &'static str,
    action_header: &'static str,
    oob_attribute: &'static str,
    detection: Detection,
}

impl HeaderConnector {
    fn with_headers(
        config: ConnectorConfig,
        target_header: &'static str,
        select_header: &'static str,
        action_header: &'static str,
    ) -> Self {
        Self {
            config,
            target_header,
            select_header,
            action_header,
            oob_attribute: "x-swap-oob",
            detection: Detection::TargetHeader,
        }
    }

    /// The library-neutral protocol (`X-Target`, `X-Select`, `X-Action`).
    pub fn partial(config: ConnectorConfig) -> Self {
        Self::with_headers(config, "X-Target", "X-Select", "X-Action")
    }

    pub fn htmx(config: ConnectorConfig) -> Self {
        Self {
            oob_attribute: "hx-swap-oob",
            detection: Detection::Htmx {
                request: "HX-Request",
                boosted: "HX-Boosted",
                history_restore: "HX-History-Restore-Request",
            },
            ..Self::with_headers(config, "HX-Target", "X-Select", "X-Action")
        }
    }

    pub fn turbo(config: ConnectorConfig) -> Self {
        Self::with_headers(config, "Turbo-Frame", "Turbo-Select", "Turbo-Action")
    }

    pub fn unpoly(config: ConnectorConfig) -> Self {
        Self::with_headers(config, "X-Up-Target", "X-Up-Select", "X-Up-Action")
    }

    pub fn alpine(config: ConnectorConfig) -> Self {
        Self::with_headers(
            config,
            "X-Alpine-Target",
            "X-Alpine-Select",
            "X-Alpine-Action",
        )
    }

    /// Alpine AJAX shares the Alpine header names.
    pub fn alpine_ajax(config: ConnectorConfig) -> Self {
        Self::alpine(config)
    }

    pub fn stimulus(config: ConnectorConfig) -> Self {
        Self::with_headers(
            config,
            "X-Stimulus-Target",
            "X-Stimulus-Select",
            "X-Stimulus-Action",
        )
    }

    pub fn vue(config: ConnectorConfig) -> Self {
        Self::with_headers(config, "X-Vue-Target", "X-Vue-Select", "X-Vue-Action")
    }

    pub fn config(&self) -> ConnectorConfig {
        self.config
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Header value, falling back to the query parameter when configured.
    fn lookup(&self, request: &RequestHead, header: &str, query_key: &str) -> String {
        let value = request.header(header);
        if !value.is_empty() {
            return value.to_string();
        }

        if self.config.use_url_query {
            return request.query_param(query_key).unwrap_or_default();
        }

        String::new()
    }
}

impl Default for HeaderConnector {
    fn default() -> Self {
        Self::partial(ConnectorConfig::default())
    }
}

impl Connector for HeaderConnector {
    fn is_fragment_request(&self, request: &RequestHead) -> bool {
        match &self.detection {
            Detection::TargetHeader => !request.header(self.target_header).is_empty(),
            Detection::Htmx {
                request: request_header,
                boosted,
                history_restore,
            } => {
                let requested =
                    request.header(request_header) == "true" || request.header(boosted) == "true";
                requested && request.header(history_restore) != "true"
            }
        }
    }

    fn target_value(&self, request: &RequestHead) -> String {
        self.lookup(request, self.target_header, "target")
    }

    fn select_value(&self, request: &RequestHead) -> String {
        self.lookup(request, self.select_header, "select")
    }

    fn action_value(&self, request: &RequestHead) -> String {
        self.lookup(request, self.action_header, "action")
    }

    fn target_header(&self) -> &str {
        self.target_header
    }

    fn select_header(&self) -> &str {
        self.select_header
    }

    fn action_header(&self) -> &str {
        self.action_header
    }

    fn oob_attribute(&self) -> &str {
        self.oob_attribute
    }
}
