/*
 * flow.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Multi-step page flows.
//!
//! A [`PageFlow`] is an ordered list of steps, each rendered by its own
//! partial. Progress through the flow (which steps validated, what each step
//! submitted) lives in a [`FlowSession`] that the application stores between
//! requests, typically in its session store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use partial_connector::RequestHead;
use serde::{Deserialize, Serialize};

use crate::partial::Partial;

/// Data submitted by one step.
pub type StepData = serde_json::Map<String, serde_json::Value>;

/// Checks a step's submission.
pub type ValidateFn = dyn Fn(&RequestHead, &StepData) -> anyhow::Result<()> + Send + Sync;

/// One step of a flow.
#[derive(Clone)]
pub struct FlowStep {
    pub name: String,
    pub partial: Arc<Partial>,
    /// `None` for informational steps.
    pub validate: Option<Arc<ValidateFn>>,
}

impl FlowStep {
    pub fn new(name: impl Into<String>, partial: Partial) -> Self {
        Self {
            name: name.into(),
            partial: Arc::new(partial),
            validate: None,
        }
    }

    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&RequestHead, &StepData) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Run the step's validator; steps without one always pass.
    pub fn validate(&self, request: &RequestHead, data: &StepData) -> anyhow::Result<()> {
        match &self.validate {
            Some(validate) => validate(request, data),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowStep")
            .field("name", &self.name)
            .field("partial", &self.partial.id)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// An ordered sequence of steps and the index of the current one.
#[derive(Debug, Clone, Default)]
pub struct PageFlow {
    pub steps: Vec<FlowStep>,
    pub current: usize,
}

impl PageFlow {
    pub fn new(steps: Vec<FlowStep>) -> Self {
        Self { steps, current: 0 }
    }

    pub fn current_step(&self) -> Option<&FlowStep> {
        self.steps.get(self.current)
    }

    /// Advance to the next step. Returns `false` on the last step.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.steps.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step. Returns `false` on the first step.
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn find_step(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name == name)
    }

    /// Move to the step called `name`.
    pub fn go_to(&mut self, name: &str) -> bool {
        match self.find_step(name) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// Whether every step before the current one validated in `session`.
    pub fn all_previous_validated(&self, session: &FlowSession) -> bool {
        if self.current_step().is_none() {
            return false;
        }
        self.steps[..self.current]
            .iter()
            .all(|step| session.is_validated(&step.name))
    }
}

/// Per-user progress through a flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSession {
    pub step_data: BTreeMap<String, StepData>,
    pub validated: BTreeMap<String, bool>,
    pub current: String,
}

impl FlowSession {
    pub fn set_step_validated(&mut self, step: impl Into<String>, valid: bool) {
        self.validated.insert(step.into(), valid);
    }

    pub fn is_validated(&self, step: &str) -> bool {
        self.validated.get(step).copied().unwrap_or(false)
    }

    pub fn set_step_data(&mut self, step: impl Into<String>, data: StepData) {
        self.step_data.insert(step.into(), data);
    }

    pub fn step_data(&self, step: &str) -> Option<&StepData> {
        self.step_data.get(step)
    }

    /// Every step's data merged into one map; later steps (by name) win.
    pub fn all_data(&self) -> StepData {
        let mut merged = StepData::new();
        for data in self.step_data.values() {
            for (key, value) in data {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}
