/*
 * tree.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Read-only snapshot of a partial tree, for diagnostics.

use std::fmt;

use serde::Serialize;

use crate::partial::Partial;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub depth: usize,
    pub nodes: Vec<TreeNode>,
}

/// Snapshot the ids of `partial` and its descendants.
///
/// Children appear in insertion order.
pub fn tree(partial: &Partial) -> TreeNode {
    node(partial, 0)
}

fn node(partial: &Partial, depth: usize) -> TreeNode {
    TreeNode {
        id: partial.id.clone(),
        depth,
        nodes: partial
            .children
            .values()
            .map(|child| node(child, depth + 1))
            .collect(),
    }
}

impl fmt::Display for TreeNode {
    /// One id per line, indented two spaces per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.id, indent = self.depth * 2)?;
        for child in &self.nodes {
            write!(f, "{child}")?;
        }
        Ok(())
    }
}
