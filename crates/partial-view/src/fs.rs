/*
 * fs.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template source lookup.
//!
//! Partials name their templates by path; a [`FileSystem`] turns those paths
//! into template text. Nodes inherit the filesystem of their nearest ancestor
//! that sets one.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Trait for loading template sources.
pub trait FileSystem: fmt::Debug + Send + Sync {
    /// Read the template at `path` as UTF-8 text.
    ///
    /// Paths are slash separated and relative to the filesystem root.
    fn read_to_string(&self, path: &str) -> io::Result<String>;
}

/// Filesystem rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem rooted at the process working directory.
    pub fn working_dir() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSystem for DirFs {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("template path escapes filesystem root: {path}"),
            ));
        }
        std::fs::read_to_string(self.root.join(relative))
    }
}

/// Filesystem backed by an in-memory map of path to contents.
///
/// Useful for tests and for templates bundled into the binary.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFs {
    files: HashMap<String, String>,
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem with the given files.
    pub fn with_files(
        files: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut fs = Self::new();
        for (name, content) in files {
            fs.add_file(name, content);
        }
        fs
    }

    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.files.insert(name.into(), content.into());
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for InMemoryFs {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file not found: {path}"))
        })
    }
}
