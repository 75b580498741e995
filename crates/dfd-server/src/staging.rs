// Dweve DFD Bridge - Data Flow Diagram Analysis Backend
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scratch files for file-based conversions.
//!
//! The converter reads and writes model files on disk. Each request gets its
//! own directory below a process-scoped root, so two sessions staging a file
//! with the same name never touch each other's content. Directories are
//! removed when their [`StagingScope`] is dropped, and the root is removed
//! when the [`StagingArea`] is dropped.

use crate::protocol::validate_file_name;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};

const ROOT_PREFIX: &str = "dfd-bridge-";

/// Process-scoped scratch root.
#[derive(Debug)]
pub struct StagingArea {
    root: TempDir,
}

impl StagingArea {
    /// Create the scratch root in `parent`, or in the system temp directory.
    pub fn new(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(ROOT_PREFIX);
        let root = match parent {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        Ok(Self { root })
    }

    /// Path of the scratch root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Open a fresh directory for one request.
    ///
    /// `label` only makes the directory recognizable when inspecting the
    /// scratch root; uniqueness comes from the random suffix.
    pub fn scope(&self, label: &str) -> io::Result<StagingScope> {
        let dir = Builder::new()
            .prefix(&format!("{}-", label))
            .tempdir_in(self.root.path())?;
        Ok(StagingScope { dir })
    }
}

/// Scratch directory of one request, removed on drop.
#[derive(Debug)]
pub struct StagingScope {
    dir: TempDir,
}

impl StagingScope {
    /// Directory of this scope.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path `name` would have inside this scope.
    pub fn path(&self, name: &str) -> io::Result<PathBuf> {
        validate_file_name(name)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        Ok(self.dir.path().join(name))
    }

    /// Write `content` to `name` and flush it to disk.
    pub fn stage(&self, name: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.path(name)?;
        let mut file = File::create(&path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(path)
    }

    /// Remove the directory now, reporting failures.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_stage_writes_content() {
        let area = StagingArea::new(None).unwrap();
        let scope = area.scope("0-dfd").unwrap();
        let path = scope.stage("shop.datadictionary", "<dd/>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<dd/>");
        assert!(path.starts_with(area.path()));
    }

    #[test]
    fn test_scope_removed_on_drop() {
        let area = StagingArea::new(None).unwrap();
        let dir = {
            let scope = area.scope("1-pcm").unwrap();
            scope.stage("a.allocation", "x").unwrap();
            scope.dir().to_path_buf()
        };
        assert!(!dir.exists());
        assert!(area.path().exists());
    }

    #[test]
    fn test_close_removes_directory() {
        let area = StagingArea::new(None).unwrap();
        let scope = area.scope("2-json2dfd").unwrap();
        let dir = scope.dir().to_path_buf();
        scope.close().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_same_name_in_two_scopes() {
        let area = StagingArea::new(None).unwrap();
        let first = area.scope("3-dfd").unwrap();
        let second = area.scope("3-dfd").unwrap();
        let a = first.stage("m.dataflowdiagram", "first").unwrap();
        let b = second.stage("m.dataflowdiagram", "second").unwrap();
        assert_ne!(a, b);
        assert_eq!(fs::read_to_string(a).unwrap(), "first");
        assert_eq!(fs::read_to_string(b).unwrap(), "second");
    }

    #[test]
    fn test_rejects_path_components() {
        let area = StagingArea::new(None).unwrap();
        let scope = area.scope("4-dfd").unwrap();
        for name in ["../escape", "a/b", "..", ""] {
            let err = scope.stage(name, "x").unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "name {:?}", name);
        }
    }

    #[test]
    fn test_configured_parent_and_root_cleanup() {
        let parent = tempfile::tempdir().unwrap();
        let root = {
            let area = StagingArea::new(Some(parent.path())).unwrap();
            assert!(area.path().starts_with(parent.path()));
            area.path().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn test_concurrent_scopes() {
        let area = std::sync::Arc::new(StagingArea::new(None).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let area = std::sync::Arc::clone(&area);
                std::thread::spawn(move || {
                    let scope = area.scope("race").unwrap();
                    let content = format!("content-{}", i);
                    let path = scope.stage("same.usagemodel", &content).unwrap();
                    assert_eq!(fs::read_to_string(path).unwrap(), content);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
