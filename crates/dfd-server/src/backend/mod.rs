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

//! Conversion and analysis backends.
//!
//! The bridge does not convert models or evaluate constraints itself. It
//! hands the work to a [`ConversionBackend`] and only deals with framing,
//! staging and annotation. All calls are blocking and run on worker threads.

mod identity;
mod process;

pub use identity::IdentityBackend;
pub use process::{ConverterCommand, ProcessBackend};

use dfd_model::{Constraint, Violation, WebEditorDfd};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of the Ecore diagram file.
pub const DIAGRAM_EXTENSION: &str = "dataflowdiagram";
/// Extension of the Ecore dictionary file.
pub const DICTIONARY_EXTENSION: &str = "datadictionary";

/// Failure inside a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The converter process exited unsuccessfully.
    #[error("converter exited with {status}: {stderr}")]
    Process { status: String, stderr: String },

    /// The backend does not implement this operation.
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Model conversion and constraint analysis.
pub trait ConversionBackend: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Round-trip a diagram through the Ecore representation.
    fn normalize(&self, diagram: &WebEditorDfd) -> BackendResult<WebEditorDfd>;

    /// Evaluate `constraints` against the diagram's flow graphs.
    fn analyze(
        &self,
        diagram: &WebEditorDfd,
        constraints: &[Constraint],
    ) -> BackendResult<Vec<Violation>>;

    /// Write the Ecore pair to `<base>.dataflowdiagram` and `<base>.datadictionary`.
    fn store_ecore(&self, diagram: &WebEditorDfd, base: &Path) -> BackendResult<()>;

    /// Read an Ecore pair into a diagram.
    fn load_ecore(&self, diagram: &Path, dictionary: &Path) -> BackendResult<WebEditorDfd>;

    /// Convert a component model into a diagram.
    fn load_component_model(
        &self,
        usage_model: &Path,
        allocation: &Path,
        node_characteristics: &Path,
    ) -> BackendResult<WebEditorDfd>;
}

/// Paths [`ConversionBackend::store_ecore`] writes for `base`.
pub fn ecore_paths(base: &Path) -> (PathBuf, PathBuf) {
    (
        with_suffix(base, DIAGRAM_EXTENSION),
        with_suffix(base, DICTIONARY_EXTENSION),
    )
}

fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}
