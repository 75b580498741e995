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

use super::{BackendError, BackendResult, ConversionBackend};
use dfd_model::{Constraint, Violation, WebEditorDfd};
use std::path::Path;

/// Backend used when no converter is configured.
///
/// Diagrams pass through unchanged and no violations are reported. File-based
/// conversions are unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityBackend;

impl ConversionBackend for IdentityBackend {
    fn name(&self) -> &str {
        "identity"
    }

    fn normalize(&self, diagram: &WebEditorDfd) -> BackendResult<WebEditorDfd> {
        Ok(diagram.clone())
    }

    fn analyze(&self, _: &WebEditorDfd, _: &[Constraint]) -> BackendResult<Vec<Violation>> {
        Ok(Vec::new())
    }

    fn store_ecore(&self, _: &WebEditorDfd, _: &Path) -> BackendResult<()> {
        Err(BackendError::Unsupported("store_ecore"))
    }

    fn load_ecore(&self, _: &Path, _: &Path) -> BackendResult<WebEditorDfd> {
        Err(BackendError::Unsupported("load_ecore"))
    }

    fn load_component_model(&self, _: &Path, _: &Path, _: &Path) -> BackendResult<WebEditorDfd> {
        Err(BackendError::Unsupported("load_component_model"))
    }
}
