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

//! Error types for the diagram model.

use thiserror::Error;

/// Diagram model error type.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A violation references a node id that is not part of the diagram.
    ///
    /// The analysis result and the diagram being annotated are out of sync;
    /// the whole annotation pass is rejected rather than applied partially.
    #[error("Violation references unknown node: {0}")]
    NodeNotFound(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
