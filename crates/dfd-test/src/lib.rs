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

//! Shared test fixtures for the DFD bridge crates.
//!
//! Fixtures are plain text on purpose: the bridge consumes text frames, and
//! keeping the fixtures untyped lets every crate (including `dfd-model`
//! itself) parse them with its own types.
//!
//! # Quick Start
//!
//! ```rust
//! use dfd_test::{diagrams, wire};
//!
//! let message = wire::annotate(0, diagrams::SIMPLE);
//! assert!(message.starts_with("0:Json:"));
//! ```

pub mod bundles;
pub mod diagrams;
pub mod ecore;
pub mod wire;

use serde_json::Value;

/// Ids of the top-level children of a diagram document, in order.
///
/// Returns an empty list if the text is not a diagram document.
pub fn child_ids(diagram_json: &str) -> Vec<String> {
    let value: Value = match serde_json::from_str(diagram_json) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    value["model"]["children"]
        .as_array()
        .map(|children| {
            children
                .iter()
                .filter_map(|c| c["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
