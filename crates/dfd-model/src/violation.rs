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

//! Constraint violation records produced by the analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A constraint found to be broken on one transpose flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the violated constraint.
    pub name: String,

    /// Ids of the diagram nodes on which the violation was observed.
    #[serde(rename = "matchedNodeIds")]
    pub matched_node_ids: BTreeSet<String>,

    /// Grouping key of the flow graph the violation was found on.
    ///
    /// Stable within one analysis run only.
    #[serde(rename = "flowGraphId")]
    pub flow_graph_id: i64,
}

impl Violation {
    /// Create a violation matching the given node ids.
    pub fn new<I, S>(name: impl Into<String>, matched_node_ids: I, flow_graph_id: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            matched_node_ids: matched_node_ids.into_iter().map(Into::into).collect(),
            flow_graph_id,
        }
    }

    /// Annotation message shown on every matched node.
    pub fn message(&self) -> String {
        format!("Constraint {} violated", self.name)
    }
}
