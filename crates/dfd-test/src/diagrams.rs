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

//! Diagram JSON documents as saved by the web editor.

/// Three nodes connected by two flows, with editor layout state.
pub const SIMPLE: &str = r##"{
  "model": {
    "type": "graph",
    "id": "root",
    "canvasBounds": {"x": 0.0, "y": 0.0, "width": 1200.0, "height": 800.0},
    "children": [
      {
        "type": "node:input-output",
        "id": "user",
        "text": "User",
        "position": {"x": 10.0, "y": 20.0},
        "labels": [{"labelTypeId": "sens", "labelTypeValueId": "personal"}],
        "ports": [{"type": "port:dfd-output", "id": "user-out", "behavior": "forward data"}]
      },
      {
        "type": "node:function",
        "id": "process",
        "text": "Process",
        "position": {"x": 200.0, "y": 20.0},
        "labels": [],
        "ports": [
          {"type": "port:dfd-input", "id": "process-in"},
          {"type": "port:dfd-output", "id": "process-out", "behavior": "forward request"}
        ]
      },
      {
        "type": "node:storage",
        "id": "db",
        "text": "Database",
        "position": {"x": 400.0, "y": 20.0},
        "labels": [{"labelTypeId": "loc", "labelTypeValueId": "eu"}],
        "ports": [{"type": "port:dfd-input", "id": "db-in"}]
      },
      {"type": "edge:arrow", "id": "flow1", "sourceId": "user-out", "targetId": "process-in", "text": "data"},
      {"type": "edge:arrow", "id": "flow2", "sourceId": "process-out", "targetId": "db-in", "text": "request"}
    ]
  },
  "labelTypes": [
    {"id": "sens", "name": "Sensitivity", "values": [{"id": "personal", "text": "Personal"}, {"id": "public", "text": "Public"}]},
    {"id": "loc", "name": "Location", "values": [{"id": "eu", "text": "EU"}, {"id": "nonEu", "text": "nonEU"}]}
  ],
  "mode": "edit",
  "version": 1
}"##;

/// [`SIMPLE`] where the process node already carries an annotation from an
/// earlier analysis pass. Label propagation annotations have no color or
/// flow graph.
pub const ANNOTATED: &str = r##"{
  "model": {
    "type": "graph",
    "id": "root",
    "children": [
      {"type": "node:input-output", "id": "user", "text": "User", "labels": [], "ports": []},
      {
        "type": "node:function",
        "id": "process",
        "text": "Process",
        "labels": [],
        "ports": [],
        "annotations": [{"message": "Propagated Sensitivity.Personal", "icon": "tag"}]
      },
      {"type": "node:storage", "id": "db", "text": "Database", "labels": [], "ports": []}
    ]
  },
  "version": 1
}"##;

/// [`SIMPLE`] plus two constraints for the analysis.
pub const WITH_CONSTRAINTS: &str = r##"{
  "model": {
    "type": "graph",
    "id": "root",
    "children": [
      {"type": "node:input-output", "id": "user", "text": "User", "labels": [{"labelTypeId": "sens", "labelTypeValueId": "personal"}], "ports": []},
      {"type": "node:function", "id": "process", "text": "Process", "labels": [], "ports": []},
      {"type": "node:storage", "id": "db", "text": "Database", "labels": [{"labelTypeId": "loc", "labelTypeValueId": "nonEu"}], "ports": []}
    ]
  },
  "labelTypes": [
    {"id": "sens", "name": "Sensitivity", "values": [{"id": "personal", "text": "Personal"}]},
    {"id": "loc", "name": "Location", "values": [{"id": "nonEu", "text": "nonEU"}]}
  ],
  "constraints": [
    {"id": "c1", "name": "NoSensitiveToPublic", "constraint": "data Sensitivity.Personal neverFlows vertex Location.nonEU"},
    {"name": "EncryptedStorage", "constraint": "data Sensitivity.Personal neverFlows vertex type Storage"}
  ],
  "mode": "edit",
  "version": 1
}"##;

/// A diagram with no children at all.
pub const EMPTY: &str = r#"{"model": {"type": "graph", "id": "root", "children": []}, "version": 1}"#;

/// All named diagram fixtures.
pub fn all() -> Vec<(&'static str, &'static str)> {
    vec![
        ("simple", SIMPLE),
        ("annotated", ANNOTATED),
        ("with_constraints", WITH_CONSTRAINTS),
        ("empty", EMPTY),
    ]
}

/// Build a diagram document with one node per id.
pub fn with_nodes(ids: &[&str]) -> String {
    let children: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "type": "node:function",
                "id": id,
                "text": id,
                "labels": [],
                "ports": []
            })
        })
        .collect();
    serde_json::json!({
        "model": {"type": "graph", "id": "root", "children": children},
        "version": 1
    })
    .to_string()
}
