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

//! Web editor diagram document.
//!
//! Mirrors the JSON the browser editor saves and sends over the socket: a
//! sprotty model root with a flat list of nodes and edges, plus the label
//! types, constraints and editor mode that travel alongside it.
//!
//! # Field Preservation
//!
//! Only the fields the bridge reasons about are typed. Everything else
//! (positions, sizes, routing points, editor flags) is captured in a flattened
//! `extra` map on each object so that a document survives a round trip
//! through the bridge without losing editor state.
//!
//! # Null Handling
//!
//! The editor expects absent values to be omitted rather than sent as `null`.
//! Typed optional fields are skipped on output when `None`; explicit `null`
//! entries in the `extra` maps are dropped by [`WebEditorDfd::from_json`].

use crate::error::ModelResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extension fields carried through unchanged.
pub type Extra = Map<String, Value>;

/// A complete diagram document as exchanged with the web editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebEditorDfd {
    /// The sprotty model root.
    pub model: Model,

    /// Label types available in the diagram.
    #[serde(rename = "labelTypes", default, skip_serializing_if = "Option::is_none")]
    pub label_types: Option<Vec<LabelType>>,

    /// Constraints to evaluate against the diagram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<Constraint>>,

    /// Editor mode (for example `edit` or `readonly`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Saved diagram format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// The sprotty model root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A node or edge of the diagram.
///
/// Treated as an immutable value: updates build a new `Child` and splice it
/// into the parent sequence in place of the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelAssignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Port>>,
    #[serde(rename = "sourceId", default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(rename = "targetId", default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Child>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Assignment of a label type value to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAssignment {
    #[serde(rename = "labelTypeId")]
    pub label_type_id: String,
    #[serde(rename = "labelTypeValueId")]
    pub label_type_value_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An input or output port of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Assignment behavior source for output ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A label type with its possible values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<LabelTypeValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A single value of a [`LabelType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTypeValue {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A named constraint expression.
///
/// The bridge never interprets the expression; it is handed to the analysis
/// and copied back onto the outbound document verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub constraint: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A message attached to a node, rendered by the editor as an icon badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub message: String,
    pub icon: String,
    /// `#rrggbb` color the editor paints the node with.
    #[serde(rename = "color", default, skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
    /// Transpose flow graph the annotation belongs to.
    #[serde(rename = "tfg", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl WebEditorDfd {
    /// Parse a document, dropping explicit `null` extension fields.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let mut dfd: WebEditorDfd = serde_json::from_str(json)?;
        dfd.prune_nulls();
        Ok(dfd)
    }

    /// Serialize as indented JSON with absent fields omitted.
    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Constraints carried by the document, empty if none.
    pub fn constraint_list(&self) -> &[Constraint] {
        self.constraints.as_deref().unwrap_or(&[])
    }

    /// Whether the document carries at least one constraint.
    pub fn has_constraints(&self) -> bool {
        !self.constraint_list().is_empty()
    }

    /// Look up a top-level node or edge by id.
    pub fn node(&self, id: &str) -> Option<&Child> {
        self.model.children.iter().find(|child| child.id == id)
    }

    /// Ids of all top-level children, in document order.
    pub fn child_ids(&self) -> Vec<&str> {
        self.model.children.iter().map(|child| child.id.as_str()).collect()
    }

    fn prune_nulls(&mut self) {
        drop_null_entries(&mut self.extra);
        drop_null_entries(&mut self.model.extra);
        for child in &mut self.model.children {
            child.prune_nulls();
        }
        for label_type in self.label_types.iter_mut().flatten() {
            drop_null_entries(&mut label_type.extra);
            for value in &mut label_type.values {
                drop_null_entries(&mut value.extra);
            }
        }
        for constraint in self.constraints.iter_mut().flatten() {
            drop_null_entries(&mut constraint.extra);
        }
    }
}

impl Child {
    /// Build a replacement node carrying `extra` after the existing annotations.
    ///
    /// Existing annotations are kept in order; nothing is overwritten.
    pub fn with_annotations_appended(&self, extra: &[Annotation]) -> Child {
        let mut annotations = self.annotations.clone().unwrap_or_default();
        annotations.extend_from_slice(extra);
        Child {
            annotations: Some(annotations),
            ..self.clone()
        }
    }

    /// Annotations currently attached to the node.
    pub fn annotation_list(&self) -> &[Annotation] {
        self.annotations.as_deref().unwrap_or(&[])
    }

    fn prune_nulls(&mut self) {
        drop_null_entries(&mut self.extra);
        for port in self.ports.iter_mut().flatten() {
            drop_null_entries(&mut port.extra);
        }
        for label in self.labels.iter_mut().flatten() {
            drop_null_entries(&mut label.extra);
        }
        for annotation in self.annotations.iter_mut().flatten() {
            drop_null_entries(&mut annotation.extra);
        }
        for child in self.children.iter_mut().flatten() {
            child.prune_nulls();
        }
    }
}

fn drop_null_entries(map: &mut Extra) {
    map.retain(|_, value| !value.is_null());
}
