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

//! Violation annotation.
//!
//! Merges analysis results into a diagram: every node matched by a violation
//! receives one `Constraint <name> violated` annotation per violation, colored
//! by [`deterministic_color`] and grouped by the violation's flow graph.
//!
//! # Algorithm
//!
//! 1. Walk the violations in order and collect, per matched node id, the new
//!    annotations. A node id that does not exist in the diagram fails the
//!    whole pass (no partial annotation).
//! 2. For every collected node, build a replacement node whose annotation list
//!    is the original list followed by the new annotations.
//! 3. Splice each replacement into the top-level child sequence at the
//!    position of the node it replaces. Untouched nodes keep their relative
//!    order.

use crate::color::deterministic_color;
use crate::diagram::{Annotation, Child, Extra, WebEditorDfd};
use crate::error::{ModelError, ModelResult};
use crate::violation::Violation;
use std::collections::HashMap;

/// Icon the editor renders for violation annotations.
pub const VIOLATION_ICON: &str = "bolt";

/// Build the annotation a violation contributes to each matched node.
pub fn violation_annotation(violation: &Violation) -> Annotation {
    let message = violation.message();
    let color_hex = deterministic_color(&message);
    Annotation {
        message,
        icon: VIOLATION_ICON.to_string(),
        color_hex: Some(color_hex),
        group_id: Some(violation.flow_graph_id),
        extra: Extra::new(),
    }
}

/// Merge `violations` into `diagram`.
///
/// # Errors
///
/// Returns [`ModelError::NodeNotFound`] if a violation matches a node id that
/// is not a top-level child of the diagram. The diagram is not modified in
/// that case.
///
/// # Examples
///
/// ```
/// use dfd_model::{annotate, Violation, WebEditorDfd};
///
/// let json = r#"{"model": {"type": "graph", "id": "root", "children": [
///     {"type": "node:function", "id": "p", "text": "P"}
/// ]}}"#;
/// let diagram = WebEditorDfd::from_json(json).unwrap();
/// let violations = vec![Violation::new("C", ["p"], 1)];
///
/// let annotated = annotate(diagram, &violations).unwrap();
/// let node = annotated.node("p").unwrap();
/// assert_eq!(node.annotation_list()[0].message, "Constraint C violated");
/// ```
pub fn annotate(mut diagram: WebEditorDfd, violations: &[Violation]) -> ModelResult<WebEditorDfd> {
    let pending = collect_annotations(&diagram, violations)?;

    for (id, annotations) in pending {
        let position = diagram
            .model
            .children
            .iter()
            .position(|child| child.id == id)
            .ok_or_else(|| ModelError::NodeNotFound(id.clone()))?;
        let replacement = diagram.model.children[position].with_annotations_appended(&annotations);
        splice(&mut diagram.model.children, position, replacement);
    }

    Ok(diagram)
}

fn collect_annotations(
    diagram: &WebEditorDfd,
    violations: &[Violation],
) -> ModelResult<HashMap<String, Vec<Annotation>>> {
    let mut pending: HashMap<String, Vec<Annotation>> = HashMap::new();

    for violation in violations {
        let annotation = violation_annotation(violation);
        for node_id in &violation.matched_node_ids {
            if diagram.node(node_id).is_none() {
                return Err(ModelError::NodeNotFound(node_id.clone()));
            }
            pending
                .entry(node_id.clone())
                .or_default()
                .push(annotation.clone());
        }
    }

    Ok(pending)
}

fn splice(children: &mut Vec<Child>, position: usize, replacement: Child) {
    children.remove(position);
    children.insert(position, replacement);
}
