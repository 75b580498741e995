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

//! Data Flow Diagram Model
//!
//! The web editor's diagram document and the constraint-violation annotator
//! that overlays analysis results onto it.
//!
//! # Modules
//!
//! - [`diagram`]: the JSON document (`WebEditorDfd`, nodes, ports, labels)
//! - [`violation`]: analysis findings referencing diagram nodes
//! - [`annotate`](mod@annotate): merging violations into a diagram
//! - [`color`]: deterministic per-message annotation colors
//!
//! # Examples
//!
//! ```rust
//! use dfd_model::{annotate, Violation, WebEditorDfd};
//!
//! let json = r#"{"model": {"type": "graph", "id": "root", "children": [
//!     {"type": "node:storage", "id": "db", "text": "Database"}
//! ]}, "version": 1}"#;
//!
//! let diagram = WebEditorDfd::from_json(json).unwrap();
//! let annotated = annotate(diagram, &[Violation::new("Encrypted", ["db"], 0)]).unwrap();
//! println!("{}", annotated.to_json_pretty().unwrap());
//! ```

pub mod annotate;
pub mod color;
pub mod diagram;
mod error;
pub mod violation;

pub use annotate::{annotate, violation_annotation, VIOLATION_ICON};
pub use color::{deterministic_color, hsb_to_rgb};
pub use diagram::{
    Annotation, Child, Constraint, Extra, LabelAssignment, LabelType, LabelTypeValue, Model, Port,
    WebEditorDfd,
};
pub use error::{ModelError, ModelResult};
pub use violation::Violation;
