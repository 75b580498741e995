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

//! Builders for inbound wire messages.

/// Separator between the diagram and dictionary halves of a `DFD:` message.
pub const DD_SEPARATOR: &str = "\n:DD:\n";

/// `<id>:Json:<diagram>`
pub fn annotate(session: u64, diagram_json: &str) -> String {
    format!("{}:Json:{}", session, diagram_json)
}

/// `<id>:Json2DFD:<name>:<diagram>`
pub fn to_ecore(session: u64, name: &str, diagram_json: &str) -> String {
    format!("{}:Json2DFD:{}:{}", session, name, diagram_json)
}

/// `<id>:DFD:<name>:<diagram>\n:DD:\n<dictionary>`
pub fn from_ecore(session: u64, name: &str, diagram: &str, dictionary: &str) -> String {
    format!("{}:DFD:{}:{}{}{}", session, name, diagram, DD_SEPARATOR, dictionary)
}

/// `<id>:<bundle>`
pub fn component_model(session: u64, bundle: &str) -> String {
    format!("{}:{}", session, bundle)
}
