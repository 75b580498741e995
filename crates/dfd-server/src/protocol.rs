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

//! Wire framing between the web editor and the bridge.
//!
//! # Inbound
//!
//! One text frame per request: `<sessionId>:<tag><rest>`. The tag is resolved
//! by a fixed-priority prefix scan, first match wins:
//!
//! - `Json:` followed by diagram JSON: [`Request::Annotate`]
//! - `Json2DFD:` followed by `<name>:<diagram JSON>`: [`Request::ConvertToEcore`]
//! - `DFD:` followed by `<name>:<diagram>\n:DD:\n<dictionary>`:
//!   [`Request::ConvertFromEcorePair`]
//! - no tag, records separated by `---FILE---`:
//!   [`Request::ConvertFromComponentModel`]
//!
//! # Outbound
//!
//! - On connect: `ID assigned:<id>`
//! - Reply: `<id>:<payload>`, where the payload is indented JSON with absent
//!   fields omitted, the Ecore pair text, or `Error:<message>`
//! - On shutdown: `Shutdown`

use crate::error::{BridgeError, ProtocolError};
use crate::registry::SessionId;
use dfd_model::WebEditorDfd;
use memchr::memmem;
use std::fmt;

/// Tag of the analyze-and-annotate request.
pub const TAG_ANNOTATE: &str = "Json:";
/// Tag of the diagram JSON to Ecore pair request.
pub const TAG_TO_ECORE: &str = "Json2DFD:";
/// Tag of the Ecore pair to diagram JSON request.
pub const TAG_FROM_ECORE: &str = "DFD:";
/// Separator between the diagram and the dictionary of an Ecore pair.
pub const DD_SEPARATOR: &str = "\n:DD:\n";
/// Separator between the records of a component-model bundle.
pub const FILE_SEPARATOR: &str = "---FILE---";
/// Prefix of the id notification sent on connect.
pub const ID_ASSIGNED_PREFIX: &str = "ID assigned:";
/// Broadcast sent to every session when the bridge stops.
pub const SHUTDOWN_MESSAGE: &str = "Shutdown";
/// Prefix of error payloads.
pub const ERROR_PREFIX: &str = "Error:";

/// Role of a file inside a component-model bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    UsageModel,
    Allocation,
    NodeCharacteristics,
}

impl FileRole {
    /// All roles a complete bundle must provide.
    pub const ALL: [FileRole; 3] = [
        FileRole::UsageModel,
        FileRole::Allocation,
        FileRole::NodeCharacteristics,
    ];

    /// File extension identifying the role (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::UsageModel => "usagemodel",
            Self::Allocation => "allocation",
            Self::NodeCharacteristics => "nodecharacteristics",
        }
    }

    /// Classify a bundled file name by its suffix.
    pub fn classify(filename: &str) -> Option<FileRole> {
        Self::ALL.into_iter().find(|role| {
            filename
                .strip_suffix(role.extension())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A named file carried inside a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub content: String,
}

/// The three files of a component model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentModelFiles {
    pub usage_model: NamedFile,
    pub allocation: NamedFile,
    pub node_characteristics: NamedFile,
}

impl ComponentModelFiles {
    /// Files in role order.
    pub fn files(&self) -> [(FileRole, &NamedFile); 3] {
        [
            (FileRole::UsageModel, &self.usage_model),
            (FileRole::Allocation, &self.allocation),
            (FileRole::NodeCharacteristics, &self.node_characteristics),
        ]
    }
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Analyze the diagram and return it annotated.
    Annotate { diagram: WebEditorDfd },
    /// Convert the diagram to an Ecore diagram/dictionary pair.
    ConvertToEcore { name: String, diagram: WebEditorDfd },
    /// Convert an Ecore diagram/dictionary pair to a diagram.
    ConvertFromEcorePair {
        name: String,
        diagram: String,
        dictionary: String,
    },
    /// Convert a component model to a diagram.
    ConvertFromComponentModel { files: ComponentModelFiles },
}

impl Request {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Annotate { .. } => "annotate",
            Self::ConvertToEcore { .. } => "json2dfd",
            Self::ConvertFromEcorePair { .. } => "dfd",
            Self::ConvertFromComponentModel { .. } => "pcm",
        }
    }
}

/// A reply payload ready for framing.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A diagram document.
    Diagram(WebEditorDfd),
    /// An Ecore pair, tagged with the model name the client asked for.
    EcorePair {
        name: String,
        diagram: String,
        dictionary: String,
    },
}

/// Split off the session id prefix.
///
/// Returns the id and the remaining text after the first `:`.
pub fn split_session(raw: &str) -> Result<(SessionId, &str), ProtocolError> {
    let (head, rest) = raw
        .split_once(':')
        .ok_or(ProtocolError::MissingDelimiter("session id"))?;
    let id = head
        .trim()
        .parse::<u64>()
        .map_err(|_| ProtocolError::InvalidSessionId(head.to_string()))?;
    Ok((SessionId(id), rest))
}

/// Decode a full inbound frame into its session id and request.
///
/// # Errors
///
/// Returns a [`ProtocolError`] describing the first framing problem found.
/// The session id is returned alongside the error whenever it could be read,
/// so that the failure can still be reported to the right session.
pub fn decode(raw: &str) -> Result<(SessionId, Request), (Option<SessionId>, ProtocolError)> {
    let (session, rest) = split_session(raw).map_err(|e| (None, e))?;
    decode_request(rest)
        .map(|request| (session, request))
        .map_err(|e| (Some(session), e))
}

/// Decode the part of a frame after the session id.
pub fn decode_request(rest: &str) -> Result<Request, ProtocolError> {
    if let Some(json) = rest.strip_prefix(TAG_ANNOTATE) {
        return Ok(Request::Annotate {
            diagram: parse_diagram(json)?,
        });
    }

    if let Some(tail) = rest.strip_prefix(TAG_TO_ECORE) {
        let (name, json) = split_name(tail)?;
        return Ok(Request::ConvertToEcore {
            name,
            diagram: parse_diagram(json)?,
        });
    }

    if let Some(tail) = rest.strip_prefix(TAG_FROM_ECORE) {
        let (name, pair) = split_name(tail)?;
        let (diagram, dictionary) = split_ecore_pair(pair)?;
        return Ok(Request::ConvertFromEcorePair {
            name,
            diagram: diagram.to_string(),
            dictionary: dictionary.to_string(),
        });
    }

    Ok(Request::ConvertFromComponentModel {
        files: split_bundle(rest)?,
    })
}

fn parse_diagram(json: &str) -> Result<WebEditorDfd, ProtocolError> {
    WebEditorDfd::from_json(json).map_err(|e| ProtocolError::MalformedJson(e.to_string()))
}

/// Split `<name>:<payload>`, validating the name as a plain file name.
fn split_name(tail: &str) -> Result<(String, &str), ProtocolError> {
    let (name, payload) = tail
        .split_once(':')
        .ok_or(ProtocolError::MissingDelimiter("model name"))?;
    validate_file_name(name)?;
    Ok((name.to_string(), payload))
}

/// Check that `name` can be used as a file name inside a scratch directory.
pub fn validate_file_name(name: &str) -> Result<(), ProtocolError> {
    if name.is_empty() {
        return Err(ProtocolError::EmptyName);
    }
    let forbidden = name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.chars().any(char::is_control);
    if forbidden {
        return Err(ProtocolError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// Split an Ecore pair at its single `\n:DD:\n` separator.
pub fn split_ecore_pair(pair: &str) -> Result<(&str, &str), ProtocolError> {
    let finder = memmem::Finder::new(DD_SEPARATOR);
    let mut positions = finder.find_iter(pair.as_bytes());
    match (positions.next(), positions.next()) {
        (Some(at), None) => Ok((&pair[..at], &pair[at + DD_SEPARATOR.len()..])),
        (None, _) => Err(ProtocolError::SeparatorCount { found: 0 }),
        (Some(_), Some(_)) => Err(ProtocolError::SeparatorCount {
            found: 2 + positions.count(),
        }),
    }
}

/// Split a `---FILE---` bundle into the three component-model files.
pub fn split_bundle(bundle: &str) -> Result<ComponentModelFiles, ProtocolError> {
    let mut usage_model = None;
    let mut allocation = None;
    let mut node_characteristics = None;

    for record in split_records(bundle) {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }

        let (name, content) = record
            .split_once(':')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| ProtocolError::MalformedRecord(preview(record)))?;
        validate_file_name(name)?;

        let role = FileRole::classify(name)
            .ok_or_else(|| ProtocolError::UnknownFileRole(name.to_string()))?;
        let slot = match role {
            FileRole::UsageModel => &mut usage_model,
            FileRole::Allocation => &mut allocation,
            FileRole::NodeCharacteristics => &mut node_characteristics,
        };
        if slot.is_some() {
            return Err(ProtocolError::DuplicateFileRole {
                role,
                file: name.to_string(),
            });
        }
        *slot = Some(NamedFile {
            name: name.to_string(),
            content: content.to_string(),
        });
    }

    Ok(ComponentModelFiles {
        usage_model: usage_model.ok_or(ProtocolError::MissingFileRole(FileRole::UsageModel))?,
        allocation: allocation.ok_or(ProtocolError::MissingFileRole(FileRole::Allocation))?,
        node_characteristics: node_characteristics
            .ok_or(ProtocolError::MissingFileRole(FileRole::NodeCharacteristics))?,
    })
}

fn split_records(bundle: &str) -> impl Iterator<Item = &str> {
    let mut start = 0;
    let mut cuts: Vec<usize> = memmem::find_iter(bundle.as_bytes(), FILE_SEPARATOR).collect();
    cuts.push(bundle.len());
    cuts.into_iter().map(move |cut| {
        let record = &bundle[start..cut];
        start = (cut + FILE_SEPARATOR.len()).min(bundle.len());
        record
    })
}

fn preview(record: &str) -> String {
    record.chars().take(40).collect()
}

/// `ID assigned:<id>`
pub fn encode_id_assigned(session: SessionId) -> String {
    format!("{}{}", ID_ASSIGNED_PREFIX, session)
}

/// Frame a reply or a failure for `session`.
///
/// Serialization failures of the reply are themselves framed as errors.
pub fn encode_reply(session: SessionId, outcome: &Result<Reply, BridgeError>) -> String {
    match outcome {
        Ok(reply) => match encode_payload(reply) {
            Ok(payload) => format!("{}:{}", session, payload),
            Err(e) => encode_error(session, &e),
        },
        Err(e) => encode_error(session, e),
    }
}

/// `<id>:Error:<message>`
pub fn encode_error(session: SessionId, error: &BridgeError) -> String {
    format!("{}:{}{}", session, ERROR_PREFIX, error.wire_message())
}

fn encode_payload(reply: &Reply) -> Result<String, BridgeError> {
    match reply {
        Reply::Diagram(diagram) => Ok(serde_json::to_string_pretty(diagram)?),
        Reply::EcorePair {
            name,
            diagram,
            dictionary,
        } => Ok(format!("{}:{}\n{}", name, diagram, dictionary)),
    }
}
