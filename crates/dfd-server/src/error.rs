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

//! Error types for the bridge.
//!
//! Three failure families reach the wire, each as an `Error:<message>` reply
//! to the originating session only:
//!
//! - [`ProtocolError`]: the inbound message could not be decoded. The message
//!   text is sent verbatim so the editor can show what was wrong.
//! - [`BridgeError::Conversion`]: the conversion/analysis backend failed. Only
//!   a generic per-operation message is sent; the cause is logged.
//! - [`BridgeError::Lookup`]: the analysis referenced a node the diagram does
//!   not contain.

use crate::backend::BackendError;
use crate::protocol::FileRole;
use dfd_model::ModelError;
use std::fmt;
use thiserror::Error;

/// Failure to decode an inbound wire message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The session id prefix is missing or not a decimal integer.
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// A required `:` delimiter is missing.
    #[error("Missing delimiter after {0}")]
    MissingDelimiter(&'static str),

    /// The model name before the payload is empty.
    #[error("Missing model name")]
    EmptyName,

    /// A name that must be a plain file name contains path components.
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// The diagram/dictionary separator does not occur exactly once.
    #[error("Expected exactly one :DD: separator, found {found}")]
    SeparatorCount { found: usize },

    /// The JSON document could not be parsed.
    #[error("Invalid Json Model: {0}")]
    MalformedJson(String),

    /// A bundle record has no `<filename>:` prefix.
    #[error("Malformed file record: {0:?}")]
    MalformedRecord(String),

    /// A bundled file matches none of the component-model roles.
    #[error("Unexpected file in bundle: {0}")]
    UnknownFileRole(String),

    /// Two bundled files claim the same role.
    #[error("Duplicate {role} file in bundle: {file}")]
    DuplicateFileRole { role: FileRole, file: String },

    /// A component-model role has no file in the bundle.
    #[error("Missing {0} file in bundle")]
    MissingFileRole(FileRole),
}

/// The conversion step that failed, used for the generic wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Normalize,
    Analyze,
    StoreEcore,
    LoadEcore,
    LoadComponentModel,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normalize => write!(f, "Diagram conversion failed"),
            Self::Analyze => write!(f, "Analysis failed"),
            Self::StoreEcore => write!(f, "Conversion to DFD failed"),
            Self::LoadEcore => write!(f, "Invalid DFD Model"),
            Self::LoadComponentModel => write!(f, "Invalid PCM Model"),
        }
    }
}

/// Bridge error type.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Inbound message could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The conversion/analysis backend failed.
    #[error("{operation}: {source}")]
    Conversion {
        operation: Operation,
        #[source]
        source: BackendError,
    },

    /// Analysis result and diagram disagree about node ids.
    #[error("Annotation failed: {0}")]
    Lookup(ModelError),

    /// Scratch files could not be written or read back.
    #[error("Staging error: {0}")]
    Staging(#[from] std::io::Error),

    /// The outbound document could not be serialized.
    #[error("Unable to write Json: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Wrap a backend failure for `operation`.
    pub fn conversion(operation: Operation, source: BackendError) -> Self {
        Self::Conversion { operation, source }
    }

    /// Text sent after `Error:` on the wire.
    ///
    /// Never includes backend output or I/O details.
    pub fn wire_message(&self) -> String {
        match self {
            Self::Protocol(e) => e.to_string(),
            Self::Conversion { operation, .. } => operation.to_string(),
            Self::Lookup(e) => e.to_string(),
            Self::Staging(_) => "Unable to stage model files".to_string(),
            Self::Serialize(_) => "Unable to read Json".to_string(),
        }
    }

    /// Whether the failure was caused by the client's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_forwarded_verbatim() {
        let err = BridgeError::from(ProtocolError::MissingFileRole(FileRole::Allocation));
        assert_eq!(err.wire_message(), "Missing allocation file in bundle");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_conversion_error_is_generic() {
        let err = BridgeError::conversion(
            Operation::Analyze,
            BackendError::Process {
                status: "exit status: 1".to_string(),
                stderr: "java.lang.NullPointerException at Foo.bar".to_string(),
            },
        );
        assert_eq!(err.wire_message(), "Analysis failed");
        assert!(!err.wire_message().contains("NullPointer"));
        // The full chain is still available for logging.
        assert!(err.to_string().contains("NullPointer"));
    }

    #[test]
    fn test_staging_error_hides_paths() {
        let err = BridgeError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/tmp/secret/path",
        ));
        assert!(!err.wire_message().contains("/tmp"));
    }

    #[test]
    fn test_lookup_error_names_node() {
        let err = BridgeError::Lookup(ModelError::NodeNotFound("n42".to_string()));
        assert!(err.wire_message().contains("n42"));
    }
}
