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

//! Conversion dispatcher.
//!
//! Maps each decoded [`Request`] to backend calls and turns the outcome into a
//! [`Reply`] or a [`BridgeError`]. Files needed by the backend are staged in a
//! per-request scope that is removed on every exit path.

use crate::backend::{ecore_paths, ConversionBackend, DIAGRAM_EXTENSION, DICTIONARY_EXTENSION};
use crate::error::{BridgeError, BridgeResult, Operation};
use crate::protocol::{ComponentModelFiles, Reply, Request};
use crate::registry::SessionId;
use crate::staging::{StagingArea, StagingScope};
use dfd_model::{annotate, WebEditorDfd};
use std::error::Error as _;
use std::fs;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Routes requests to a [`ConversionBackend`].
pub struct Dispatcher {
    backend: Arc<dyn ConversionBackend>,
    staging: StagingArea,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ConversionBackend>, staging: StagingArea) -> Self {
        Self { backend, staging }
    }

    /// Backend in use.
    pub fn backend(&self) -> &dyn ConversionBackend {
        self.backend.as_ref()
    }

    /// Scratch root in use.
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Run one request to completion.
    ///
    /// Failures are logged here with their full cause chain; the returned
    /// error only carries what may be sent to the client.
    pub fn dispatch(&self, session: SessionId, request: Request) -> BridgeResult<Reply> {
        let kind = request.kind();
        debug!(%session, kind, backend = self.backend.name(), "dispatching");

        let outcome = match request {
            Request::Annotate { diagram } => self.annotate(diagram),
            Request::ConvertToEcore { name, diagram } => {
                self.convert_to_ecore(session, &name, &diagram)
            }
            Request::ConvertFromEcorePair {
                name,
                diagram,
                dictionary,
            } => self.convert_from_ecore(session, &name, &diagram, &dictionary),
            Request::ConvertFromComponentModel { files } => {
                self.convert_from_component_model(session, &files)
            }
        };

        if let Err(e) = &outcome {
            log_failure(session, kind, e);
        }
        outcome
    }

    fn annotate(&self, diagram: WebEditorDfd) -> BridgeResult<Reply> {
        let normalized = self
            .backend
            .normalize(&diagram)
            .map_err(|e| BridgeError::conversion(Operation::Normalize, e))?;

        let mut result = if diagram.has_constraints() {
            let violations = self
                .backend
                .analyze(&diagram, diagram.constraint_list())
                .map_err(|e| BridgeError::conversion(Operation::Analyze, e))?;
            debug!(count = violations.len(), "analysis finished");
            annotate(normalized, &violations).map_err(BridgeError::Lookup)?
        } else {
            normalized
        };

        result.constraints = diagram.constraints;
        Ok(Reply::Diagram(result))
    }

    fn convert_to_ecore(
        &self,
        session: SessionId,
        name: &str,
        diagram: &WebEditorDfd,
    ) -> BridgeResult<Reply> {
        let scope = self.scope(session, "json2dfd")?;
        let base = scope.path(name)?;
        self.backend
            .store_ecore(diagram, &base)
            .map_err(|e| BridgeError::conversion(Operation::StoreEcore, e))?;

        let (diagram_path, dictionary_path) = ecore_paths(&base);
        let reply = Reply::EcorePair {
            name: name.to_string(),
            diagram: fs::read_to_string(diagram_path)?,
            dictionary: fs::read_to_string(dictionary_path)?,
        };
        scope.close()?;
        Ok(reply)
    }

    fn convert_from_ecore(
        &self,
        session: SessionId,
        name: &str,
        diagram: &str,
        dictionary: &str,
    ) -> BridgeResult<Reply> {
        let scope = self.scope(session, "dfd")?;
        let diagram_path = scope.stage(&format!("{}.{}", name, DIAGRAM_EXTENSION), diagram)?;
        let dictionary_path =
            scope.stage(&format!("{}.{}", name, DICTIONARY_EXTENSION), dictionary)?;

        let result = self
            .backend
            .load_ecore(&diagram_path, &dictionary_path)
            .map_err(|e| BridgeError::conversion(Operation::LoadEcore, e))?;
        scope.close()?;
        Ok(Reply::Diagram(result))
    }

    fn convert_from_component_model(
        &self,
        session: SessionId,
        files: &ComponentModelFiles,
    ) -> BridgeResult<Reply> {
        let scope = self.scope(session, "pcm")?;
        let usage_model = scope.stage(&files.usage_model.name, &files.usage_model.content)?;
        let allocation = scope.stage(&files.allocation.name, &files.allocation.content)?;
        let node_characteristics = scope.stage(
            &files.node_characteristics.name,
            &files.node_characteristics.content,
        )?;

        let result = self
            .backend
            .load_component_model(&usage_model, &allocation, &node_characteristics)
            .map_err(|e| BridgeError::conversion(Operation::LoadComponentModel, e))?;
        scope.close()?;
        Ok(Reply::Diagram(result))
    }

    fn scope(&self, session: SessionId, kind: &str) -> BridgeResult<StagingScope> {
        Ok(self.staging.scope(&format!("{}-{}", session, kind))?)
    }
}

/// Render an error with every `source()` in its chain.
pub fn error_chain(err: &BridgeError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

fn log_failure(session: SessionId, kind: &str, err: &BridgeError) {
    if err.is_client_error() {
        warn!(%session, kind, error = %err, "rejected request");
    } else {
        error!(%session, kind, error = %error_chain(err), "request failed");
    }
}
