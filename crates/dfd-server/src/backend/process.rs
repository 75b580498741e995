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

//! External converter process backend.
//!
//! Each call runs the converter once:
//!
//! ```text
//! <program> [args..] normalize                      stdin: diagram   stdout: diagram
//! <program> [args..] analyze                        stdin: request   stdout: [violation]
//! <program> [args..] store-ecore <base>             stdin: diagram
//! <program> [args..] load-ecore <dfd> <dd>                           stdout: diagram
//! <program> [args..] load-pcm <usage> <alloc> <nc>                   stdout: diagram
//! ```
//!
//! The analyze request is `{"diagram": ..., "constraints": [...]}`. A non-zero
//! exit status becomes [`BackendError::Process`] with the captured stderr.

use super::{BackendError, BackendResult, ConversionBackend};
use dfd_model::{Constraint, Violation, WebEditorDfd};
use serde::Serialize;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Program and leading arguments of the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ConverterCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a leading argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    diagram: &'a WebEditorDfd,
    constraints: &'a [Constraint],
}

/// Backend delegating to an external converter program.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    command: ConverterCommand,
}

impl ProcessBackend {
    pub fn new(command: ConverterCommand) -> Self {
        Self { command }
    }

    /// Configured command.
    pub fn command(&self) -> &ConverterCommand {
        &self.command
    }

    fn run(&self, operation: &[OsString], input: Option<Vec<u8>>) -> BackendResult<Vec<u8>> {
        debug!(program = %self.command.program.display(), ?operation, "running converter");

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .args(operation)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from its own thread so a converter that writes before it
        // finishes reading cannot fill the stdout pipe and stall both sides.
        let writer = match (input, child.stdin.take()) {
            (Some(bytes), Some(mut stdin)) => Some(thread::spawn(move || stdin.write_all(&bytes))),
            _ => None,
        };

        let output = child.wait_with_output()?;
        let written = writer.map(|handle| {
            handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
        });

        if !output.status.success() {
            return Err(BackendError::Process {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if let Some(result) = written {
            result?;
        }
        if !output.stderr.is_empty() {
            debug!(stderr = %String::from_utf8_lossy(&output.stderr), "converter diagnostics");
        }
        Ok(output.stdout)
    }

    fn run_diagram(
        &self,
        operation: &[OsString],
        input: Option<Vec<u8>>,
    ) -> BackendResult<WebEditorDfd> {
        let stdout = self.run(operation, input)?;
        let text = String::from_utf8_lossy(&stdout);
        WebEditorDfd::from_json(&text).map_err(model_to_backend)
    }
}

fn model_to_backend(err: dfd_model::ModelError) -> BackendError {
    match err {
        dfd_model::ModelError::Json(e) => BackendError::Json(e),
        other => BackendError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            other.to_string(),
        )),
    }
}

fn op(name: &str, paths: &[&Path]) -> Vec<OsString> {
    std::iter::once(OsString::from(name))
        .chain(paths.iter().map(|p| p.as_os_str().to_owned()))
        .collect()
}

impl ConversionBackend for ProcessBackend {
    fn name(&self) -> &str {
        "process"
    }

    fn normalize(&self, diagram: &WebEditorDfd) -> BackendResult<WebEditorDfd> {
        self.run_diagram(&op("normalize", &[]), Some(serde_json::to_vec(diagram)?))
    }

    fn analyze(
        &self,
        diagram: &WebEditorDfd,
        constraints: &[Constraint],
    ) -> BackendResult<Vec<Violation>> {
        let request = serde_json::to_vec(&AnalyzeRequest {
            diagram,
            constraints,
        })?;
        let stdout = self.run(&op("analyze", &[]), Some(request))?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn store_ecore(&self, diagram: &WebEditorDfd, base: &Path) -> BackendResult<()> {
        self.run(&op("store-ecore", &[base]), Some(serde_json::to_vec(diagram)?))?;
        Ok(())
    }

    fn load_ecore(&self, diagram: &Path, dictionary: &Path) -> BackendResult<WebEditorDfd> {
        self.run_diagram(&op("load-ecore", &[diagram, dictionary]), None)
    }

    fn load_component_model(
        &self,
        usage_model: &Path,
        allocation: &Path,
        node_characteristics: &Path,
    ) -> BackendResult<WebEditorDfd> {
        self.run_diagram(
            &op("load-pcm", &[usage_model, allocation, node_characteristics]),
            None,
        )
    }
}
