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

//! Server configuration.

use crate::backend::{ConversionBackend, ConverterCommand, IdentityBackend, ProcessBackend};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default WebSocket path.
pub const DEFAULT_PATH: &str = "/events";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default worker limit.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;
/// Default maximum inbound message size (256 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 256 * 1024 * 1024;
/// Default idle timeout (60 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Bridge server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,

    /// Path of the WebSocket endpoint. Sub-paths are accepted as well.
    pub path: String,

    /// Maximum number of requests processed at the same time.
    ///
    /// Default: 32.
    pub max_in_flight: usize,

    /// Largest accepted inbound message in bytes.
    ///
    /// Whole model bundles travel in a single frame, so this is generous.
    /// Default: 256 MiB.
    pub max_message_size: usize,

    /// Connections without inbound traffic for this long are closed.
    ///
    /// Default: 60 minutes.
    pub idle_timeout: Duration,

    /// Parent of the scratch directory. `None` uses the system temp directory.
    pub staging_dir: Option<PathBuf>,

    /// External converter. `None` selects the pass-through backend.
    pub converter: Option<ConverterCommand>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            path: DEFAULT_PATH.to_string(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            staging_dir: None,
            converter: None,
        }
    }
}

impl ServerConfig {
    /// Endpoint path with exactly one leading and no trailing slash.
    pub fn endpoint(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        format!("/{}", trimmed)
    }

    /// Backend selected by [`converter`](Self::converter).
    pub fn backend(&self) -> Arc<dyn ConversionBackend> {
        match &self.converter {
            Some(command) => Arc::new(ProcessBackend::new(command.clone())),
            None => Arc::new(IdentityBackend),
        }
    }
}
