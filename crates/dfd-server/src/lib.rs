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

//! DFD Bridge Server
//!
//! Connects the browser-based data flow diagram editor to the modeling and
//! analysis toolchain over a single WebSocket endpoint. Key features:
//!
//! - **Session multiplexing**: every socket gets an id, every reply is routed
//!   by the id embedded in its request
//! - **Compact framing**: JSON models, Ecore diagram/dictionary pairs and
//!   component-model file bundles in one text frame
//! - **Violation annotation**: analysis results are merged into the diagram
//!   with deterministic colors per constraint
//! - **Bounded concurrency**: one blocking worker per message, capped by a
//!   semaphore
//!
//! # Wire Protocol
//!
//! ```text
//! server → client   ID assigned:<id>
//! client → server   <id>:Json:<diagram>
//!                   <id>:Json2DFD:<name>:<diagram>
//!                   <id>:DFD:<name>:<dataflowdiagram>\n:DD:\n<datadictionary>
//!                   <id>:---FILE---\n<name>.usagemodel:<xml>---FILE---...
//! server → client   <id>:<payload> | <id>:Error:<message>
//!                   Shutdown
//! ```

pub mod backend;
mod config;
pub mod dispatch;
mod engine;
mod error;
pub mod protocol;
mod registry;
mod server;
pub mod staging;

pub use backend::{
    BackendError, BackendResult, ConversionBackend, ConverterCommand, IdentityBackend,
    ProcessBackend,
};
pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use engine::Engine;
pub use error::{BridgeError, BridgeResult, Operation, ProtocolError};
pub use protocol::{FileRole, Reply, Request};
pub use registry::{Outbound, SessionId, SessionRegistry};
pub use server::{wait_for_shutdown_signal, BridgeServer};
pub use staging::{StagingArea, StagingScope};

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name used in logs and the CLI
pub const SERVER_NAME: &str = "dfd-bridge";
