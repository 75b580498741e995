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

//! DFD Bridge binary.
//!
//! # Usage
//!
//! ```bash
//! # Pass-through mode on 127.0.0.1:3000/events
//! dfd-bridge
//!
//! # Delegate conversion and analysis to an external converter
//! dfd-bridge --converter java --converter-arg -jar --converter-arg converter.jar
//!
//! # Run with debug logging
//! RUST_LOG=dfd_server=debug dfd-bridge
//! ```

use clap::Parser;
use dfd_server::{BridgeServer, ConverterCommand, ServerConfig, SERVER_NAME, VERSION};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dfd-bridge")]
#[command(author = "Dweve B.V.")]
#[command(version)]
#[command(about = "WebSocket bridge between the DFD web editor and the analysis toolchain")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// WebSocket endpoint path
    #[arg(long, default_value = "/events")]
    path: String,

    /// Maximum number of requests processed concurrently
    #[arg(long, default_value_t = 32)]
    max_in_flight: usize,

    /// Maximum inbound message size in bytes
    #[arg(long, default_value_t = 256 * 1024 * 1024)]
    max_message_size: usize,

    /// Close connections idle for this many seconds
    #[arg(long, default_value_t = 3600)]
    idle_timeout_secs: u64,

    /// Directory for scratch files (default: system temp directory)
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// External converter program
    #[arg(long)]
    converter: Option<PathBuf>,

    /// Argument passed to the converter before the operation (repeatable)
    #[arg(long = "converter-arg", allow_hyphen_values = true, requires = "converter")]
    converter_args: Vec<String>,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let converter = self.converter.map(|program| ConverterCommand {
            program,
            args: self.converter_args,
        });
        ServerConfig {
            bind: self.bind,
            path: self.path,
            max_in_flight: self.max_in_flight,
            max_message_size: self.max_message_size,
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            staging_dir: self.staging_dir,
            converter,
        }
    }
}

/// Directives used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_DIRECTIVES: &str = "dfd_server=info,dfd_bridge=info";

/// Log filter from the `RUST_LOG` value, falling back to the defaults.
fn log_filter(env: Option<&str>) -> EnvFilter {
    env.filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config();
    info!(name = SERVER_NAME, version = VERSION, "starting");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = BridgeServer::new(config)?;
        server.run().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    info!("stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_rust_log_can_raise_level() {
        let filter = log_filter(Some("dfd_server=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(!filter.to_string().contains("dfd_server=info"));
    }

    #[test]
    fn test_invalid_rust_log_falls_back() {
        let filter = log_filter(Some("dfd_server=loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_cli_defaults_match_config_defaults() {
        let config = Cli::parse_from(["dfd-bridge"]).into_config();
        let defaults = ServerConfig::default();
        assert_eq!(config.bind, defaults.bind);
        assert_eq!(config.path, defaults.path);
        assert_eq!(config.max_in_flight, defaults.max_in_flight);
        assert_eq!(config.max_message_size, defaults.max_message_size);
        assert_eq!(config.idle_timeout, defaults.idle_timeout);
        assert!(config.converter.is_none());
    }

    #[test]
    fn test_cli_converter_args() {
        let config = Cli::parse_from([
            "dfd-bridge",
            "--converter",
            "java",
            "--converter-arg",
            "-jar",
            "--converter-arg",
            "converter.jar",
            "--max-in-flight",
            "4",
        ])
        .into_config();
        let converter = config.converter.unwrap();
        assert_eq!(converter.program, PathBuf::from("java"));
        assert_eq!(converter.args, vec!["-jar", "converter.jar"]);
        assert_eq!(config.max_in_flight, 4);
    }
}
