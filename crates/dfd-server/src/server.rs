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

//! WebSocket transport.
//!
//! Serves the editor endpoint over axum. Each upgraded socket runs one
//! connection task that forwards inbound text frames to the [`Engine`] and
//! writes whatever the registry queues for its session.

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::engine::Engine;
use crate::error::BridgeResult;
use crate::staging::StagingArea;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

#[derive(Clone)]
struct ConnectionState {
    engine: Engine,
    max_message_size: usize,
    idle_timeout: Duration,
}

/// The bridge server: engine plus HTTP/WebSocket front end.
pub struct BridgeServer {
    config: ServerConfig,
    engine: Engine,
}

impl BridgeServer {
    /// Build the engine and scratch root described by `config`.
    pub fn new(config: ServerConfig) -> BridgeResult<Self> {
        let staging = StagingArea::new(config.staging_dir.as_deref())?;
        let backend = config.backend();
        info!(
            backend = backend.name(),
            staging = %staging.path().display(),
            max_in_flight = config.max_in_flight,
            "engine configured"
        );
        let engine = Engine::new(Dispatcher::new(backend, staging), config.max_in_flight);
        Ok(Self { config, engine })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Engine shared by all connections.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Router serving the endpoint and every path below it.
    pub fn router(&self) -> Router {
        let endpoint = self.config.endpoint();
        let wildcard = if endpoint == "/" {
            "/{*rest}".to_string()
        } else {
            format!("{}/{{*rest}}", endpoint)
        };
        let state = ConnectionState {
            engine: self.engine.clone(),
            max_message_size: self.config.max_message_size,
            idle_timeout: self.config.idle_timeout,
        };
        Router::new()
            .route(&endpoint, get(upgrade))
            .route(&wildcard, get(upgrade))
            .with_state(state)
    }

    /// Bind the configured address and serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.config.bind).await?;
        self.serve(listener, wait_for_shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` completes.
    ///
    /// On shutdown every session receives `Shutdown` and its socket is
    /// closed before the listener stops.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(%addr, path = %self.config.endpoint(), "listening");

        let router = self.router();
        let engine = self.engine.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown requested");
                engine.shutdown();
            })
            .await
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<ConnectionState>) -> Response {
    ws.max_message_size(state.max_message_size)
        .max_frame_size(state.max_message_size)
        .on_upgrade(move |socket| connection(socket, state))
}

async fn connection(mut socket: WebSocket, state: ConnectionState) {
    let (outbound, mut queued) = mpsc::unbounded_channel::<String>();
    let session = state.engine.connect(outbound);

    let idle = sleep(state.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            frame = queued.recv() => match frame {
                Some(text) => {
                    if let Err(e) = socket.send(Message::Text(text.into())).await {
                        debug!(%session, error = %e, "send failed");
                        break;
                    }
                }
                None => {
                    // Registry dropped the session (shutdown).
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    idle.as_mut().reset(Instant::now() + state.idle_timeout);
                    if state.engine.submit(session, text.as_str().to_owned()).await.is_none() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    idle.as_mut().reset(Instant::now() + state.idle_timeout);
                }
                Some(Err(e)) => {
                    warn!(%session, error = %e, "socket error");
                    break;
                }
            },
            _ = &mut idle => {
                info!(%session, "idle timeout");
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }

    state.engine.disconnect(session);
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = tokio::signal::ctrl_c() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
