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

//! Per-message scheduling.
//!
//! Every inbound frame becomes one blocking worker that decodes, dispatches,
//! frames and delivers the reply. At most `max_in_flight` workers run at
//! once; a connection that submits while all permits are taken waits for one,
//! which stops it reading further frames until capacity frees up.
//!
//! Replies to frames submitted in quick succession may arrive in any order.

use crate::dispatch::Dispatcher;
use crate::error::BridgeError;
use crate::protocol::{decode, encode_error, encode_reply, SHUTDOWN_MESSAGE};
use crate::registry::{Outbound, SessionId, SessionRegistry};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The protocol engine shared by all connections.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<Dispatcher>,
    permits: Arc<Semaphore>,
}

impl Engine {
    /// Create an engine running at most `max_in_flight` workers at once.
    ///
    /// A limit of 0 is raised to 1.
    pub fn new(dispatcher: Dispatcher, max_in_flight: usize) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            dispatcher: Arc::new(dispatcher),
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Session table.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Register a new connection.
    pub fn connect(&self, outbound: Outbound) -> SessionId {
        let session = self.registry.register(outbound);
        info!(%session, sessions = self.registry.len(), "session opened");
        session
    }

    /// Forget a closed connection.
    pub fn disconnect(&self, session: SessionId) {
        if self.registry.forget(session) {
            info!(%session, sessions = self.registry.len(), "session closed");
        }
    }

    /// Number of additional workers that could start right now.
    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }

    /// Schedule a frame received on `origin`.
    ///
    /// Waits for a worker permit, then hands the frame to a blocking worker.
    /// Returns `None` only if the engine no longer accepts work.
    pub async fn submit(&self, origin: SessionId, raw: String) -> Option<JoinHandle<()>> {
        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!(%origin, "engine closed, frame dropped");
                return None;
            }
        };

        let engine = self.clone();
        Some(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            engine.handle(origin, &raw);
        }))
    }

    /// Decode, dispatch and deliver one frame on the calling thread.
    pub fn handle(&self, origin: SessionId, raw: &str) {
        let (target, frame) = self.process(origin, raw);
        self.deliver(target, frame);
    }

    /// Decode and dispatch one frame, returning the session to answer and the
    /// framed reply.
    ///
    /// Frames whose session id cannot be read are answered on `origin`.
    pub fn process(&self, origin: SessionId, raw: &str) -> (SessionId, String) {
        debug!(%origin, len = raw.len(), "frame received");

        match decode(raw) {
            Ok((session, request)) => {
                let outcome = self.dispatcher.dispatch(session, request);
                (session, encode_reply(session, &outcome))
            }
            Err((session, e)) => {
                let target = session.unwrap_or(origin);
                warn!(%origin, session = %target, error = %e, "undecodable frame");
                (target, encode_error(target, &BridgeError::from(e)))
            }
        }
    }

    fn deliver(&self, session: SessionId, frame: String) {
        debug!(%session, len = frame.len(), "sending reply");
        if !self.registry.send(session, frame) {
            warn!(%session, "reply dropped, session is gone");
        }
    }

    /// Broadcast `Shutdown`, then drop every session and stop accepting work.
    ///
    /// Returns the number of sessions that were reached.
    pub fn shutdown(&self) -> usize {
        self.permits.close();
        let reached = self.registry.broadcast(SHUTDOWN_MESSAGE);
        let dropped = self.registry.drain();
        info!(reached, dropped, "engine shut down");
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IdentityBackend;
    use crate::staging::StagingArea;
    use dfd_test::{diagrams, wire};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn engine(max_in_flight: usize) -> Engine {
        let dispatcher =
            Dispatcher::new(Arc::new(IdentityBackend), StagingArea::new(None).unwrap());
        Engine::new(dispatcher, max_in_flight)
    }

    fn connect(engine: &Engine) -> (SessionId, UnboundedReceiver<String>) {
        let (tx, mut rx) = unbounded_channel();
        let session = engine.connect(tx);
        assert_eq!(rx.try_recv().unwrap(), format!("ID assigned:{}", session));
        (session, rx)
    }

    #[test]
    fn test_process_routes_by_embedded_id() {
        let engine = engine(1);
        let (target, frame) = engine.process(SessionId(5), &wire::annotate(2, diagrams::SIMPLE));
        assert_eq!(target, SessionId(2));
        assert!(frame.starts_with("2:{"));
    }

    #[test]
    fn test_process_bad_session_id_answers_origin() {
        let engine = engine(1);
        let (target, frame) = engine.process(SessionId(5), "x:Json:{}");
        assert_eq!(target, SessionId(5));
        assert_eq!(frame, "5:Error:Invalid session id: \"x\"");
    }

    #[test]
    fn test_process_decode_error_answers_embedded_session() {
        let engine = engine(1);
        let (target, frame) = engine.process(SessionId(5), "1:DFD:shop:no separator");
        assert_eq!(target, SessionId(1));
        assert!(frame.starts_with("1:Error:Expected exactly one :DD: separator"));
    }

    #[test]
    fn test_handle_delivers_to_registered_session() {
        let engine = engine(1);
        let (session, mut rx) = connect(&engine);
        engine.handle(session, &wire::annotate(session.0, diagrams::SIMPLE));
        let reply = rx.try_recv().unwrap();
        assert!(reply.starts_with(&format!("{}:{{", session)));
    }

    #[test]
    fn test_reply_to_forgotten_session_is_dropped() {
        let engine = engine(1);
        let (session, mut rx) = connect(&engine);
        engine.disconnect(session);
        engine.handle(session, &wire::annotate(session.0, diagrams::SIMPLE));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_releases_permit() {
        let engine = engine(2);
        let (session, mut rx) = connect(&engine);
        let handle = engine
            .submit(session, wire::annotate(session.0, diagrams::EMPTY))
            .await
            .unwrap();
        handle.await.unwrap();
        assert!(rx.recv().await.unwrap().starts_with("0:{"));
        assert_eq!(engine.available_workers(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_broadcasts_and_refuses_work() {
        let engine = engine(2);
        let (a, mut ra) = connect(&engine);
        let (_, mut rb) = connect(&engine);

        assert_eq!(engine.shutdown(), 2);
        assert_eq!(ra.recv().await.unwrap(), "Shutdown");
        assert_eq!(rb.recv().await.unwrap(), "Shutdown");
        assert!(ra.recv().await.is_none());
        assert!(engine.registry().is_empty());
        assert!(engine.submit(a, "0:Json:{}".to_string()).await.is_none());
    }
}
