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

//! Session registry.
//!
//! Maps the id assigned to each open socket to the channel its writer task
//! drains. Replies are routed through here by the id embedded in the request,
//! which is not necessarily the id of the socket the request arrived on.
//!
//! # Thread Safety
//!
//! Backed by `DashMap` for concurrent lookup from worker threads while
//! connections register and disconnect. Ids come from an `AtomicU64`, so two
//! sockets opening at the same time always receive distinct ids.

use crate::protocol::encode_id_assigned;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Identifier of one socket session, unique within the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound half of a session: text frames queued for the socket writer.
pub type Outbound = UnboundedSender<String>;

/// Process-scoped table of live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Outbound>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Create an empty registry. The first session gets id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and queue its `ID assigned:<id>` notification.
    ///
    /// The notification is queued before the session becomes visible to
    /// [`lookup`](Self::lookup), so it is always the first frame the client
    /// sees.
    pub fn register(&self, channel: Outbound) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // A closed channel means the socket is already gone; the entry is
        // removed again when the connection task calls `forget`.
        let _ = channel.send(encode_id_assigned(id));
        self.sessions.insert(id, channel);
        id
    }

    /// Channel of a live session.
    pub fn lookup(&self, id: SessionId) -> Option<Outbound> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Remove a session. Returns `false` if it was not registered.
    pub fn forget(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Queue a frame for one session.
    ///
    /// Returns `false` if the session is unknown or its socket has closed.
    pub fn send(&self, id: SessionId, frame: String) -> bool {
        match self.sessions.get(&id) {
            Some(entry) => entry.value().send(frame).is_ok(),
            None => false,
        }
    }

    /// Queue a frame for every live session. Returns the number reached.
    pub fn broadcast(&self, frame: &str) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().send(frame.to_string()).is_ok())
            .count()
    }

    /// Remove every session, dropping their channels.
    ///
    /// Each connection task observes its channel closing and shuts its socket.
    pub fn drain(&self) -> usize {
        let ids: Vec<SessionId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        ids.into_iter().filter(|id| self.forget(*id)).count()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
