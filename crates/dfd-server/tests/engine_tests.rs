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

//! Engine scenarios with in-memory session channels.
//!
//! Sessions are plain unbounded channels here; the WebSocket transport is
//! covered by `websocket_e2e.rs`.

use dfd_model::{Constraint, Violation, WebEditorDfd};
use dfd_server::{
    BackendResult, ConversionBackend, Dispatcher, Engine, IdentityBackend, SessionId, StagingArea,
};
use dfd_test::{bundles, diagrams, wire};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Reports every constraint as violated on every top-level node.
struct EverythingViolated;

impl ConversionBackend for EverythingViolated {
    fn name(&self) -> &str {
        "everything-violated"
    }

    fn normalize(&self, diagram: &WebEditorDfd) -> BackendResult<WebEditorDfd> {
        Ok(diagram.clone())
    }

    fn analyze(
        &self,
        diagram: &WebEditorDfd,
        constraints: &[Constraint],
    ) -> BackendResult<Vec<Violation>> {
        Ok(constraints
            .iter()
            .enumerate()
            .map(|(i, c)| Violation::new(c.name.clone(), diagram.child_ids(), i as i64))
            .collect())
    }

    fn store_ecore(&self, _: &WebEditorDfd, _: &Path) -> BackendResult<()> {
        Ok(())
    }

    fn load_ecore(&self, _: &Path, _: &Path) -> BackendResult<WebEditorDfd> {
        Ok(WebEditorDfd::from_json(diagrams::EMPTY).map_err(std::io::Error::other)?)
    }

    fn load_component_model(&self, _: &Path, _: &Path, _: &Path) -> BackendResult<WebEditorDfd> {
        Ok(WebEditorDfd::from_json(diagrams::EMPTY).map_err(std::io::Error::other)?)
    }
}

fn engine_with(backend: Arc<dyn ConversionBackend>, max_in_flight: usize) -> Engine {
    Engine::new(
        Dispatcher::new(backend, StagingArea::new(None).unwrap()),
        max_in_flight,
    )
}

fn connect(engine: &Engine) -> (SessionId, UnboundedReceiver<String>) {
    let (tx, rx) = unbounded_channel();
    (engine.connect(tx), rx)
}

async fn next(rx: &mut UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("reply within timeout")
        .expect("channel open")
}

/// Split `<id>:<payload>` into its parts.
fn split_reply(frame: &str) -> (u64, &str) {
    let (id, payload) = frame.split_once(':').expect("framed reply");
    (id.parse().expect("numeric id"), payload)
}

#[tokio::test]
async fn test_connect_then_annotate_round_trip() {
    let engine = engine_with(Arc::new(IdentityBackend), 4);
    let (session, mut rx) = connect(&engine);

    assert_eq!(next(&mut rx).await, "ID assigned:0");
    engine
        .submit(session, wire::annotate(0, diagrams::SIMPLE))
        .await
        .unwrap();

    let reply = next(&mut rx).await;
    let (id, payload) = split_reply(&reply);
    assert_eq!(id, 0);
    assert!(payload.contains('\n'), "reply is indented");
    assert!(!payload.contains("null"));
    assert_eq!(dfd_test::child_ids(payload), dfd_test::child_ids(diagrams::SIMPLE));

    // Editor state survives the round trip.
    let value: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(value["model"]["canvasBounds"]["width"], 1200.0);
    assert_eq!(value["model"]["children"][0]["position"]["y"], 20.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_clients_receive_their_own_replies() {
    let engine = engine_with(Arc::new(EverythingViolated), 8);
    let (a, mut ra) = connect(&engine);
    let (b, mut rb) = connect(&engine);
    next(&mut ra).await;
    next(&mut rb).await;

    let doc_a = diagrams::with_nodes(&["alpha1", "alpha2"]);
    let doc_b = diagrams::with_nodes(&["beta1", "beta2", "beta3"]);

    let (ha, hb) = tokio::join!(
        engine.submit(a, wire::annotate(a.0, &doc_a)),
        engine.submit(b, wire::annotate(b.0, &doc_b)),
    );
    ha.unwrap().await.unwrap();
    hb.unwrap().await.unwrap();

    let reply_a = next(&mut ra).await;
    let reply_b = next(&mut rb).await;
    assert_eq!(split_reply(&reply_a).0, a.0);
    assert_eq!(split_reply(&reply_b).0, b.0);
    assert_eq!(
        dfd_test::child_ids(split_reply(&reply_a).1),
        vec!["alpha1", "alpha2"]
    );
    assert_eq!(
        dfd_test::child_ids(split_reply(&reply_b).1),
        vec!["beta1", "beta2", "beta3"]
    );
}

#[tokio::test]
async fn test_reply_follows_embedded_session_id() {
    let engine = engine_with(Arc::new(IdentityBackend), 2);
    let (a, mut ra) = connect(&engine);
    let (b, mut rb) = connect(&engine);
    next(&mut ra).await;
    next(&mut rb).await;

    // Sent on a's socket, addressed to b.
    engine
        .submit(a, wire::annotate(b.0, diagrams::EMPTY))
        .await
        .unwrap()
        .await
        .unwrap();

    assert!(next(&mut rb).await.starts_with(&format!("{}:", b)));
    assert!(ra.try_recv().is_err());
}

#[tokio::test]
async fn test_constraints_round_trip_with_annotations() {
    let engine = engine_with(Arc::new(EverythingViolated), 2);
    let (session, mut rx) = connect(&engine);
    next(&mut rx).await;

    engine
        .submit(session, wire::annotate(session.0, diagrams::WITH_CONSTRAINTS))
        .await
        .unwrap();
    let reply = next(&mut rx).await;
    let (_, payload) = split_reply(&reply);

    let inbound: Value = serde_json::from_str(diagrams::WITH_CONSTRAINTS).unwrap();
    let outbound: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(outbound["constraints"], inbound["constraints"]);

    let annotations = outbound["model"]["children"][0]["annotations"]
        .as_array()
        .unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0]["icon"], "bolt");
    assert_eq!(annotations[0]["tfg"], 0);
    assert_eq!(annotations[1]["tfg"], 1);
    assert_ne!(annotations[0]["color"], annotations[1]["color"]);
}

#[tokio::test]
async fn test_second_pass_keeps_uncolored_annotations() {
    let engine = engine_with(Arc::new(EverythingViolated), 2);
    let (session, mut rx) = connect(&engine);
    next(&mut rx).await;

    let mut doc: Value = serde_json::from_str(diagrams::ANNOTATED).unwrap();
    doc["constraints"] = serde_json::json!([
        {"name": "C", "constraint": "data X neverFlows vertex Y"}
    ]);
    engine
        .submit(session, wire::annotate(session.0, &doc.to_string()))
        .await
        .unwrap();

    let reply = next(&mut rx).await;
    let (_, payload) = split_reply(&reply);
    assert!(!payload.starts_with("Error:"), "{}", payload);

    let outbound: Value = serde_json::from_str(payload).unwrap();
    let annotations = outbound["model"]["children"][1]["annotations"]
        .as_array()
        .unwrap();
    assert_eq!(
        annotations[0],
        serde_json::json!({"message": "Propagated Sensitivity.Personal", "icon": "tag"})
    );
    assert_eq!(annotations[1]["message"], "Constraint C violated");
    assert_eq!(annotations[1]["tfg"], 0);
}

#[tokio::test]
async fn test_errors_stay_with_their_session() {
    let engine = engine_with(Arc::new(IdentityBackend), 4);
    let (a, mut ra) = connect(&engine);
    let (b, mut rb) = connect(&engine);
    next(&mut ra).await;
    next(&mut rb).await;

    let missing_role = bundles::bundle(&[bundles::USAGE_MODEL, bundles::ALLOCATION]);
    engine
        .submit(a, wire::component_model(a.0, &missing_role))
        .await
        .unwrap();
    engine
        .submit(b, wire::annotate(b.0, diagrams::SIMPLE))
        .await
        .unwrap();

    assert_eq!(
        next(&mut ra).await,
        format!("{}:Error:Missing nodecharacteristics file in bundle", a)
    );
    assert!(next(&mut rb).await.starts_with(&format!("{}:{{", b)));
}

#[tokio::test]
async fn test_unparsable_session_answered_on_origin() {
    let engine = engine_with(Arc::new(IdentityBackend), 1);
    let (session, mut rx) = connect(&engine);
    next(&mut rx).await;

    engine
        .submit(session, "garbage without id".to_string())
        .await
        .unwrap();
    let reply = next(&mut rx).await;
    assert!(reply.starts_with(&format!("{}:Error:", session)), "{}", reply);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_many_messages_with_small_worker_limit() {
    let engine = engine_with(Arc::new(IdentityBackend), 2);
    let (session, mut rx) = connect(&engine);
    next(&mut rx).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let doc = diagrams::with_nodes(&[&format!("n{}", i)]);
        handles.push(
            engine
                .submit(session, wire::annotate(session.0, &doc))
                .await
                .unwrap(),
        );
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut seen: Vec<String> = Vec::new();
    for _ in 0..20 {
        let reply = next(&mut rx).await;
        seen.extend(dfd_test::child_ids(split_reply(&reply).1));
    }
    seen.sort();
    let mut expected: Vec<String> = (0..20).map(|i| format!("n{}", i)).collect();
    expected.sort();
    assert_eq!(seen, expected);
    assert_eq!(engine.available_workers(), 2);
}

#[tokio::test]
async fn test_disconnect_during_work_drops_reply() {
    let engine = engine_with(Arc::new(IdentityBackend), 1);
    let (session, mut rx) = connect(&engine);
    next(&mut rx).await;

    engine.disconnect(session);
    engine
        .submit(session, wire::annotate(session.0, diagrams::SIMPLE))
        .await
        .unwrap()
        .await
        .unwrap();

    // Channel closed by forget; nothing was queued.
    assert!(rx.recv().await.is_none());
    assert!(engine.registry().is_empty());
}
