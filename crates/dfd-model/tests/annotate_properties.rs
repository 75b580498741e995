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

//! Property-based tests for violation annotation.

use dfd_model::{annotate, deterministic_color, Violation, WebEditorDfd};
use proptest::prelude::*;

fn node_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,7}", 1..12)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
}

fn diagram(ids: &[String]) -> WebEditorDfd {
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    WebEditorDfd::from_json(&dfd_test::diagrams::with_nodes(&refs)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the color of a message never changes between calls.
    #[test]
    fn prop_color_is_pure(message in ".{0,64}") {
        prop_assert_eq!(deterministic_color(&message), deterministic_color(&message));
    }

    /// Property: annotation never reorders, adds or removes nodes.
    #[test]
    fn prop_ids_preserved(
        ids in node_ids(),
        picks in prop::collection::vec((any::<prop::sample::Index>(), 0_i64..4), 0..8)
    ) {
        let doc = diagram(&ids);
        let violations: Vec<Violation> = picks
            .iter()
            .enumerate()
            .map(|(i, (idx, group))| {
                Violation::new(format!("C{}", i), [idx.get(&ids).clone()], *group)
            })
            .collect();

        let annotated = annotate(doc.clone(), &violations).unwrap();
        prop_assert_eq!(annotated.child_ids(), doc.child_ids());
    }

    /// Property: each node gains exactly one annotation per violation matching it.
    #[test]
    fn prop_annotations_are_appended(
        ids in node_ids(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..16)
    ) {
        let doc = diagram(&ids);
        let violations: Vec<Violation> = picks
            .iter()
            .enumerate()
            .map(|(i, idx)| Violation::new(format!("C{}", i % 3), [idx.get(&ids).clone()], 0))
            .collect();

        let annotated = annotate(doc, &violations).unwrap();
        for id in &ids {
            let expected = violations
                .iter()
                .filter(|v| v.matched_node_ids.contains(id))
                .count();
            let actual = annotated.node(id).unwrap().annotation_list().len();
            prop_assert_eq!(actual, expected, "node {}", id);
        }
    }

    /// Property: an id outside the diagram always fails the pass.
    #[test]
    fn prop_unknown_id_rejected(ids in node_ids()) {
        let doc = diagram(&ids);
        let violations = vec![Violation::new("C", ["UNKNOWN-NODE"], 0)];
        prop_assert!(annotate(doc, &violations).is_err());
    }
}
