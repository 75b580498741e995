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

//! Component-model file bundles in the `---FILE---` framing.

/// Record separator between bundled files.
pub const SEPARATOR: &str = "---FILE---";

/// Usage model file of the bundle.
pub const USAGE_MODEL: (&str, &str) = (
    "shop.usagemodel",
    "<usagemodel:UsageModel id=\"usage\"/>",
);

/// Allocation file of the bundle.
pub const ALLOCATION: (&str, &str) = (
    "shop.allocation",
    "<allocation:Allocation id=\"alloc\"/>",
);

/// Node characteristics file of the bundle.
pub const NODE_CHARACTERISTICS: (&str, &str) = (
    "shop.nodecharacteristics",
    "<nodecharacteristics:Configuration id=\"chars\"/>",
);

/// Join `(filename, content)` records into one bundle payload.
pub fn bundle(files: &[(&str, &str)]) -> String {
    files
        .iter()
        .map(|(name, content)| format!("{}\n{}:{}\n", SEPARATOR, name, content))
        .collect()
}

/// A bundle with all three required roles.
pub fn complete() -> String {
    bundle(&[USAGE_MODEL, ALLOCATION, NODE_CHARACTERISTICS])
}
