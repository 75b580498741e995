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

//! Deterministic annotation colors.
//!
//! Every violation message maps to a fixed color so that the editor can group
//! repeated violations of the same constraint visually. The message is hashed
//! with SHA-256 and the first three digest bytes seed hue, saturation and
//! brightness. Saturation and brightness are clamped into a band that stays
//! legible on both light and dark canvases.

use sha2::{Digest, Sha256};

/// Lower and upper bound applied to the saturation seed.
pub const SATURATION_RANGE: (f32, f32) = (0.5, 1.0);

/// Lower and upper bound applied to the brightness seed.
pub const BRIGHTNESS_RANGE: (f32, f32) = (0.3, 0.8);

/// Derive the `#rrggbb` color for an annotation message.
///
/// Pure: the same message always yields the same color, independent of the
/// order in which violations are processed.
///
/// # Examples
///
/// ```
/// use dfd_model::deterministic_color;
///
/// let a = deterministic_color("Constraint C1 violated");
/// assert_eq!(a, deterministic_color("Constraint C1 violated"));
/// assert_eq!(a.len(), 7);
/// ```
pub fn deterministic_color(message: &str) -> String {
    let digest = Sha256::digest(message.as_bytes());

    let hue = f32::from(digest[0]) / 255.0;
    let saturation =
        (f32::from(digest[1]) / 255.0).clamp(SATURATION_RANGE.0, SATURATION_RANGE.1);
    let brightness =
        (f32::from(digest[2]) / 255.0).clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1);

    let (r, g, b) = hsb_to_rgb(hue, saturation, brightness);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Convert an HSB triple (each component in `[0, 1]`) to 8-bit RGB.
///
/// Hue wraps around, so `0.0` and `1.0` are both red.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> (u8, u8, u8) {
    if saturation == 0.0 {
        let v = to_channel(brightness);
        return (v, v, v);
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };

    (to_channel(r), to_channel(g), to_channel(b))
}

fn to_channel(component: f32) -> u8 {
    (component * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_hex(color: &str) -> (u8, u8, u8) {
        assert!(color.starts_with('#') && color.len() == 7, "bad color {color}");
        let channel = |i: usize| u8::from_str_radix(&color[i..i + 2], 16).unwrap();
        (channel(1), channel(3), channel(5))
    }

    #[test]
    fn test_color_is_stable() {
        let first = deterministic_color("Constraint NoSensitiveToPublic violated");
        for _ in 0..10 {
            assert_eq!(first, deterministic_color("Constraint NoSensitiveToPublic violated"));
        }
    }

    #[test]
    fn test_color_format() {
        let color = deterministic_color("anything");
        assert!(color
            .chars()
            .skip(1)
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        parse_hex(&color);
    }

    #[test]
    fn test_distinct_messages_differ() {
        let a = deterministic_color("Constraint A violated");
        let b = deterministic_color("Constraint B violated");
        assert_ne!(a, b);
    }

    #[test]
    fn test_color_is_neither_black_nor_white() {
        for i in 0..200 {
            let (r, g, b) = parse_hex(&deterministic_color(&format!("Constraint {i} violated")));
            let max = r.max(g).max(b);
            // Brightness is the max channel and lives in [0.3, 0.8].
            assert!(max >= 76 && max <= 204, "brightness out of band: {max}");
            let min = r.min(g).min(b);
            // Saturation >= 0.5 means min <= max / 2 (with rounding slack).
            assert!(u16::from(min) * 2 <= u16::from(max) + 1, "washed out: {r} {g} {b}");
        }
    }

    #[test]
    fn test_hsb_primary_colors() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsb_to_rgb(1.0 / 3.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsb_to_rgb(2.0 / 3.0, 1.0, 1.0), (0, 0, 255));
        assert_eq!(hsb_to_rgb(1.0, 1.0, 1.0), (255, 0, 0));
    }

    #[test]
    fn test_hsb_grey_when_unsaturated() {
        assert_eq!(hsb_to_rgb(0.42, 0.0, 0.5), (128, 128, 128));
        assert_eq!(hsb_to_rgb(0.42, 0.0, 0.0), (0, 0, 0));
    }
}
