// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color-space conversion between hex sRGB and linear RGBA.
//!
//! The standard sRGB transfer function (IEC 61966-2-1) in both directions;
//! hex input accepts 3- or 6-digit strings with an optional `#` prefix.

use crate::error::{Error, Result};

/// sRGB-encoded channel to linear
#[inline]
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear channel to sRGB-encoded
#[inline]
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Parse a hex color into linear RGBA. Shorthand (`#abc`) expands to
/// (`#aabbcc`); alpha is fixed at 1.0.
pub fn hex_to_linear_rgba(hex: &str) -> Result<[f64; 4]> {
    let stripped = hex.strip_prefix('#').unwrap_or(hex);

    let expanded: String = match stripped.len() {
        3 => stripped.chars().flat_map(|c| [c, c]).collect(),
        6 => stripped.to_string(),
        n => {
            return Err(Error::InvalidColorFormat(format!(
                "expected 3 or 6 hex digits, got {n} in {hex:?}"
            )))
        }
    };

    let mut rgb = [0.0f64; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
            .map_err(|_| Error::InvalidColorFormat(format!("non-hex characters in {hex:?}")))?;
        *channel = srgb_to_linear(byte as f64 / 255.0);
    }

    Ok([rgb[0], rgb[1], rgb[2], 1.0])
}

/// Linear RGB to an sRGB-encoded RGBA8 vertex color
pub fn linear_to_rgba8(linear: &[f64; 4]) -> [u8; 4] {
    let mut out = [255u8; 4];
    for (i, &c) in linear.iter().take(3).enumerate() {
        let srgb = linear_to_srgb(c);
        out[i] = (srgb * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out
}
