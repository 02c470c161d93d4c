//! Hex color parsing and interpolation.

use image::Rgba;

use crate::error::{Result, StyleError};

/// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional, case-insensitive).
///
/// # Example
///
/// ```rust
/// use qrforge::color::parse_hex;
///
/// assert_eq!(parse_hex("#ff0000").unwrap().0, [255, 0, 0, 255]);
/// assert_eq!(parse_hex("0f0").unwrap().0, [0, 255, 0, 255]);
/// ```
pub fn parse_hex(input: &str) -> Result<Rgba<u8>> {
    let s = input.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    let invalid = || StyleError::InvalidColor(input.to_string());

    if !s.is_ascii() {
        return Err(invalid());
    }
    let byte = |pair: &str| u8::from_str_radix(pair, 16).map_err(|_| invalid());

    match s.len() {
        3 => {
            let mut out = [0u8, 0, 0, 255];
            for (i, c) in s.chars().enumerate() {
                let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                out[i] = v * 17;
            }
            Ok(Rgba(out))
        }
        6 => Ok(Rgba([byte(&s[0..2])?, byte(&s[2..4])?, byte(&s[4..6])?, 255])),
        8 => Ok(Rgba([
            byte(&s[0..2])?,
            byte(&s[2..4])?,
            byte(&s[4..6])?,
            byte(&s[6..8])?,
        ])),
        _ => Err(invalid()),
    }
}

/// Formats a color as `#rrggbb`, dropping alpha.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
pub fn lerp(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = a.0[i] as f32 + (b.0[i] as f32 - a.0[i] as f32) * t;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Blends `src` over `dst` with an extra coverage factor in `[0, 1]`.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let sa = (src.0[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}
