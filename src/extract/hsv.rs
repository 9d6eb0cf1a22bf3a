//! 8-bit RGB to HSV conversion.
//!
//! Hue is expressed in half-degrees so it fits a byte (`0..=180`); saturation
//! and value span `0..=255`. Default color bounds in [`crate::config`] are
//! written in this convention.

/// Convert one RGB pixel to `[h, s, v]`.
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (ri, gi, bi) = (i32::from(r), i32::from(g), i32::from(b));
    let max = ri.max(gi).max(bi);
    let min = ri.min(gi).min(bi);
    let delta = max - min;

    let s = if max == 0 {
        0
    } else {
        (delta as f32 * 255.0 / max as f32).round() as i32
    };

    let h = if delta == 0 {
        0.0
    } else {
        let d = delta as f32;
        let degrees = if max == ri {
            60.0 * (gi - bi) as f32 / d
        } else if max == gi {
            120.0 + 60.0 * (bi - ri) as f32 / d
        } else {
            240.0 + 60.0 * (ri - gi) as f32 / d
        };
        if degrees < 0.0 { degrees + 360.0 } else { degrees }
    };

    [
        (h / 2.0).round().clamp(0.0, 180.0) as u8,
        s.clamp(0, 255) as u8,
        max as u8,
    ]
}
