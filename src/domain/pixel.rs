// ============================================================
// Layer 3 — Pixel Scale
// ============================================================
// Both networks see pixels in the signed unit range [-1, 1]:
//
//   encode:  x  →  x / 127.5 - 1
//   decode:  y  →  0.5 * y + 0.5        (then × 255 for display)
//
// The generator ends in tanh, so its outputs already live in
// [-1, 1]. Every producer and consumer of model tensors goes
// through these functions.

/// Map an integer pixel value in [0, 255] to [-1, 1]
pub fn to_signed_unit(value: u8) -> f32 {
    value as f32 / 127.5 - 1.0
}

/// Map a model output in [-1, 1] back to [0, 1]
pub fn to_unit(value: f32) -> f32 {
    0.5 * value + 0.5
}

/// Map a model output in [-1, 1] to a displayable 8-bit pixel.
/// Values outside the range are clamped.
pub fn to_pixel(value: f32) -> u8 {
    (to_unit(value) * 255.0).round().clamp(0.0, 255.0) as u8
}
