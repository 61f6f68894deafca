//! Grid quantization for planar coordinates.
//!
//! The height cache keys its entries by (x, z) rounded to the nearest multiple of a
//! fixed step, so nearby queries share a slot.

/// Quantize `value` to the nearest multiple of `step`, as an integer cell index.
///
/// Saturates at the `i32` range; a non-positive `step` is treated as 1.
#[inline]
pub fn quantize_coord(value: f32, step: f32) -> i32 {
    let step = if step > 0.0 { step } else { 1.0 };
    let q = (value / step).round();
    if q.is_nan() {
        return 0;
    }
    q.clamp(i32::MIN as f32, i32::MAX as f32) as i32
}

/// Cache key for the planar point (x, z).
#[inline]
pub fn quantize_xz(x: f32, z: f32, step: f32) -> (i32, i32) {
    (quantize_coord(x, step), quantize_coord(z, step))
}
