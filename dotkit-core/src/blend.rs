//! # Blending
//!
//! The straight-alpha "over" operator. Every compositing path in the crate funnels through
//! [`over`], so the flat and bounds-checked paths in [`crate::state::layers`] can never drift apart.

use crate::color::Argb;

/// Effective alpha of `src` under a layer opacity, in `[0, 1]`.
#[must_use]
pub fn effective_alpha(src: Argb, opacity: f32) -> f32 {
    f32::from(src.alpha()) / 255.0 * opacity
}

/// Composite `src` over `dst`, where `src_alpha` is the already-modulated alpha of `src` in `[0, 1]`.
///
/// ```text
/// outA = srcA + dstA * (1 - srcA)
/// outC = (srcC * srcA + dstC * dstA * (1 - srcA)) / outA
/// ```
/// Results are rounded to the nearest integer channel value. A zero `outA` yields `0x00000000`.
/// A non-positive `src_alpha` leaves `dst` untouched.
#[must_use]
pub fn over(dst: Argb, src: Argb, src_alpha: f32) -> Argb {
    if src_alpha <= 0.0 {
        return dst;
    }
    let src_alpha = src_alpha.min(1.0);
    let dst_alpha = f32::from(dst.alpha()) / 255.0;
    let dst_weight = dst_alpha * (1.0 - src_alpha);

    let out_alpha = src_alpha + dst_weight;
    if out_alpha <= 0.0 {
        return Argb::TRANSPARENT;
    }

    let channel = |s: u8, d: u8| -> u8 {
        let value = (f32::from(s) * src_alpha + f32::from(d) * dst_weight) / out_alpha;
        to_channel(value)
    };

    Argb::new(
        to_channel(out_alpha * 255.0),
        channel(src.red(), dst.red()),
        channel(src.green(), dst.green()),
        channel(src.blue(), dst.blue()),
    )
}

/// Round and clamp a float channel into `0..=255`.
fn to_channel(value: f32) -> u8 {
    // Clamped first, so the cast is always in range.
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn opaque_source_replaces() {
        let dst = Argb(0xFF12_3456);
        let src = Argb(0xFFAB_CDEF);
        assert_eq!(over(dst, src, 1.0), src);
        assert_eq!(over(Argb::TRANSPARENT, src, 1.0), src);
    }
    #[test]
    fn zero_alpha_keeps_destination() {
        let dst = Argb(0x8012_3456);
        assert_eq!(over(dst, Argb(0x00FF_FFFF), 0.0), dst);
        assert_eq!(over(dst, Argb::WHITE, 0.0), dst);
    }
    #[test]
    fn translucent_over_transparent_is_exact() {
        // Nothing underneath, color channels should survive unchanged.
        for alpha in [1u8, 2, 77, 128, 200, 254] {
            let src = Argb::new(alpha, 199, 3, 250);
            let out = over(Argb::TRANSPARENT, src, effective_alpha(src, 1.0));
            assert_eq!(out, src, "alpha {alpha}");
        }
    }
    #[test]
    fn half_blue_over_red() {
        let red = Argb(0xFFFF_0000);
        let blue = Argb(0x8000_00FF);
        let out = over(red, blue, effective_alpha(blue, 1.0));
        // outA = 1, R = 255 * 127/255, B = 255 * 128/255
        assert_eq!(out, Argb(0xFF7F_0080));
        // Definitely not an average of the two.
        assert_ne!(out, Argb(0xBF7F_007F));
    }
    #[test]
    fn opacity_modulates() {
        let out = over(Argb::TRANSPARENT, Argb::BLACK, effective_alpha(Argb::BLACK, 0.5));
        assert_eq!(out.alpha(), 128);
        assert_eq!(out.0 & 0x00FF_FFFF, 0);
    }
}
