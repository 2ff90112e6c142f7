//! Packed pixel arithmetic.
//!
//! A pixel is one `u32`: color channels at bit offsets 0, 8 and 16, and a
//! reserved byte at 24 that hosts use for alpha. Little-endian RGBA bytes
//! read as a `u32` land in exactly this layout.

/// Number of color channels that take part in scoring and blending.
pub const COLOR_CHANNELS: usize = 3;

/// Reserved byte forced on by the compositor.
pub const OPAQUE: u32 = 0xFF00_0000;

/// Largest per-pixel similarity: every color channel identical.
pub const MAX_SIMILARITY: u32 = 255 * COLOR_CHANNELS as u32;

#[inline]
pub fn channel(pixel: u32, index: usize) -> u32 {
    (pixel >> (index * 8)) & 0xFF
}

/// Splits a pixel into its four bytes, widened for accumulation.
#[inline]
pub fn unpack(pixel: u32) -> [u32; 4] {
    [
        channel(pixel, 0),
        channel(pixel, 1),
        channel(pixel, 2),
        channel(pixel, 3),
    ]
}

/// Packs four bytes back into a pixel. Each lane must already fit in 8 bits.
#[inline]
pub fn pack(lanes: [u32; 4]) -> u32 {
    debug_assert!(lanes.iter().all(|lane| *lane <= 0xFF));
    lanes[0] | lanes[1] << 8 | lanes[2] << 16 | lanes[3] << 24
}

/// Sum over color channels of `255 - |a - b|`; the reserved byte is ignored.
#[inline]
pub fn similarity(a: u32, b: u32) -> u32 {
    (0..COLOR_CHANNELS)
        .map(|c| 255 - channel(a, c).abs_diff(channel(b, c)))
        .sum()
}

/// Scales every color channel by `weight / 255`; the reserved byte is dropped.
#[inline]
pub fn scale(pixel: u32, weight: u32) -> u32 {
    debug_assert!(weight <= 255);
    (0..COLOR_CHANNELS).fold(0, |acc, c| acc | (channel(pixel, c) * weight / 255) << (c * 8))
}

/// Mixes `a` weighted by `t / 255` with `b` weighted by the rest, opaque.
///
/// Per channel `a*t/255 + b*(255-t)/255` never exceeds 255, so lanes add
/// without carrying into their neighbors.
#[inline]
pub fn mix(a: u32, b: u32, t: u32) -> u32 {
    debug_assert!(t <= 255);
    (scale(a, t) + scale(b, 255 - t)) | OPAQUE
}

#[cfg(test)]
mod tests {
    use super::{mix, pack, scale, similarity, unpack, MAX_SIMILARITY, OPAQUE};

    #[test]
    fn unpack_pack_splits_bytes() {
        let pixel = 0x80_33_66_99;
        assert_eq!(unpack(pixel), [0x99, 0x66, 0x33, 0x80]);
        assert_eq!(pack(unpack(pixel)), pixel);
    }

    #[test]
    fn similarity_ignores_reserved_byte() {
        assert_eq!(similarity(0x00_10_20_30, 0xFF_10_20_30), MAX_SIMILARITY);
        assert_eq!(similarity(0x00_00_00_00, 0x00_FF_FF_FF), 0);
        assert_eq!(similarity(0x00_00_00_10, 0x00_00_00_00), MAX_SIMILARITY - 0x10);
    }

    #[test]
    fn scale_extremes() {
        assert_eq!(scale(0xFF_AB_CD_EF, 255), 0x00_AB_CD_EF);
        assert_eq!(scale(0xFF_AB_CD_EF, 0), 0);
    }

    #[test]
    fn mix_is_opaque_and_weighted() {
        assert_eq!(mix(0x00_FF_FF_FF, 0, 255), 0xFF_FF_FF_FF);
        assert_eq!(mix(0x00_FF_FF_FF, 0, 0), OPAQUE);
        let half = mix(0x00_FF_FF_FF, 0x00_00_00_00, 128);
        assert_eq!(half & 0xFF, 128);
    }
}
