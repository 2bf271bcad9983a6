use super::Geometry;
use crate::kernel::{CHANNELS, RADIUS, SIZE, TAPS, clamp_to_u8, flattened};
use crate::pool::ScratchPool;

/// Row-pitch addressing over caller-owned memory.
///
/// Each kernel row is borrowed as exactly `width * 3` bytes starting at
/// `y * stride`, so padding is out of reach for both reads and writes.
pub(super) fn convolve(pool: &ScratchPool, src: &[u8], dst: &mut [u8], geometry: Geometry) {
    let Geometry {
        width,
        height,
        stride,
    } = geometry;
    let row_bytes = geometry.row_bytes();

    let mut weights = pool.rent(TAPS);
    weights.copy_from_slice(&flattened());

    for y in RADIUS..height - RADIUS {
        let rows: [&[u8]; SIZE] =
            core::array::from_fn(|ky| &src[(y + ky - RADIUS) * stride..][..row_bytes]);
        let out_row = &mut dst[y * stride..][..row_bytes];
        for x in RADIUS..width - RADIUS {
            let (mut b, mut g, mut r) = (0i32, 0i32, 0i32);
            for (ky, row) in rows.iter().enumerate() {
                for kx in 0..SIZE {
                    let p = (x + kx - RADIUS) * CHANNELS;
                    let w = weights[ky * SIZE + kx];
                    b += i32::from(row[p]) * w;
                    g += i32::from(row[p + 1]) * w;
                    r += i32::from(row[p + 2]) * w;
                }
            }
            let out = &mut out_row[x * CHANNELS..][..CHANNELS];
            out[0] = clamp_to_u8(b);
            out[1] = clamp_to_u8(g);
            out[2] = clamp_to_u8(r);
        }
    }
}
