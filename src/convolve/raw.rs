use crate::kernel::{CHANNELS, LAPLACIAN, RADIUS, SIZE, clamp_to_u8};

/// Bytes covered by one kernel row: five BGR pixels.
const WINDOW: usize = SIZE * CHANNELS;

/// Offset arithmetic from a fixed window base.
///
/// Each kernel row is borrowed once as a `WINDOW`-byte slice; the 15 taps
/// inside it use constant offsets the compiler proves in range, so no
/// per-tap bounds check survives.
pub(super) fn convolve(src: &[u8], dst: &mut [u8], width: usize, height: usize) {
    let pitch = width * CHANNELS;
    for row in RADIUS..height - RADIUS {
        let top = (row - RADIUS) * pitch;
        let out_row = row * pitch;
        for col in RADIUS..width - RADIUS {
            let base = top + (col - RADIUS) * CHANNELS;
            let (mut b, mut g, mut r) = (0i32, 0i32, 0i32);
            for (kr, weights) in LAPLACIAN.iter().enumerate() {
                let window = &src[base + kr * pitch..][..WINDOW];
                for (kc, &weight) in weights.iter().enumerate() {
                    let p = kc * CHANNELS;
                    b += i32::from(window[p]) * weight;
                    g += i32::from(window[p + 1]) * weight;
                    r += i32::from(window[p + 2]) * weight;
                }
            }
            let out = &mut dst[out_row + col * CHANNELS..][..CHANNELS];
            out[0] = clamp_to_u8(b);
            out[1] = clamp_to_u8(g);
            out[2] = clamp_to_u8(r);
        }
    }
}
