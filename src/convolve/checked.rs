use crate::kernel::{CHANNELS, LAPLACIAN, RADIUS, clamp_to_u8};

/// Every tap goes through a bounds-checked slice index.
pub(super) fn convolve(src: &[u8], dst: &mut [u8], width: usize, height: usize) {
    for row in RADIUS..height - RADIUS {
        for col in RADIUS..width - RADIUS {
            let sums = pixel(src, width, row, col);
            let out = (row * width + col) * CHANNELS;
            for (c, &sum) in sums.iter().enumerate() {
                dst[out + c] = clamp_to_u8(sum);
            }
        }
    }
}

#[inline(always)]
fn pixel(src: &[u8], width: usize, row: usize, col: usize) -> [i32; CHANNELS] {
    let mut sums = [0i32; CHANNELS];
    for (kr, weights) in LAPLACIAN.iter().enumerate() {
        for (kc, &weight) in weights.iter().enumerate() {
            let image_row = row + kr - RADIUS;
            let image_col = col + kc - RADIUS;
            let idx = (image_row * width + image_col) * CHANNELS;
            for (c, sum) in sums.iter_mut().enumerate() {
                *sum += i32::from(src[idx + c]) * weight;
            }
        }
    }
    sums
}
