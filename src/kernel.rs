//! The fixed 5×5 edge-detection kernel shared by every strategy.
//!
//! Weights sum to zero, so a flat region convolves to 0 and edges produce
//! sums well outside `0..=255`. Results are clamped, never normalised.

/// Laplacian-style weights, row-major, indexed `[kernel_row][kernel_col]`.
pub const LAPLACIAN: [[i32; SIZE]; SIZE] = [
    [0, 0, -1, 0, 0],
    [0, -1, -2, -1, 0],
    [-1, -2, 16, -2, -1],
    [0, -1, -2, -1, 0],
    [0, 0, -1, 0, 0],
];

/// Half-width of the kernel, excluding the centre tap.
pub const RADIUS: usize = 2;

/// Side length of the kernel.
pub const SIZE: usize = 5;

/// Bytes per pixel. Channel order is B, G, R.
pub const CHANNELS: usize = 3;

/// Number of taps (`SIZE * SIZE`).
pub const TAPS: usize = SIZE * SIZE;

const _: () = assert!(SIZE == 2 * RADIUS + 1);

/// Row-major copy of [`LAPLACIAN`] as a flat array.
pub const fn flattened() -> [i32; TAPS] {
    let mut out = [0i32; TAPS];
    let mut i = 0;
    while i < TAPS {
        out[i] = LAPLACIAN[i / SIZE][i % SIZE];
        i += 1;
    }
    out
}

/// Saturate an accumulated channel sum to a byte.
#[inline(always)]
pub fn clamp_to_u8(sum: i32) -> u8 {
    sum.clamp(0, 255) as u8
}

/// True when an image of this size has at least one interior pixel.
#[inline]
pub(crate) fn has_interior(width: usize, height: usize) -> bool {
    width >= SIZE && height >= SIZE
}
