// ---------------------------------------------------------------------------
// Lane-parallel convolution with SIMD dispatch.
//
// Interleaved BGR input is split into three i32 planes so that LANES
// neighbouring pixels of one channel are contiguous. Each tier module owns a
// row loop: full lane groups first, scalar tail after. The split point comes
// from `lane_split`, shared by every tier.
// ---------------------------------------------------------------------------

use core::ops::Range;

use archmage::incant;

use crate::kernel::{CHANNELS, RADIUS, SIZE, TAPS, clamp_to_u8, flattened};
use crate::pool::ScratchPool;

mod scalar;
use scalar::*;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
use avx2::*;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
use neon::*;

#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
use wasm::*;

/// Pixels per lane group: one 256-bit register of `i32`.
pub const LANES: usize = 8;

const WEIGHTS: [i32; TAPS] = flattened();

/// Split the interior columns `[RADIUS, width - RADIUS)` of a row.
///
/// Returns `(vector, tail)`: `vector` holds a whole number of `lanes`-wide
/// groups starting at `RADIUS`, `tail` holds the leftover columns. The two
/// ranges are contiguous and together cover the interior exactly once.
/// With `lanes == 0` every column goes to the tail.
pub fn lane_split(width: usize, lanes: usize) -> (Range<usize>, Range<usize>) {
    let end = width.saturating_sub(RADIUS).max(RADIUS);
    let groups = (end - RADIUS).checked_div(lanes).unwrap_or(0);
    let split = RADIUS + groups * lanes;
    (RADIUS..split, split..end)
}

pub(super) fn convolve(pool: &ScratchPool, src: &[u8], dst: &mut [u8], width: usize, height: usize) {
    let n = width * height;
    let mut scratch = pool.rent(n * CHANNELS);
    deinterleave(src, &mut scratch, n);
    let planes: &[i32] = &scratch;
    incant!(convolve_planes(planes, dst, width, height), [v3, arm_v2, wasm128, scalar]);
}

// ===========================================================================
// Shared helpers
// ===========================================================================

fn deinterleave(src: &[u8], planes: &mut [i32], n: usize) {
    let (b, rest) = planes.split_at_mut(n);
    let (g, r) = rest.split_at_mut(n);
    for (((px, b), g), r) in src.chunks_exact(CHANNELS).zip(b).zip(g).zip(r) {
        *b = i32::from(px[0]);
        *g = i32::from(px[1]);
        *r = i32::from(px[2]);
    }
}

#[inline(always)]
fn split_planes(planes: &[i32], n: usize) -> [&[i32]; CHANNELS] {
    let (b, rest) = planes.split_at(n);
    let (g, r) = rest.split_at(n);
    [b, g, r]
}

/// Index of tap `k` for the pixel at `(row, col)` within a plane.
#[inline(always)]
fn tap_index(width: usize, row: usize, col: usize, k: usize) -> usize {
    (row + k / SIZE - RADIUS) * width + col + k % SIZE - RADIUS
}

/// Scalar path for columns that do not fill a lane group.
#[inline(always)]
fn tail_pixel(planes: &[&[i32]; CHANNELS], width: usize, row: usize, col: usize) -> [u8; CHANNELS] {
    let mut out = [0u8; CHANNELS];
    for (c, plane) in planes.iter().enumerate() {
        let mut sum = 0i32;
        for (k, &weight) in WEIGHTS.iter().enumerate() {
            sum += plane[tap_index(width, row, col, k)] * weight;
        }
        out[c] = clamp_to_u8(sum);
    }
    out
}

/// Write one clamped lane group of channel `c` back into interleaved output.
#[inline(always)]
fn scatter(dst: &mut [u8], width: usize, row: usize, col: usize, c: usize, lanes: &[i32; LANES]) {
    let base = (row * width + col) * CHANNELS + c;
    for (i, &v) in lanes.iter().enumerate() {
        dst[base + i * CHANNELS] = v as u8;
    }
}

#[inline(always)]
fn store_pixel(dst: &mut [u8], width: usize, row: usize, col: usize, px: [u8; CHANNELS]) {
    dst[(row * width + col) * CHANNELS..][..CHANNELS].copy_from_slice(&px);
}
