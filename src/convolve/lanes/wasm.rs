use core::arch::wasm32::{i32x4_add, i32x4_max, i32x4_min, i32x4_mul, i32x4_splat, v128};

use archmage::prelude::*;

use super::{LANES, WEIGHTS, lane_split, scatter, split_planes, store_pixel, tail_pixel, tap_index};
use crate::kernel::RADIUS;

/// `i32` lanes per v128; a lane group spans two.
const HALF: usize = 4;

const _: () = assert!(LANES == 2 * HALF);

// ===========================================================================
// WASM SIMD128: two v128 per lane group
// ===========================================================================

#[rite]
fn load_wasm128(_token: Wasm128Token, taps: &[i32]) -> v128 {
    let taps: &[i32; HALF] = taps.try_into().unwrap();
    v128_load(bytemuck::cast_ref::<[i32; HALF], [u8; 16]>(taps))
}

#[rite]
fn clamp_store_wasm128(_token: Wasm128Token, v: v128, out: &mut [i32]) {
    let clamped = i32x4_min(i32x4_max(v, i32x4_splat(0)), i32x4_splat(255));
    let out: &mut [i32; HALF] = out.try_into().unwrap();
    v128_store(bytemuck::cast_mut::<[i32; HALF], [u8; 16]>(out), clamped);
}

#[rite]
fn lane_group_wasm128(
    t: Wasm128Token,
    plane: &[i32],
    width: usize,
    row: usize,
    col: usize,
) -> [i32; LANES] {
    let mut lo = i32x4_splat(0);
    let mut hi = i32x4_splat(0);
    for (k, &weight) in WEIGHTS.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        let start = tap_index(width, row, col, k);
        let w = i32x4_splat(weight);
        lo = i32x4_add(lo, i32x4_mul(load_wasm128(t, &plane[start..start + HALF]), w));
        hi = i32x4_add(hi, i32x4_mul(load_wasm128(t, &plane[start + HALF..start + LANES]), w));
    }
    let mut out = [0i32; LANES];
    let (out_lo, out_hi) = out.split_at_mut(HALF);
    clamp_store_wasm128(t, lo, out_lo);
    clamp_store_wasm128(t, hi, out_hi);
    out
}

#[arcane]
pub(super) fn convolve_planes_wasm128(
    t: Wasm128Token,
    planes: &[i32],
    dst: &mut [u8],
    width: usize,
    height: usize,
) {
    let planes = split_planes(planes, width * height);
    let (vector, tail) = lane_split(width, LANES);
    for row in RADIUS..height - RADIUS {
        for col in vector.clone().step_by(LANES) {
            for (c, plane) in planes.iter().enumerate() {
                let acc = lane_group_wasm128(t, plane, width, row, col);
                scatter(dst, width, row, col, c, &acc);
            }
        }
        for col in tail.clone() {
            store_pixel(dst, width, row, col, tail_pixel(&planes, width, row, col));
        }
    }
}
