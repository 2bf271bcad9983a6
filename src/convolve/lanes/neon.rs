use core::arch::aarch64::{int32x4_t, vaddq_s32, vdupq_n_s32, vmaxq_s32, vminq_s32, vmulq_s32};

use archmage::prelude::*;

use super::{LANES, WEIGHTS, lane_split, scatter, split_planes, store_pixel, tail_pixel, tap_index};
use crate::kernel::RADIUS;

/// `i32` lanes per NEON register; a lane group spans two.
const HALF: usize = 4;

const _: () = assert!(LANES == 2 * HALF);

// ===========================================================================
// ARM NEON: two int32x4_t per lane group
// ===========================================================================

#[rite]
fn clamp_store_arm_v2(_token: Arm64V2Token, v: int32x4_t, out: &mut [i32]) {
    let clamped = vminq_s32(vmaxq_s32(v, vdupq_n_s32(0)), vdupq_n_s32(255));
    let out: &mut [i32; HALF] = out.try_into().unwrap();
    vst1q_s32(out, clamped);
}

#[rite]
fn lane_group_arm_v2(
    t: Arm64V2Token,
    plane: &[i32],
    width: usize,
    row: usize,
    col: usize,
) -> [i32; LANES] {
    let mut lo = vdupq_n_s32(0);
    let mut hi = vdupq_n_s32(0);
    for (k, &weight) in WEIGHTS.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        let start = tap_index(width, row, col, k);
        let w = vdupq_n_s32(weight);
        let a: &[i32; HALF] = plane[start..start + HALF].try_into().unwrap();
        let b: &[i32; HALF] = plane[start + HALF..start + LANES].try_into().unwrap();
        lo = vaddq_s32(lo, vmulq_s32(vld1q_s32(a), w));
        hi = vaddq_s32(hi, vmulq_s32(vld1q_s32(b), w));
    }
    let mut out = [0i32; LANES];
    let (out_lo, out_hi) = out.split_at_mut(HALF);
    clamp_store_arm_v2(t, lo, out_lo);
    clamp_store_arm_v2(t, hi, out_hi);
    out
}

#[arcane]
pub(super) fn convolve_planes_arm_v2(
    t: Arm64V2Token,
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
                let acc = lane_group_arm_v2(t, plane, width, row, col);
                scatter(dst, width, row, col, c, &acc);
            }
        }
        for col in tail.clone() {
            store_pixel(dst, width, row, col, tail_pixel(&planes, width, row, col));
        }
    }
}
