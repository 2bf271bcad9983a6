use archmage::prelude::*;

use super::{LANES, WEIGHTS, lane_split, scatter, split_planes, store_pixel, tail_pixel, tap_index};
use crate::kernel::RADIUS;

const _: () = assert!(LANES * 4 == 32);

// ===========================================================================
// x86-64 AVX2: eight i32 lanes per register
// ===========================================================================

#[rite]
fn lane_group_v3(
    _token: X64V3Token,
    plane: &[i32],
    width: usize,
    row: usize,
    col: usize,
) -> [i32; LANES] {
    let zero = _mm256_setzero_si256();
    let mut acc = zero;
    for (k, &weight) in WEIGHTS.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        let start = tap_index(width, row, col, k);
        let taps: &[i32; LANES] = plane[start..start + LANES].try_into().unwrap();
        let bytes = bytemuck::cast_ref::<[i32; LANES], [u8; 32]>(taps);
        let v = _mm256_loadu_si256(bytes);
        acc = _mm256_add_epi32(acc, _mm256_mullo_epi32(v, _mm256_set1_epi32(weight)));
    }
    let clamped = _mm256_min_epi32(_mm256_max_epi32(acc, zero), _mm256_set1_epi32(255));
    let mut out = [0i32; LANES];
    let bytes = bytemuck::cast_mut::<[i32; LANES], [u8; 32]>(&mut out);
    _mm256_storeu_si256(bytes, clamped);
    out
}

#[arcane]
pub(super) fn convolve_planes_v3(
    t: X64V3Token,
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
                let acc = lane_group_v3(t, plane, width, row, col);
                scatter(dst, width, row, col, c, &acc);
            }
        }
        for col in tail.clone() {
            store_pixel(dst, width, row, col, tail_pixel(&planes, width, row, col));
        }
    }
}
