use archmage::prelude::*;

use super::{LANES, WEIGHTS, lane_split, scatter, split_planes, store_pixel, tail_pixel, tap_index};
use crate::kernel::RADIUS;

// ===========================================================================
// Portable lanes: fixed-width arrays the optimiser can vectorise
// ===========================================================================

fn lane_group_scalar(plane: &[i32], width: usize, row: usize, col: usize) -> [i32; LANES] {
    let mut acc = [0i32; LANES];
    for (k, &weight) in WEIGHTS.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        let start = tap_index(width, row, col, k);
        for (a, &v) in acc.iter_mut().zip(&plane[start..start + LANES]) {
            *a += v * weight;
        }
    }
    acc.map(|s| s.clamp(0, 255))
}

pub(super) fn convolve_planes_scalar(
    _token: ScalarToken,
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
                let acc = lane_group_scalar(plane, width, row, col);
                scatter(dst, width, row, col, c, &acc);
            }
        }
        for col in tail.clone() {
            store_pixel(dst, width, row, col, tail_pixel(&planes, width, row, col));
        }
    }
}
