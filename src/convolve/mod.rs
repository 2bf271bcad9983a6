// ---------------------------------------------------------------------------
// 5×5 convolution over packed or strided BGR buffers.
//
// Four strategies share one numeric contract: i32 accumulation per channel,
// clamp to 0..=255, border band of RADIUS pixels left untouched. They differ
// only in how pixel memory is addressed. Public functions validate geometry
// once, then hand validated slices to the per-strategy loops.
// ---------------------------------------------------------------------------

use crate::error::GeometryError;
use crate::kernel::{CHANNELS, has_interior};
use crate::pool::{self, ScratchPool};

mod checked;
mod lanes;
mod raw;
mod strided;

pub use lanes::{LANES, lane_split};


// ===========================================================================
// Geometry
// ===========================================================================

/// Image dimensions plus row pitch.
///
/// `stride` is the distance in bytes between the start of consecutive rows
/// and must be at least `width * 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl Geometry {
    /// Tightly packed rows (`stride == width * 3`).
    pub const fn packed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stride: width.saturating_mul(CHANNELS),
        }
    }

    pub const fn with_stride(width: usize, height: usize, stride: usize) -> Self {
        Self {
            width,
            height,
            stride,
        }
    }

    /// Bytes of pixel data in one row, excluding padding.
    pub const fn row_bytes(&self) -> usize {
        self.width.saturating_mul(CHANNELS)
    }

    pub const fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }

    /// Minimum buffer length: `(height - 1) * stride + width * 3`.
    ///
    /// Zero when either dimension is zero.
    pub fn required_len(&self) -> Result<usize, GeometryError> {
        let row_bytes = self
            .width
            .checked_mul(CHANNELS)
            .ok_or(GeometryError::DimensionOverflow)?;
        if row_bytes > self.stride {
            return Err(GeometryError::InvalidStride);
        }
        if self.width == 0 || self.height == 0 {
            return Ok(0);
        }
        (self.height - 1)
            .checked_mul(self.stride)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(GeometryError::DimensionOverflow)
    }
}

// ===========================================================================
// Validation helpers
// ===========================================================================

#[inline]
fn check_packed(src_len: usize, dst_len: usize, width: usize, height: usize) -> Result<(), GeometryError> {
    let expected = Geometry::packed(width, height).required_len()?;
    for actual in [src_len, dst_len] {
        if actual != expected {
            return Err(GeometryError::LengthMismatch { expected, actual });
        }
    }
    Ok(())
}

#[inline]
fn check_strided(src_len: usize, dst_len: usize, geometry: &Geometry) -> Result<(), GeometryError> {
    let expected = geometry.required_len()?;
    for actual in [src_len, dst_len] {
        if actual < expected {
            return Err(GeometryError::LengthMismatch { expected, actual });
        }
    }
    Ok(())
}

// ===========================================================================
// Public API: one function per addressing technique
// ===========================================================================

/// Convolve a packed BGR buffer using bounds-checked indexing for every tap.
///
/// `dst` must be zero-initialised by the caller: border pixels are not written.
/// Images narrower or shorter than the kernel leave `dst` untouched.
pub fn convolve_checked(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
) -> Result<(), GeometryError> {
    check_packed(src.len(), dst.len(), width, height)?;
    if has_interior(width, height) {
        checked::convolve(src, dst, width, height);
    }
    Ok(())
}

/// Convolve a packed BGR buffer by offset arithmetic from each window's base.
///
/// Bit-identical to [`convolve_checked`]; only the addressing differs.
pub fn convolve_raw(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
) -> Result<(), GeometryError> {
    check_packed(src.len(), dst.len(), width, height)?;
    if has_interior(width, height) {
        raw::convolve(src, dst, width, height);
    }
    Ok(())
}

/// Convolve a packed BGR buffer [`LANES`] pixels at a time per channel.
///
/// Uses AVX2, NEON or SIMD128 when available, otherwise portable lane
/// arrays. Columns that do not fill a whole lane group fall back to the
/// scalar path.
pub fn convolve_lanes(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
) -> Result<(), GeometryError> {
    convolve_lanes_with_pool(pool::shared(), src, dst, width, height)
}

/// [`convolve_lanes`] renting its channel planes from `pool`.
pub fn convolve_lanes_with_pool(
    pool: &ScratchPool,
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
) -> Result<(), GeometryError> {
    check_packed(src.len(), dst.len(), width, height)?;
    if has_interior(width, height) {
        lanes::convolve(pool, src, dst, width, height);
    }
    Ok(())
}

/// Convolve between two caller-owned strided regions.
///
/// Offsets are `row * stride + col * 3`. Padding bytes between rows are never
/// read as pixels or written. Kernel weights come from the shared scratch pool.
pub fn convolve_strided(
    src: &[u8],
    dst: &mut [u8],
    geometry: Geometry,
) -> Result<(), GeometryError> {
    convolve_strided_with_pool(pool::shared(), src, dst, geometry)
}

/// [`convolve_strided`] renting its weight buffer from `pool`.
pub fn convolve_strided_with_pool(
    pool: &ScratchPool,
    src: &[u8],
    dst: &mut [u8],
    geometry: Geometry,
) -> Result<(), GeometryError> {
    check_strided(src.len(), dst.len(), &geometry)?;
    if has_interior(geometry.width, geometry.height) {
        strided::convolve(pool, src, dst, geometry);
    }
    Ok(())
}

// ===========================================================================
// Strategy
// ===========================================================================

/// The four memory-access strategies, selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    CheckedIndex,
    RawMemory,
    SimdLane,
    StrideAware,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::CheckedIndex,
        Strategy::RawMemory,
        Strategy::SimdLane,
        Strategy::StrideAware,
    ];

    /// Canonical registry identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Strategy::CheckedIndex => "checked-index",
            Strategy::RawMemory => "raw-memory",
            Strategy::SimdLane => "simd-lane",
            Strategy::StrideAware => "stride-aware",
        }
    }

    /// Human-readable label used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::CheckedIndex => "Checked Index",
            Strategy::RawMemory => "Raw Memory",
            Strategy::SimdLane => "SIMD Lanes",
            Strategy::StrideAware => "Stride Aware",
        }
    }

    /// Whether the strategy only accepts packed rows.
    pub const fn needs_packed(self) -> bool {
        !matches!(self, Strategy::StrideAware)
    }

    /// Apply the kernel from `src` into `dst`, using the shared scratch pool.
    pub fn apply(self, src: &[u8], dst: &mut [u8], geometry: Geometry) -> Result<(), GeometryError> {
        self.apply_with_pool(pool::shared(), src, dst, geometry)
    }

    /// Apply the kernel, renting any scratch memory from `pool`.
    ///
    /// Packed-only strategies reject padded geometry with
    /// [`GeometryError::PaddedRows`].
    pub fn apply_with_pool(
        self,
        pool: &ScratchPool,
        src: &[u8],
        dst: &mut [u8],
        geometry: Geometry,
    ) -> Result<(), GeometryError> {
        if self.needs_packed() && !geometry.is_packed() {
            return Err(GeometryError::PaddedRows);
        }
        let Geometry { width, height, .. } = geometry;
        match self {
            Strategy::CheckedIndex => convolve_checked(src, dst, width, height),
            Strategy::RawMemory => convolve_raw(src, dst, width, height),
            Strategy::SimdLane => convolve_lanes_with_pool(pool, src, dst, width, height),
            Strategy::StrideAware => convolve_strided_with_pool(pool, src, dst, geometry),
        }
    }
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
