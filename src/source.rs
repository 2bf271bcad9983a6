//! Pixel sources: the collaborator that hands the harness a BGR buffer.
//!
//! Decoding image formats is not this crate's job. Sources either synthesise
//! a deterministic pattern or read headerless BGR24 bytes from disk.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::convolve::Geometry;
use crate::error::{GeometryError, SourceError};
use crate::kernel::CHANNELS;

/// An owned BGR buffer together with its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    data: Vec<u8>,
    geometry: Geometry,
}

impl SourceImage {
    /// Wrap `data`, which must cover `geometry`. Trailing bytes past the last
    /// row are dropped.
    pub fn new(mut data: Vec<u8>, geometry: Geometry) -> Result<Self, GeometryError> {
        let expected = geometry.required_len()?;
        if data.len() < expected {
            return Err(GeometryError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        data.truncate(expected);
        Ok(Self { data, geometry })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The pixels with row padding removed. Borrows when already packed.
    pub fn packed(&self) -> Cow<'_, [u8]> {
        if self.geometry.is_packed() {
            return Cow::Borrowed(&self.data);
        }
        let row_bytes = self.geometry.row_bytes();
        let mut out = Vec::with_capacity(row_bytes * self.geometry.height);
        for y in 0..self.geometry.height {
            out.extend_from_slice(&self.data[y * self.geometry.stride..][..row_bytes]);
        }
        Cow::Owned(out)
    }
}

/// Supplies a fresh image on every call.
pub trait PixelSource: Send + Sync {
    fn load(&self) -> Result<SourceImage, SourceError>;

    /// Short description for logs and reports.
    fn describe(&self) -> String;
}

/// Deterministic gradient: `(x * 7 + y * 13 + c * 31) mod 256`.
///
/// Rows are padded up to a multiple of `row_align` bytes, as bitmap formats
/// do; padding bytes are `0xAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticSource {
    width: usize,
    height: usize,
    row_align: usize,
}

impl SyntheticSource {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            row_align: 1,
        }
    }

    /// Pad rows to a multiple of `align` bytes. `0` is treated as `1`.
    pub fn with_row_align(mut self, align: usize) -> Self {
        self.row_align = align.max(1);
        self
    }

    /// Layout of the loaded image, or `DimensionOverflow` when the padded
    /// rows do not fit in `usize`.
    pub fn geometry(&self) -> Result<Geometry, GeometryError> {
        let stride = self
            .width
            .checked_mul(CHANNELS)
            .and_then(|row_bytes| row_bytes.checked_next_multiple_of(self.row_align))
            .ok_or(GeometryError::DimensionOverflow)?;
        Ok(Geometry::with_stride(self.width, self.height, stride))
    }

    /// Pixel value the pattern places at `(x, y)` for channel `c`.
    pub fn value(x: usize, y: usize, c: usize) -> u8 {
        ((x * 7 + y * 13 + c * 31) % 256) as u8
    }
}

impl PixelSource for SyntheticSource {
    fn load(&self) -> Result<SourceImage, SourceError> {
        let geometry = self.geometry()?;
        let len = geometry.required_len()?;
        let mut data = vec![0xAA; len];
        for y in 0..self.height {
            let row = &mut data[y * geometry.stride..][..geometry.row_bytes()];
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                for (c, v) in px.iter_mut().enumerate() {
                    *v = Self::value(x, y, c);
                }
            }
        }
        Ok(SourceImage::new(data, geometry)?)
    }

    fn describe(&self) -> String {
        match self.geometry() {
            Ok(g) => format!("synthetic {}x{} (stride {})", g.width, g.height, g.stride),
            Err(_) => format!("synthetic {}x{} (oversized)", self.width, self.height),
        }
    }
}

/// Headerless BGR24 bytes read from a file on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileSource {
    path: PathBuf,
    geometry: Geometry,
}

impl RawFileSource {
    pub fn new(path: impl Into<PathBuf>, width: usize, height: usize) -> Self {
        Self {
            path: path.into(),
            geometry: Geometry::packed(width, height),
        }
    }

    /// Rows in the file are `stride` bytes apart.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.geometry.stride = stride;
        self
    }
}

impl PixelSource for RawFileSource {
    fn load(&self) -> Result<SourceImage, SourceError> {
        let expected = self.geometry.required_len()?;
        let data = std::fs::read(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        if data.len() < expected {
            return Err(SourceError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        Ok(SourceImage::new(data, self.geometry)?)
    }

    fn describe(&self) -> String {
        format!(
            "{} ({}x{}, stride {})",
            self.path.display(),
            self.geometry.width,
            self.geometry.height,
            self.geometry.stride
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn synthetic_packed_layout() {
        let img = SyntheticSource::new(4, 3).load().unwrap();
        assert_eq!(img.geometry(), Geometry::packed(4, 3));
        assert_eq!(img.data().len(), 36);
        assert_eq!(img.data()[(2 * 4 + 1) * 3 + 2], SyntheticSource::value(1, 2, 2));
        assert!(matches!(img.packed(), Cow::Borrowed(_)));
    }

    #[test]
    fn synthetic_padded_rows() {
        let src = SyntheticSource::new(5, 2).with_row_align(4);
        let img = src.load().unwrap();
        // 15 bytes of pixels padded to 16.
        assert_eq!(img.geometry().stride, 16);
        assert_eq!(img.data()[15], 0xAA);
        let packed = img.packed();
        assert_eq!(packed.len(), 30);
        assert_eq!(packed[15], SyntheticSource::value(0, 1, 0));
    }

    #[test]
    fn image_rejects_short_data() {
        let err = SourceImage::new(vec![0; 10], Geometry::packed(2, 2)).unwrap_err();
        assert_eq!(
            err,
            GeometryError::LengthMismatch {
                expected: 12,
                actual: 10
            }
        );
    }

    #[test]
    fn image_drops_trailing_bytes() {
        let img = SourceImage::new(vec![1; 20], Geometry::with_stride(2, 2, 8)).unwrap();
        assert_eq!(img.data().len(), 14);
    }

    #[test]
    fn missing_raw_file_is_io_error() {
        let src = RawFileSource::new("/nonexistent/convbench/pixels.bgr", 8, 8);
        assert!(matches!(src.load(), Err(SourceError::Io { .. })));
    }

    #[test]
    fn short_raw_file_is_truncated() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 10]).unwrap();
        let result = RawFileSource::new(file.path(), 4, 4).load();
        assert!(matches!(
            result,
            Err(SourceError::Truncated {
                expected: 48,
                actual: 10
            })
        ));
    }

    #[test]
    fn raw_file_with_stride() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&(0..32u8).collect::<Vec<_>>()).unwrap();
        let img = RawFileSource::new(file.path(), 2, 2)
            .with_stride(8)
            .load()
            .unwrap();
        assert_eq!(img.geometry().stride, 8);
        assert_eq!(&*img.packed(), &[0, 1, 2, 3, 4, 5, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn oversized_synthetic_is_dimension_overflow() {
        for src in [
            SyntheticSource::new(usize::MAX / 2, 2),
            SyntheticSource::new(usize::MAX / 3, 2).with_row_align(64),
            SyntheticSource::new(4, usize::MAX / 4),
        ] {
            assert!(matches!(
                src.load(),
                Err(SourceError::InvalidGeometry(GeometryError::DimensionOverflow))
            ));
        }
        let wide = SyntheticSource::new(usize::MAX / 2, 2);
        assert_eq!(wide.geometry(), Err(GeometryError::DimensionOverflow));
        assert!(wide.describe().ends_with("(oversized)"));
    }
}
