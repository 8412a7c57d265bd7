//! Raw frame export.
//!
//! Synchronous, stateless collaborator: one fully-owned completed frame
//! plus its stream configuration and a destination path, producing a binary
//! PNM file. No bridge state is involved; export failures never travel
//! through the bridge.

use reqbridge_core::error::{BridgeError, BridgeResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pixel layout of an exportable frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit grayscale, one byte per pixel.
    Gray8,
    /// 24-bit RGB, three bytes per pixel.
    Rgb888,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb888 => 3,
        }
    }
}

/// Stream configuration of the frame being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    /// Bytes per row in `data`, >= width * bytes_per_pixel.
    pub stride: u32,
    pub format: PixelFormat,
}

impl StreamConfig {
    /// Configuration with no row padding.
    ///
    /// Widths whose packed row does not fit a `u32` stride saturate;
    /// `write_pnm` then rejects the geometry instead of wrapping.
    pub fn packed(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            stride: width.saturating_mul(format.bytes_per_pixel() as u32),
            format,
        }
    }
}

/// Write one frame as binary PNM (P5 for Gray8, P6 for Rgb888).
///
/// `data` must cover `stride * height` bytes (the last row may omit the
/// padding). Rows are de-strided on the way out, so the file is always
/// packed.
pub fn write_pnm(path: &Path, config: &StreamConfig, data: &[u8]) -> BridgeResult<()> {
    // Size checks in u64 so degenerate geometry errors out instead of
    // overflowing the arithmetic.
    let row = config.width as u64 * config.format.bytes_per_pixel() as u64;

    if config.width == 0 || config.height == 0 {
        return Err(BridgeError::BadFrame("zero frame dimensions"));
    }
    if (config.stride as u64) < row {
        return Err(BridgeError::BadFrame("stride smaller than a pixel row"));
    }
    if (data.len() as u64) < config.stride as u64 * (config.height as u64 - 1) + row {
        return Err(BridgeError::BadFrame("frame data shorter than stride * height"));
    }

    let row = row as usize;
    let stride = config.stride as usize;
    let height = config.height as usize;

    let magic = match config.format {
        PixelFormat::Gray8 => "P5",
        PixelFormat::Rgb888 => "P6",
    };

    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "{}\n{} {}\n255\n", magic, config.width, config.height)?;
    for y in 0..height {
        let start = y * stride;
        out.write_all(&data[start..start + row])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("reqbridge-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_write_gray_with_stride_padding() {
        // 4x2 gray frame, stride 6 (2 bytes of padding per row).
        let config = StreamConfig {
            width: 4,
            height: 2,
            stride: 6,
            format: PixelFormat::Gray8,
        };
        let data: Vec<u8> = vec![
            1, 2, 3, 4, 0xee, 0xee, // row 0 + padding
            5, 6, 7, 8, // row 1, padding omitted
        ];

        let path = temp_path("gray.pgm");
        write_pnm(&path, &config, &data).unwrap();

        let written = std::fs::read(&path).unwrap();
        let mut expected = b"P5\n4 2\n255\n".to_vec();
        expected.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(written, expected);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_rgb_packed() {
        let config = StreamConfig::packed(2, 1, PixelFormat::Rgb888);
        assert_eq!(config.stride, 6);
        let data = vec![255, 0, 0, 0, 255, 0];

        let path = temp_path("rgb.ppm");
        write_pnm(&path, &config, &data).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"P6\n2 1\n255\n"));
        assert!(written.ends_with(&[255, 0, 0, 0, 255, 0]));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let path = temp_path("bad.pgm");

        let zero = StreamConfig::packed(0, 4, PixelFormat::Gray8);
        assert!(matches!(
            write_pnm(&path, &zero, &[]),
            Err(BridgeError::BadFrame("zero frame dimensions"))
        ));

        let narrow = StreamConfig {
            width: 8,
            height: 1,
            stride: 4,
            format: PixelFormat::Gray8,
        };
        assert!(matches!(
            write_pnm(&path, &narrow, &[0u8; 64]),
            Err(BridgeError::BadFrame("stride smaller than a pixel row"))
        ));

        let short = StreamConfig::packed(4, 4, PixelFormat::Gray8);
        assert!(matches!(
            write_pnm(&path, &short, &[0u8; 8]),
            Err(BridgeError::BadFrame(_))
        ));
    }

    #[test]
    fn test_absurd_width_is_rejected_not_wrapped() {
        // An RGB row this wide does not fit a u32 stride: the stride
        // saturates and the geometry is refused, with no overflow panic.
        let config = StreamConfig::packed(u32::MAX, 2, PixelFormat::Rgb888);
        assert_eq!(config.stride, u32::MAX);

        let path = temp_path("wide.ppm");
        assert!(matches!(
            write_pnm(&path, &config, &[0u8; 16]),
            Err(BridgeError::BadFrame("stride smaller than a pixel row"))
        ));
    }
}
