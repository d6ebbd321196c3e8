//! Pixel buffers and the view they are copied from

use serde::{Deserialize, Serialize};

/// Opaque handle to a renderable surface owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

/// The surface to capture and its pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub surface: SurfaceHandle,
    pub width: u32,
    pub height: u32,
}

impl ViewDescriptor {
    pub fn new(surface: SurfaceHandle, width: u32, height: u32) -> Self {
        Self {
            surface,
            width,
            height,
        }
    }
}

/// Layout of the bytes in a [`CapturedFrame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8 bits per channel, RGBA order, row-major, no row padding
    #[default]
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Bytes needed for a `width` x `height` buffer
    pub fn buffer_len(&self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// Why a capture produced no frame
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("pixel copy was denied by the surface")]
    CopyDenied,

    #[error("pixel copy failed: {0}")]
    CopyFailed(String),

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("view has zero width or height")]
    InvalidDimensions,
}

/// A snapshot of the rendered view
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl CapturedFrame {
    /// Wrap a pixel buffer, checking that it matches the dimensions
    pub fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidDimensions);
        }

        let expected = format.buffer_len(width, height);
        if pixels.len() != expected {
            return Err(CaptureError::BufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            pixels,
            width,
            height,
            format,
        })
    }

    /// A frame filled with a single RGBA color
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, CaptureError> {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(PixelFormat::Rgba8.buffer_len(width, height))
            .collect();
        Self::new(pixels, width, height, PixelFormat::Rgba8)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_accepts_matching_buffer() {
        let frame = CapturedFrame::new(vec![0; 2 * 3 * 4], 2, 3, PixelFormat::Rgba8).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.pixels().len(), 24);
        assert_eq!(frame.format(), PixelFormat::Rgba8);
    }

    #[test]
    fn test_frame_rejects_short_buffer() {
        let err = CapturedFrame::new(vec![0; 10], 2, 2, PixelFormat::Rgba8).unwrap_err();
        assert_eq!(
            err,
            CaptureError::BufferMismatch {
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn test_frame_rejects_zero_dimensions() {
        let err = CapturedFrame::new(Vec::new(), 0, 4, PixelFormat::Rgba8).unwrap_err();
        assert_eq!(err, CaptureError::InvalidDimensions);
    }

    #[test]
    fn test_solid_frame() {
        let frame = CapturedFrame::solid(2, 1, [255, 0, 0, 255]).unwrap();
        assert_eq!(frame.pixels(), &[255, 0, 0, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(PixelFormat::Rgba8.buffer_len(1080, 1920), 1080 * 1920 * 4);
    }
}
