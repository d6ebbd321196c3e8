//! Capture backends

use super::{CaptureError, CapturedFrame, PixelFormat, ViewDescriptor};
use async_trait::async_trait;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Something that can copy the rendered view into a pixel buffer.
///
/// Implementations may do the copy on any thread; the controller delivers
/// the result back onto its own queue.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Copy the current contents of `view` into a new frame of the view's size
    async fn capture(&self, view: &ViewDescriptor) -> Result<CapturedFrame, CaptureError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Treats an image file on disk as the rendered view.
///
/// The image is scaled to the view's dimensions so the frame always matches
/// the requested size.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn load_scaled(path: &Path, width: u32, height: u32) -> Result<CapturedFrame, CaptureError> {
    let img = image::open(path)
        .map_err(|e| CaptureError::CopyFailed(format!("{}: {}", path.display(), e)))?;

    let img = if img.width() == width && img.height() == height {
        img
    } else {
        debug!(
            from_width = img.width(),
            from_height = img.height(),
            width,
            height,
            "Scaling source image to view size"
        );
        img.resize_exact(width, height, FilterType::Triangle)
    };

    CapturedFrame::new(img.to_rgba8().into_raw(), width, height, PixelFormat::Rgba8)
}

#[async_trait]
impl FrameSource for ImageFileSource {
    async fn capture(&self, view: &ViewDescriptor) -> Result<CapturedFrame, CaptureError> {
        if view.width == 0 || view.height == 0 {
            return Err(CaptureError::InvalidDimensions);
        }

        let path = self.path.clone();
        let (width, height) = (view.width, view.height);
        tokio::task::spawn_blocking(move || load_scaled(&path, width, height))
            .await
            .map_err(|e| CaptureError::CopyFailed(format!("capture task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "image-file"
    }
}
