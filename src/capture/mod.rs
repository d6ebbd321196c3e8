//! Frame capture
//!
//! A capture copies the currently rendered view into a pixel buffer. The
//! rendering host is reached only through [`FrameSource`], so nothing in the
//! measurement core depends on a rendering engine.

mod frame;
mod mock;
mod source;

pub use frame::{CaptureError, CapturedFrame, PixelFormat, SurfaceHandle, ViewDescriptor};
pub use mock::MockFrameSource;
pub use source::{FrameSource, ImageFileSource};
