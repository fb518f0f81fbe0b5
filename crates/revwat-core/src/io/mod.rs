//! `PixelSource`/`PixelSink`: the external collaborator interface the
//! codec reads from and writes to. Real image-container decoding (PNG,
//! TIFF, DICOM, ...) is out of scope for this crate; callers plug in their
//! own adapter. [`pgm`] ships one concrete, dependency-free adapter so the
//! CLI and integration tests have something to drive end-to-end.

pub mod pgm;

use crate::image::Image;
use std::io;

/// Anything that can yield a decoded pixel array plus its bit depth.
pub trait PixelSource {
    fn read(&mut self) -> io::Result<Image>;
}

/// Anything that can persist a pixel array.
pub trait PixelSink {
    fn write(&mut self, image: &Image) -> io::Result<()>;
}
