//! PNG encoding (spec §6): the only module that imports the `image` crate
//! directly, kept isolated so the rest of the crate treats image output as
//! a swappable external collaborator.

use crate::error::RenderError;
use image::{ColorType, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes `rgba` (tightly packed, `width*height*4` bytes) as an 8-bit PNG.
pub fn write_png(path: impl AsRef<Path>, rgba: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
    let expected_len = width as usize * height as usize * 4;
    if rgba.len() != expected_len {
        return Err(RenderError::Encoder(format!(
            "pixel buffer length {} does not match {width}x{height} RGBA ({expected_len})",
            rgba.len()
        )));
    }
    let file = File::create(path.as_ref())
        .map_err(|e| RenderError::Encoder(format!("cannot create {}: {e}", path.as_ref().display())))?;
    let writer = BufWriter::new(file);
    let encoder = image::codecs::png::PngEncoder::new(writer);
    encoder
        .write_image(rgba, width, height, ColorType::Rgba8)
        .map_err(|e| RenderError::Encoder(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer_length() {
        let buf = vec![0u8; 10];
        let result = write_png("/tmp/photon_renderer_test_reject.png", &buf, 4, 4);
        assert!(result.is_err());
    }

    #[test]
    fn writes_a_valid_png_file() {
        let width = 2u32;
        let height = 2u32;
        let buf = vec![255u8; (width * height * 4) as usize];
        let path = "/tmp/photon_renderer_test_write.png";
        let result = write_png(path, &buf, width, height);
        assert!(result.is_ok());
        assert!(std::fs::metadata(path).is_ok());
        let _ = std::fs::remove_file(path);
    }
}
