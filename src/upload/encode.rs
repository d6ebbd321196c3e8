//! Frame and distance encoding for the upload form

use crate::capture::{CapturedFrame, PixelFormat};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageResult};

/// Field carrying the base64 PNG
pub const IMAGE_FIELD: &str = "image";
/// Field carrying the distance in meters
pub const DISTANCE_FIELD: &str = "distance";

/// Encode a frame as PNG, losslessly
pub fn encode_png(frame: &CapturedFrame) -> ImageResult<Vec<u8>> {
    let color = match frame.format() {
        PixelFormat::Rgba8 => ExtendedColorType::Rgba8,
    };

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(frame.pixels(), frame.width(), frame.height(), color)?;
    Ok(bytes)
}

/// PNG bytes of the frame as standard padded base64
pub fn encode_image_field(frame: &CapturedFrame) -> ImageResult<String> {
    Ok(STANDARD.encode(encode_png(frame)?))
}

/// Distance as sent on the wire; whole numbers keep one decimal ("5.0")
pub fn format_distance(distance_meters: f64) -> String {
    if distance_meters.is_finite() && distance_meters.fract() == 0.0 {
        format!("{:.1}", distance_meters)
    } else {
        distance_meters.to_string()
    }
}

/// The two form fields of an upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub image: String,
    pub distance: String,
}

impl UploadForm {
    pub fn build(frame: &CapturedFrame, distance_meters: f64) -> ImageResult<Self> {
        Ok(Self {
            image: encode_image_field(frame)?,
            distance: format_distance(distance_meters),
        })
    }

    /// Key/value pairs in field order, ready for form encoding
    pub fn fields(&self) -> [(&'static str, &str); 2] {
        [(IMAGE_FIELD, &self.image), (DISTANCE_FIELD, &self.distance)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_lossless() {
        let frame = CapturedFrame::new(
            (0u8..16).collect(),
            2,
            2,
            PixelFormat::Rgba8,
        )
        .unwrap();

        let png = encode_png(&frame).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), frame.pixels());
    }

    #[test]
    fn test_image_field_is_base64_png() {
        let frame = CapturedFrame::solid(3, 1, [9, 8, 7, 255]).unwrap();
        let field = encode_image_field(&frame).unwrap();

        let bytes = STANDARD.decode(field).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 1));
        assert_eq!(decoded.get_pixel(2, 0).0, [9, 8, 7, 255]);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(5.0), "5.0");
        assert_eq!(format_distance(0.25), "0.25");
        assert_eq!(format_distance(1.5e-3), "0.0015");
    }

    #[test]
    fn test_form_fields_order() {
        let frame = CapturedFrame::solid(1, 1, [0, 0, 0, 0]).unwrap();
        let form = UploadForm::build(&frame, 5.0).unwrap();
        let fields = form.fields();
        assert_eq!(fields[0].0, "image");
        assert_eq!(fields[1], ("distance", "5.0"));
    }
}
