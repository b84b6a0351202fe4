use {
    crate::*,
    crates_image::{ImageEncoder, ImageFormat, RgbImage, codecs::jpeg::JpegEncoder},
};

/// Decode JPEG bytes into an 8-bit RGB image.
pub fn decode_rgb(data: &[u8]) -> Result<RgbImage, ImageError> {
    let image = crates_image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    Ok(image.to_rgb8())
}

/// Encode an RGB image as JPEG with the given quality (1-100).
pub fn encode_rgb(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}
