use std::io::Cursor;
use std::path::Path;

use image::ImageDecoder as _;

use crate::foundation::core::premultiply_rgba8_in_place;
use crate::foundation::error::{MontageError, MontageResult};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

/// Read and decode an image file.
pub fn decode_image_file(path: &Path) -> MontageResult<DecodedImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        MontageError::decode(format!("failed to read image '{}': {e}", path.display()))
    })?;
    decode_image(&bytes).map_err(|e| match e {
        MontageError::Decode(msg) => {
            MontageError::decode(format!("image '{}': {msg}", path.display()))
        }
        other => other,
    })
}

/// Decode image bytes, applying EXIF orientation so phone photos come out upright.
pub fn decode_image(bytes: &[u8]) -> MontageResult<DecodedImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MontageError::decode(format!("unrecognized image data: {e}")))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| MontageError::decode(format!("unsupported image: {e}")))?;
    let orientation = decoder
        .orientation()
        .unwrap_or(image::metadata::Orientation::NoTransforms);
    let mut dyn_img = image::DynamicImage::from_decoder(decoder)
        .map_err(|e| MontageError::decode(format!("image decode failed: {e}")))?;
    dyn_img.apply_orientation(orientation);

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(MontageError::decode("image has zero area"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul,
    })
}
