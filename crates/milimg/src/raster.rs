//! RGBA raster helpers.
//!
//! Alpha is carried outside the color bitstream: the color frame is flattened
//! to full opacity, and the opacity channel travels as a second grayscale frame
//! where R = G = B = the original alpha byte.

use std::io;

use image::{ImageFormat, ImageResult, Rgba, RgbaImage};

/// Decodes PNG, JPEG or WebP bytes into an RGBA8 raster.
///
/// With no `format` the container format is guessed from the leading bytes.
pub fn decode_image(data: &[u8], format: Option<ImageFormat>) -> ImageResult<RgbaImage> {
    let image = match format {
        Some(format) => image::load_from_memory_with_format(data, format)?,
        None => image::load_from_memory(data)?,
    };
    Ok(image.into_rgba8())
}

/// Encodes a raster as PNG.
pub fn encode_png(raster: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut cursor = io::Cursor::new(Vec::new());
    raster.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Returns `true` if any pixel is not fully opaque.
pub fn has_transparency(raster: &RgbaImage) -> bool {
    raster.pixels().any(|pixel| pixel.0[3] != u8::MAX)
}

/// Copy of `raster` with every alpha byte forced to 255.
pub fn flatten_alpha(raster: &RgbaImage) -> RgbaImage {
    let mut flattened = raster.clone();
    for pixel in flattened.pixels_mut() {
        pixel.0[3] = u8::MAX;
    }
    flattened
}

/// Opaque grayscale raster whose R, G and B hold the source alpha.
pub fn alpha_to_grayscale(raster: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
        let alpha = raster.get_pixel(x, y).0[3];
        Rgba([alpha, alpha, alpha, u8::MAX])
    })
}

/// Writes the R channel of `alpha` into the alpha channel of `color`.
///
/// Both rasters must have the same dimensions; the color channels of `color`
/// are left untouched.
pub fn apply_grayscale_alpha(color: &mut RgbaImage, alpha: &RgbaImage) {
    debug_assert_eq!(color.dimensions(), alpha.dimensions());
    for (pixel, mask) in color.pixels_mut().zip(alpha.pixels()) {
        pixel.0[3] = mask.0[0];
    }
}
