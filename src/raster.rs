//! Image encoding for thermal printing.
//!
//! Converts an arbitrary photograph into a width-clamped, contrast-enhanced
//! 1-bit-per-pixel raster suitable for a 384-dot thermal head. The transform
//! runs in a fixed order: decode, luminance, linear contrast, nearest-neighbor
//! resize, threshold, polarity inversion and MSB-first bit packing.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use log::debug;
use std::path::Path;

use crate::error::Error;

/// Binarization threshold applied to the contrast-enhanced luminance.
///
/// Luminance below the threshold becomes an inked dot. 128 works well on
/// default printer stock once the contrast boost has been applied.
const THRESHOLD: u8 = 128;

/// A packed monochrome bitmap ready for protocol framing.
///
/// One bit per pixel, row-major, most-significant bit first within a byte,
/// bit=1 meaning "fire this dot". Width is always a multiple of 8 so every
/// row occupies whole bytes. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Width in dots. Always a multiple of 8.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in dot rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per packed row (`width / 8`).
    pub fn row_bytes(&self) -> u16 {
        (self.width / 8) as u16
    }

    /// The packed bitmap, rows concatenated top to bottom.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Encode a photo from disk into a printable raster.
///
/// `max_width` is the printer head width in dots; `enhance_factor` is the
/// linear contrast gain (values above 1.0 increase contrast, which default
/// thermal stock needs or mid-gray content is lost at 1-bit depth).
pub fn encode<P: AsRef<Path>>(
    path: P,
    max_width: u32,
    enhance_factor: f32,
) -> Result<RasterImage, Error> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| Error::UnreadableSource {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_image(&img, max_width, enhance_factor))
}

/// Encode an already-decoded image. Total: any input yields a valid raster.
pub fn encode_image(img: &DynamicImage, max_width: u32, enhance_factor: f32) -> RasterImage {
    let gray = img.to_luma8();
    let (src_w, src_h) = gray.dimensions();

    let gray = adjust_contrast(gray, enhance_factor);

    // Preserve aspect ratio; the head cannot resolve anti-aliasing, so
    // nearest-neighbor sampling is good enough and fast on a small board.
    // The job header carries the row count as a u16, so the height is
    // clamped to what a single job can describe.
    let height = ((max_width as f32 * src_h as f32 / src_w as f32).round() as u32)
        .clamp(1, u16::MAX as u32);
    let resized = image::imageops::resize(&gray, max_width, height, FilterType::Nearest);

    debug!(
        "encoded {}x{} source to {}x{} raster",
        src_w, src_h, max_width, height
    );

    pack_bits(&resized, max_width, height)
}

/// Linear contrast enhancement about the mid-gray point.
fn adjust_contrast(mut img: GrayImage, factor: f32) -> GrayImage {
    for pixel in img.pixels_mut() {
        let v = pixel.0[0] as f32;
        pixel.0[0] = ((v - 127.5) * factor + 127.5).clamp(0.0, 255.0) as u8;
    }
    img
}

/// Threshold, invert and pack the luminance buffer into printer bits.
///
/// The printer fires a dot for bit=1, so dark source pixels map to set bits.
/// The width is rounded up to the next multiple of 8; padding columns carry
/// no ink.
fn pack_bits(gray: &GrayImage, width: u32, height: u32) -> RasterImage {
    let padded_width = (width + 7) / 8 * 8;
    let row_bytes = (padded_width / 8) as usize;

    let mut data = vec![0u8; row_bytes * height as usize];
    for y in 0..height {
        let row = &mut data[y as usize * row_bytes..(y as usize + 1) * row_bytes];
        for x in 0..width {
            if gray.get_pixel(x, y).0[0] < THRESHOLD {
                row[(x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }
    }

    RasterImage {
        width: padded_width,
        height,
        data,
    }
}
