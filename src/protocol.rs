//! ESC/POS raster framing.
//!
//! Wraps a packed 1-bpp raster in the binary command stream the printer
//! expects: the `GS v 0` raster opcode, the row geometry as two
//! little-endian 16-bit values, then the bitmap itself. Framing is total and
//! deterministic; a valid [`RasterImage`] cannot fail to frame.

use crate::raster::RasterImage;

/// `GS v 0` — select raster bit-image mode, normal density.
pub const RASTER_MODE: [u8; 4] = [0x1D, 0x76, 0x30, 0x00];

/// Double line feed pushing the printed image clear of the tear bar.
///
/// Transmitted by the transport as its own transfer after the job, since it
/// does not depend on image content.
pub const PAPER_FEED: [u8; 2] = [0x0A, 0x0A];

/// A framed print job: fixed 8-byte header plus packed bitmap payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    header: [u8; 8],
    row_bytes: u16,
    row_count: u16,
    payload: Vec<u8>,
}

impl PrintJob {
    /// The 8-byte command prefix.
    pub fn header(&self) -> &[u8; 8] {
        &self.header
    }

    /// Bytes per raster row.
    pub fn row_bytes(&self) -> u16 {
        self.row_bytes
    }

    /// Number of raster rows.
    pub fn row_count(&self) -> u16 {
        self.row_count
    }

    /// The packed bitmap payload. Always `row_bytes * row_count` long.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Header and payload concatenated, ready for a single bulk transfer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header.len() + self.payload.len());
        buf.extend_from_slice(&self.header);
        buf.extend_from_slice(&self.payload);
        buf
    }
}

/// Frame a raster into the printer's command stream.
pub fn frame(image: &RasterImage) -> PrintJob {
    let row_bytes = image.row_bytes();
    let row_count = image.height() as u16;

    let mut header = [0u8; 8];
    header[..4].copy_from_slice(&RASTER_MODE);
    header[4..6].copy_from_slice(&row_bytes.to_le_bytes());
    header[6..8].copy_from_slice(&row_count.to_le_bytes());

    PrintJob {
        header,
        row_bytes,
        row_count,
        payload: image.data().to_vec(),
    }
}

/// Recover `(row_bytes, row_count)` from a job header.
///
/// Returns `None` if the header does not start with the raster opcode.
pub fn decode_header(header: &[u8; 8]) -> Option<(u16, u16)> {
    if header[..4] != RASTER_MODE {
        return None;
    }
    let row_bytes = u16::from_le_bytes([header[4], header[5]]);
    let row_count = u16::from_le_bytes([header[6], header[7]]);
    Some((row_bytes, row_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::encode_image;
    use image::{DynamicImage, GrayImage, Luma};

    fn test_raster(width: u32, height: u32) -> RasterImage {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([0])));
        encode_image(&img, width, 1.0)
    }

    #[test]
    fn header_encodes_geometry_little_endian() {
        let job = frame(&test_raster(384, 300));

        assert_eq!(&job.header()[..4], &RASTER_MODE[..]);
        // 48 row bytes, 300 rows: low byte first.
        assert_eq!(&job.header()[4..], &[48u8, 0, 44, 1][..]);
    }

    #[test]
    fn payload_length_matches_geometry() {
        let job = frame(&test_raster(384, 216));
        assert_eq!(
            job.payload().len(),
            job.row_bytes() as usize * job.row_count() as usize
        );
    }

    #[test]
    fn tall_aspect_source_still_frames_consistently() {
        // An extreme portrait source must not outgrow the u16 row count;
        // the header and the payload have to agree on the geometry.
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 1024, Luma([0])));
        let job = frame(&encode_image(&img, 384, 1.8));

        assert_eq!(
            job.payload().len(),
            job.row_bytes() as usize * job.row_count() as usize
        );
        assert_eq!(decode_header(job.header()), Some((48, u16::MAX)));
    }

    #[test]
    fn framing_is_deterministic() {
        let raster = test_raster(384, 120);
        assert_eq!(frame(&raster), frame(&raster));
        assert_eq!(frame(&raster).to_bytes(), frame(&raster).to_bytes());
    }

    #[test]
    fn header_round_trips_through_decode() {
        let job = frame(&test_raster(384, 500));
        assert_eq!(decode_header(job.header()), Some((48, 500)));
    }

    #[test]
    fn decode_rejects_foreign_opcode() {
        assert_eq!(decode_header(&[0x1B, 0x40, 0, 0, 48, 0, 1, 0]), None);
    }

    #[test]
    fn to_bytes_is_header_then_payload() {
        let job = frame(&test_raster(8, 2));
        let bytes = job.to_bytes();
        assert_eq!(&bytes[..8], &job.header()[..]);
        assert_eq!(&bytes[8..], job.payload());
        assert_eq!(bytes.len(), 8 + 2);
    }
}
