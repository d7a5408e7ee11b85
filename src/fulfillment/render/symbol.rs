//! Verification symbol rasterization.
//!
//! The QR encoding itself is delegated to the `qrcode` crate; this module
//! only turns its module matrix into a square 8-bit grayscale raster with a
//! quiet zone, sized for reliable optical scanning.

use std::io::Cursor;

use printpdf::image_crate::{DynamicImage, GrayImage, ImageOutputFormat};
use qrcode::{Color, EcLevel, QrCode};

use crate::utils::error::AppError;

/// Nominal symbol side in pixels. The rasterizer picks the largest whole
/// module scale that fits; the PDF layer scales the result to print size.
pub const NOMINAL_SIDE: u32 = 200;

/// Light modules around the symbol, in module units, per the QR standard.
const QUIET_ZONE: u32 = 4;

const DARK: u8 = 0x00;
const LIGHT: u8 = 0xFF;

/// Square grayscale raster, one byte per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolImage {
    pub side: u32,
    pub pixels: Vec<u8>,
}

impl SymbolImage {
    /// Encode the raster as a PNG for serving directly over HTTP.
    pub fn to_png(&self) -> Result<Vec<u8>, AppError> {
        let raster = GrayImage::from_raw(self.side, self.side, self.pixels.clone())
            .ok_or_else(|| AppError::EncodingFailed("symbol raster has bad dimensions".into()))?;

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(raster)
            .write_to(&mut out, ImageOutputFormat::Png)
            .map_err(|e| AppError::EncodingFailed(e.to_string()))?;
        Ok(out.into_inner())
    }
}

/// Encode a payload at error-correction level H (the highest available, to
/// tolerate print and display degradation) and rasterize it.
pub fn encode(payload: &str) -> Result<SymbolImage, AppError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
        .map_err(|e| AppError::EncodingFailed(e.to_string()))?;

    let modules = code.to_colors();
    let width = code.width() as u32;
    let total = width + 2 * QUIET_ZONE;
    let scale = (NOMINAL_SIDE / total).max(1);
    let side = total * scale;

    let mut pixels = vec![LIGHT; (side * side) as usize];
    for (i, color) in modules.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = (i as u32 % width + QUIET_ZONE) * scale;
        let my = (i as u32 / width + QUIET_ZONE) * scale;
        for dy in 0..scale {
            let row = ((my + dy) * side + mx) as usize;
            pixels[row..row + scale as usize].fill(DARK);
        }
    }

    Ok(SymbolImage { side, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_square_raster() {
        let img = encode("T1/abcdef").unwrap();
        assert_eq!(img.pixels.len(), (img.side * img.side) as usize);
        assert!(img.side <= NOMINAL_SIDE + 8);
    }

    #[test]
    fn raster_is_bilevel_with_light_quiet_zone() {
        let img = encode("T1/abcdef").unwrap();
        assert!(img.pixels.iter().all(|p| *p == DARK || *p == LIGHT));
        // First rows are inside the quiet zone.
        assert!(img.pixels[..img.side as usize].iter().all(|p| *p == LIGHT));
        assert!(img.pixels.iter().any(|p| *p == DARK));
    }

    #[test]
    fn identical_payloads_rasterize_identically() {
        assert_eq!(encode("T1/tag").unwrap(), encode("T1/tag").unwrap());
    }

    #[test]
    fn png_encoding_yields_a_png_stream() {
        let png = encode("T1/abcdef").unwrap().to_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));
    }

    #[test]
    fn oversized_payload_fails_with_encoding_error() {
        let payload = "x".repeat(8000);
        let err = encode(&payload).unwrap_err();
        assert!(matches!(err, AppError::EncodingFailed(_)));
    }
}
