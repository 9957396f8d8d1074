//! QR code rasterization for the registration documents.
//!
//! The code is rendered at well over 1000px so it stays sharp when the PDF
//! places it at 40mm, and at error-correction level H so a printed page
//! survives toner artefacts and still scans.

use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};

/// Minimum side length of the rasterized code, in pixels.
const MIN_RENDER_PX: u32 = 1000;
/// Quiet zone around the code, in modules (the standard margin).
const QUIET_ZONE_MODULES: u32 = 4;

/// Square 8-bit grayscale bitmap, row-major, white background.
pub struct QrBitmap {
    pub pixels: Vec<u8>,
    pub width: u32,
}

/// Rasterize `token` as a QR code at level H.
pub fn render(token: &str) -> Result<QrBitmap, QrError> {
    let code = QrCode::with_error_correction_level(token.as_bytes(), EcLevel::H)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let total_modules = modules + 2 * QUIET_ZONE_MODULES;
    // Smallest integer module size that reaches the target resolution.
    let scale = MIN_RENDER_PX.div_ceil(total_modules);
    let width = total_modules * scale;

    let mut pixels = vec![255u8; (width * width) as usize];
    for module_y in 0..modules {
        for module_x in 0..modules {
            if colors[(module_y * modules + module_x) as usize] != Color::Dark {
                continue;
            }
            let px = (QUIET_ZONE_MODULES + module_x) * scale;
            let py = (QUIET_ZONE_MODULES + module_y) * scale;
            for dy in 0..scale {
                let row_start = ((py + dy) * width + px) as usize;
                pixels[row_start..row_start + scale as usize].fill(0);
            }
        }
    }

    Ok(QrBitmap { pixels, width })
}
