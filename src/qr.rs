// src/qr.rs
// QR code image generation for mobile access

use std::fmt;
use std::path::{Path, PathBuf};

pub const QR_OUTPUT_FILE: &str = "site_qr.png";

/// Pixels per QR module.
#[cfg(feature = "qr")]
const MODULE_SCALE: u32 = 10;
/// Quiet-zone width around the code, in modules.
#[cfg(feature = "qr")]
const QUIET_ZONE: u32 = 5;

#[derive(Debug)]
pub enum QrError {
    /// Built without the `qr` feature.
    Unavailable,
    Encode(String),
    Image(String),
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrError::Unavailable => write!(
                f,
                "QR code generation is not compiled in; rebuild with the `qr` feature"
            ),
            QrError::Encode(msg) => write!(f, "Failed to encode QR code: {}", msg),
            QrError::Image(msg) => write!(f, "Failed to write QR image: {}", msg),
        }
    }
}

impl std::error::Error for QrError {}

/// Render `url` as a QR code PNG inside `out_dir` and return the image path.
#[cfg(feature = "qr")]
pub fn generate(url: &str, out_dir: &Path) -> Result<PathBuf, QrError> {
    use image::{GrayImage, Luma};
    use qrcode::{Color, QrCode};

    let code = QrCode::new(url).map_err(|err| QrError::Encode(err.to_string()))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let dimension = (modules + 2 * QUIET_ZONE) * MODULE_SCALE;
    let mut img = GrayImage::from_pixel(dimension, dimension, Luma([255u8]));

    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }

        let module_x = (index as u32 % modules + QUIET_ZONE) * MODULE_SCALE;
        let module_y = (index as u32 / modules + QUIET_ZONE) * MODULE_SCALE;

        for dy in 0..MODULE_SCALE {
            for dx in 0..MODULE_SCALE {
                img.put_pixel(module_x + dx, module_y + dy, Luma([0u8]));
            }
        }
    }

    let path = out_dir.join(QR_OUTPUT_FILE);
    img.save(&path)
        .map_err(|err| QrError::Image(err.to_string()))?;

    Ok(path)
}

#[cfg(not(feature = "qr"))]
pub fn generate(_url: &str, _out_dir: &Path) -> Result<PathBuf, QrError> {
    Err(QrError::Unavailable)
}
