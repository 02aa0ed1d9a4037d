use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};

use crate::config::ScanConfig;
use crate::error::{OcrError, Result};
use crate::region::PixelRect;

/// Decode an image file and apply the gamma adjustment once for the whole run.
///
/// Every region is cropped from the returned bitmap.
pub fn preprocess_file(path: &Path, config: &ScanConfig) -> Result<RgbaImage> {
    let img = load_image(path)?;
    let bitmap = to_bitmap(img, path)?;
    Ok(apply_gamma(&bitmap, config.gamma_power))
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let load_error = |reason: String| OcrError::Load {
        path: path.display().to_string(),
        reason,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| load_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_error(e.to_string()))?;

    reader.decode().map_err(|e| load_error(e.to_string()))
}

/// Convert a decoded image to the RGBA bitmap used for filtering and cropping.
pub fn to_bitmap(img: DynamicImage, path: &Path) -> Result<RgbaImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(OcrError::Conversion {
            path: path.display().to_string(),
            reason: format!("image has no pixels ({}x{})", img.width(), img.height()),
        });
    }
    Ok(img.to_rgba8())
}

/// Raise every color channel to `power` in normalized [0, 1] space.
///
/// Powers below 1 brighten dark captures, powers above 1 darken washed-out
/// ones. Alpha is left untouched.
pub fn apply_gamma(img: &RgbaImage, power: f32) -> RgbaImage {
    let lut: Vec<u8> = (0..=255u16)
        .map(|v| {
            let normalized = v as f32 / 255.0;
            (normalized.powf(power) * 255.0).round().clamp(0.0, 255.0) as u8
        })
        .collect();

    RgbaImage::from_fn(img.width(), img.height(), |x, y| {
        let pixel = img.get_pixel(x, y);
        Rgba([
            lut[pixel[0] as usize],
            lut[pixel[1] as usize],
            lut[pixel[2] as usize],
            pixel[3],
        ])
    })
}

/// Copy out one region. `rect` must already be checked against the image extent.
pub fn crop_region(img: &RgbaImage, rect: &PixelRect) -> RgbaImage {
    image::imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image()
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
