use anyhow::Result;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::BotError;

/// Logo spans 20% of the base width, inset 2% from the bottom-right corner.
const LOGO_WIDTH_RATIO: f32 = 0.20;
const PADDING_RATIO: f32 = 0.02;

/// Overlay the brand logo onto a generated image.
///
/// An absent logo file is not an error: the image passes through unchanged.
pub fn apply_logo(image_bytes: &[u8], logo_path: &Path) -> Result<Vec<u8>> {
    if !logo_path.exists() {
        return Ok(image_bytes.to_vec());
    }

    let base = image::load_from_memory(image_bytes)
        .map_err(|e| BotError::ImageGeneration(format!("could not decode base image: {}", e)))?;
    let logo = image::open(logo_path)
        .map_err(|e| BotError::ImageGeneration(format!("could not open logo: {}", e)))?;

    let (base_width, base_height) = base.dimensions();
    let logo_width = ((base_width as f32 * LOGO_WIDTH_RATIO) as u32).max(1);
    let scale = logo_width as f32 / logo.width() as f32;
    let logo_height = ((logo.height() as f32 * scale) as u32).max(1);
    let logo = logo.resize_exact(logo_width, logo_height, FilterType::Lanczos3);

    let padding_x = (base_width as f32 * PADDING_RATIO) as u32;
    let padding_y = (base_height as f32 * PADDING_RATIO) as u32;
    let x = base_width.saturating_sub(logo_width + padding_x);
    let y = base_height.saturating_sub(logo_height + padding_y);

    let mut composed = base.to_rgba8();
    imageops::overlay(&mut composed, &logo.to_rgba8(), x as i64, y as i64);

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(composed)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| BotError::ImageGeneration(format!("could not encode image: {}", e)))?;

    Ok(out.into_inner())
}
