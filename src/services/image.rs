// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Upload normalizer for profile photos, KYC documents and insurance
//! images.
//!
//! Raster uploads are downscaled to a bounded edge and re-encoded as
//! JPEG so the result fits inline in a partner document. Non-raster
//! documents (PDFs) pass through unprocessed. Oversized input is
//! rejected before any decode work.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::AppError;

/// Byte ceiling for KYC and profile images.
pub const KYC_IMAGE_LIMIT: usize = 500_000;
/// Byte ceiling for insurance images (pre-compression).
pub const INSURANCE_IMAGE_LIMIT: usize = 5_000_000;

/// Neither output dimension exceeds this; images are never upscaled.
const MAX_EDGE: u32 = 1024;
/// JPEG re-encode quality.
const JPEG_QUALITY: u8 = 60;

/// Normalize an upload into a self-contained data URL.
pub async fn normalize_upload(
    bytes: Vec<u8>,
    content_type: &str,
    limit: usize,
) -> Result<String, AppError> {
    if bytes.len() > limit {
        return Err(AppError::FileTooLarge {
            size: bytes.len(),
            limit,
        });
    }

    // Non-raster documents are stored as-is.
    if !content_type.starts_with("image/") {
        return Ok(to_data_url(content_type, &bytes));
    }

    let encoded = tokio::task::spawn_blocking(move || compress_to_jpeg(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Image task failed: {}", e)))??;

    Ok(to_data_url("image/jpeg", &encoded))
}

/// Decode, bound to MAX_EDGE preserving aspect ratio, re-encode as JPEG.
fn compress_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AppError::BadRequest(format!("Could not decode image: {}", e)))?;

    let (width, height) = decoded.dimensions();
    let (target_width, target_height) = bounded_size(width, height);

    let resized = if (target_width, target_height) == (width, height) {
        decoded
    } else {
        image::DynamicImage::ImageRgba8(image::imageops::resize(
            &decoded,
            target_width,
            target_height,
            FilterType::Triangle,
        ))
    };

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();
    let mut out = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JPEG encode failed: {}", e)))?;

    Ok(out)
}

/// Scale so that neither edge exceeds MAX_EDGE; never upscale.
fn bounded_size(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_EDGE && height <= MAX_EDGE {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (MAX_EDGE as f64) / (width as f64)).round() as u32;
        (MAX_EDGE, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (MAX_EDGE as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), MAX_EDGE)
    }
}

fn to_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, BASE64.encode(bytes))
}
