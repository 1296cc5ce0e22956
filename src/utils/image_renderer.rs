use anyhow::{Context, Result};
use image::Luma;
use log::warn;
use qrcode::QrCode;
use qrcode::render::svg;
use std::time::Duration;

use crate::config::app_config::ImageServiceConfig;
use crate::models::qr_payload::QrPayload;

/// Image URL produced for a QR payload.
///
/// `Unverified` means the external service was not probed, or the probe
/// failed; the URL is still returned so the QR record can be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUrl {
    Verified(String),
    Unverified(String),
}

impl ImageUrl {
    pub fn as_str(&self) -> &str {
        match self {
            ImageUrl::Verified(url) | ImageUrl::Unverified(url) => url,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ImageUrl::Verified(url) | ImageUrl::Unverified(url) => url,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, ImageUrl::Verified(_))
    }
}

/// Build the URL of the externally rendered QR image for `payload`.
pub fn qr_image_url(payload: &QrPayload, config: &ImageServiceConfig) -> Result<String> {
    let data = payload
        .to_json_string()
        .context("Failed to serialize QR payload")?;

    let separator = if config.base_url.contains('?') { '&' } else { '?' };
    Ok(format!(
        "{}{}size={}x{}&data={}",
        config.base_url,
        separator,
        config.size,
        config.size,
        urlencoding::encode(&data)
    ))
}

/// Build the image URL and, when enabled, check that the service answers a
/// HEAD request for it. Returns `None` only when no URL could be built.
pub async fn render_image_url(
    payload: &QrPayload,
    config: &ImageServiceConfig,
    client: &reqwest::Client,
) -> Option<ImageUrl> {
    let url = match qr_image_url(payload, config) {
        Ok(url) => url,
        Err(e) => {
            warn!("Could not build QR image URL: {:#}", e);
            return None;
        }
    };

    if !config.probe {
        return Some(ImageUrl::Unverified(url));
    }

    let probe = client
        .head(&url)
        .timeout(Duration::from_millis(config.probe_timeout_ms))
        .send()
        .await;

    match probe {
        Ok(response) if response.status().is_success() => Some(ImageUrl::Verified(url)),
        Ok(response) => {
            warn!("QR image probe returned {}", response.status());
            Some(ImageUrl::Unverified(url))
        }
        Err(e) => {
            warn!("QR image probe failed: {}", e);
            Some(ImageUrl::Unverified(url))
        }
    }
}

/// Render `payload` locally as an SVG document.
pub fn render_svg(payload: &QrPayload, size: u32) -> Result<String> {
    let data = payload.to_json_string().context("Failed to serialize QR payload")?;
    let code = QrCode::new(data.as_bytes()).context("QR code generation error")?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .quiet_zone(true)
        .build())
}

/// Render `payload` locally as a PNG image.
pub fn render_png(payload: &QrPayload, size: u32) -> Result<Vec<u8>> {
    let data = payload.to_json_string().context("Failed to serialize QR payload")?;
    let code = QrCode::new(data.as_bytes()).context("QR code generation error")?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .build();

    let mut png_bytes: Vec<u8> = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    image::ImageEncoder::write_image(
        encoder,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )
    .context("Failed to encode QR code PNG")?;

    Ok(png_bytes)
}
