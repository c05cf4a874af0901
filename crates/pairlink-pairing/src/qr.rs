use crate::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pairlink_core::PairingCode;
use qrcode::QrCode;
use qrcode::render::svg;

/// Smallest rendered edge in pixels, large enough for a phone camera
const MIN_DIMENSION: u32 = 264;

/// A pairing code rendered as an inline SVG image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    data_url: String,
}

impl QrImage {
    /// Encode a pairing code as a QR image
    pub fn encode(code: &PairingCode) -> Result<Self> {
        tracing::debug!("Encoding pairing code ({} bytes)", code.as_str().len());

        let qr = QrCode::new(code.as_str().as_bytes())?;
        let image = qr
            .render::<svg::Color>()
            .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();

        Ok(Self {
            data_url: format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)),
        })
    }

    /// `data:` URL usable directly as an `<img src>`
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}
