//! # Provider QR Code
//!
//! [`QrRenderer`] implementations for **Totem**, backed by the [`qrcode`] crate.

#![deny(rust_2018_idioms, clippy::all, clippy::pedantic)]

use qrcode::{
    render::{svg, unicode},
    QrCode,
};
use totem_core::provider::{Image, QrRenderer, RenderError};

/// Renders QR codes as SVG images.
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgRenderer;

impl QrRenderer for SvgRenderer {
    fn render(&self, text: &str, size: u32) -> Result<Image, RenderError> {
        let svg = encode(text)?
            .render::<svg::Color<'_>>()
            .min_dimensions(size, size)
            .build();

        Ok(Image {
            data: svg.into_bytes(),
            mime_type: "image/svg+xml",
        })
    }
}

/// Renders QR codes as block characters for display in a terminal. The `size` is ignored, as each
/// module always takes up one character horizontally and half a line vertically.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeRenderer;

impl QrRenderer for UnicodeRenderer {
    fn render(&self, text: &str, _size: u32) -> Result<Image, RenderError> {
        let blocks = encode(text)?
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build();

        Ok(Image {
            data: blocks.into_bytes(),
            mime_type: "text/plain;charset=utf-8",
        })
    }
}

fn encode(text: &str) -> Result<QrCode, RenderError> {
    QrCode::new(text.as_bytes()).map_err(RenderError::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "otpauth://totp/me?secret=VMR466AB62ZBOKHE&period=30&algorithm=SHA1&digits=6";

    #[test]
    fn svg() {
        let image = SvgRenderer.render(URI, 200).unwrap();
        let svg = String::from_utf8(image.data).unwrap();

        assert_eq!("image/svg+xml", image.mime_type);
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn unicode() {
        let image = UnicodeRenderer.render(URI, 200).unwrap();
        let blocks = String::from_utf8(image.data).unwrap();

        assert!(blocks.lines().count() > 10);
    }

    #[test]
    fn too_long() {
        assert!(SvgRenderer.render(&"A".repeat(8_000), 200).is_err());
    }
}
