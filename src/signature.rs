//! Waiver signature handling.
//!
//! The drawing canvas lives in the browser; what reaches the service is a
//! `data:image/png;base64,...` URL. We decode it, make sure the payload is
//! a real PNG before it goes anywhere near the asset store, and name the
//! uploaded file after the person. Receipts get a QR code pointing at the
//! ticket's signing page.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::QrCode;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature is not a data URL")]
    NotDataUrl,

    #[error("unsupported signature media type: {0}")]
    UnsupportedMediaType(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("signature payload is not a valid image: {0}")]
    Image(#[from] image::ImageError),
}

/// True for freshly captured signatures (as opposed to already-uploaded
/// asset URLs, which pass through untouched).
pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:")
}

/// Decode a signature data URL into verified PNG bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, SignatureError> {
    let payload = match url.strip_prefix(PNG_DATA_URL_PREFIX) {
        Some(payload) => payload,
        None if is_data_url(url) => {
            let media_type = url
                .trim_start_matches("data:")
                .split([';', ','])
                .next()
                .unwrap_or("")
                .to_string();
            return Err(SignatureError::UnsupportedMediaType(media_type));
        }
        None => return Err(SignatureError::NotDataUrl),
    };

    let bytes = BASE64.decode(payload)?;
    // decode fully rather than trusting the declared media type
    image::load_from_memory(&bytes)?;
    Ok(bytes)
}

/// Asset filename for a person's signature, e.g. `Asha_Verma_signature.png`.
pub fn asset_filename(person: &str) -> String {
    let mut stem: String = person
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if stem.is_empty() {
        stem.push_str("guest");
    }
    format!("{stem}_signature.png")
}

/// SVG QR code linking to a ticket's waiver signing page, embeddable
/// directly into the receipt markup.
pub fn waiver_qr(url: &str) -> Result<String, QrError> {
    let code = QrCode::new(url.as_bytes())?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(160, 160)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_data_url() -> String {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(buf.into_inner()))
    }

    #[test]
    fn decodes_png_data_urls() {
        let bytes = decode_data_url(&png_data_url()).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn rejects_plain_urls() {
        let err = decode_data_url("https://cdn.example/sig.png").unwrap_err();
        assert!(matches!(err, SignatureError::NotDataUrl));
    }

    #[test]
    fn rejects_non_png_media_types() {
        let err = decode_data_url("data:image/jpeg;base64,AAAA").unwrap_err();
        match err {
            SignatureError::UnsupportedMediaType(media_type) => {
                assert_eq!(media_type, "image/jpeg")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_garbage_payloads() {
        let err = decode_data_url("data:image/png;base64,!!!").unwrap_err();
        assert!(matches!(err, SignatureError::Base64(_)));

        let not_an_image = format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(b"hello"));
        let err = decode_data_url(&not_an_image).unwrap_err();
        assert!(matches!(err, SignatureError::Image(_)));
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(asset_filename("Asha Verma"), "Asha_Verma_signature.png");
        assert_eq!(asset_filename("  "), "guest_signature.png");
        assert_eq!(asset_filename("a/b"), "ab_signature.png");
    }

    #[test]
    fn qr_renders_svg() {
        let svg = waiver_qr("https://pos.example/ticket/ticket-1").unwrap();
        assert!(svg.contains("<svg"));
    }
}
