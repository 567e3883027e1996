//! Upload decoding.
//!
//! Uploaded bytes must decode as an image before anything is sent to the
//! provider. Formats the provider accepts inline are forwarded untouched;
//! everything else that decodes is re-encoded as PNG.

use super::providers::ImageInput;
use image::error::{LimitError, LimitErrorKind};
use image::io::Reader;
use image::{ImageError, ImageFormat, ImageOutputFormat, ImageResult};
use std::io::Cursor;

/// Largest pixel count accepted for decoding (PIL's decompression-bomb
/// threshold). Decoding allocates width * height * channels bytes up front,
/// so the header's dimensions are checked before any pixel data is read.
pub const MAX_IMAGE_PIXELS: u64 = 178_956_970;

/// Decode `bytes` and prepare them for inline submission.
pub fn decode_upload(bytes: &[u8]) -> ImageResult<ImageInput> {
    let format = image::guess_format(bytes)?;
    let (width, height) = Reader::with_format(Cursor::new(bytes), format).into_dimensions()?;
    check_pixel_budget(width, height)?;

    let decoded = image::load_from_memory_with_format(bytes, format)?;

    let (mime_type, data) = match passthrough_mime_type(format) {
        Some(mime_type) => (mime_type, bytes.to_vec()),
        None => {
            let mut buffer = Cursor::new(Vec::new());
            decoded.write_to(&mut buffer, ImageOutputFormat::Png)?;
            ("image/png", buffer.into_inner())
        }
    };

    tracing::debug!(
        format = ?format,
        width,
        height,
        mime_type,
        "Decoded uploaded image"
    );

    Ok(ImageInput {
        mime_type,
        data,
        width,
        height,
    })
}

fn check_pixel_budget(width: u32, height: u32) -> ImageResult<()> {
    if u64::from(width) * u64::from(height) > MAX_IMAGE_PIXELS {
        tracing::warn!(width, height, "Rejected oversized image before decoding");
        return Err(ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::DimensionError,
        )));
    }
    Ok(())
}

fn passthrough_mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn encoded(format: ImageOutputFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 5));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn png_is_forwarded_unchanged() {
        let bytes = encoded(ImageOutputFormat::Png);
        let input = decode_upload(&bytes).unwrap();

        assert_eq!(input.mime_type, "image/png");
        assert_eq!(input.data, bytes);
        assert_eq!((input.width, input.height), (8, 5));
    }

    #[test]
    fn jpeg_is_forwarded_unchanged() {
        let bytes = encoded(ImageOutputFormat::Jpeg(90));
        let input = decode_upload(&bytes).unwrap();

        assert_eq!(input.mime_type, "image/jpeg");
        assert_eq!(input.data, bytes);
    }

    #[test]
    fn bmp_is_reencoded_as_png() {
        let bytes = encoded(ImageOutputFormat::Bmp);
        let input = decode_upload(&bytes).unwrap();

        assert_eq!(input.mime_type, "image/png");
        assert_ne!(input.data, bytes);
        assert_eq!(
            image::guess_format(&input.data).unwrap(),
            ImageFormat::Png
        );
        assert_eq!((input.width, input.height), (8, 5));
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        let err = decode_upload(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageError::Unsupported(_)));
    }

    #[test]
    fn truncated_png_is_rejected() {
        let bytes = encoded(ImageOutputFormat::Png);
        assert!(decode_upload(&bytes[..bytes.len() / 2]).is_err());
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in bytes {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    fn push_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
        png.extend_from_slice(&(data.len() as u32).to_be_bytes());
        let start = png.len();
        png.extend_from_slice(kind);
        png.extend_from_slice(data);
        let crc = crc32(&png[start..]);
        png.extend_from_slice(&crc.to_be_bytes());
    }

    /// A tiny PNG whose header declares 50000x50000 grayscale pixels.
    fn oversized_png() -> Vec<u8> {
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&50_000u32.to_be_bytes());
        ihdr.extend_from_slice(&50_000u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);
        push_chunk(&mut png, b"IHDR", &ihdr);

        // zlib stream of an empty stored block
        push_chunk(
            &mut png,
            b"IDAT",
            &[0x78, 0x01, 0x01, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x01],
        );
        push_chunk(&mut png, b"IEND", &[]);
        png
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_decoding() {
        let bytes = oversized_png();
        assert!(bytes.len() < 100);

        let err = decode_upload(&bytes).unwrap_err();
        assert!(matches!(err, ImageError::Limits(_)));
    }

    #[test]
    fn pixel_budget_boundary() {
        assert!(check_pixel_budget(13_377, 13_377).is_ok());
        assert!(check_pixel_budget(178_956_970, 1).is_ok());
        assert!(check_pixel_budget(178_956_971, 1).is_err());
        assert!(check_pixel_budget(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(decode_upload(&[]).is_err());
    }
}
