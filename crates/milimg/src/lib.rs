//! A crate for packing images into milimg containers and unpacking them.
//!
//! A milimg container is a 28-byte big-endian header followed by one AV1
//! bitstream holding the color planes and, for images with transparency, a
//! second AV1 bitstream holding the alpha channel encoded as a grayscale
//! image.
//!
//! Supports:
//! - Header and container mux/demux with zero-copy payloads
//! - Header-only inspection ([`parse_milimg_container`]) that never touches a codec
//! - Encoding PNG/JPEG/WebP sources ([`MilimgEncoder`], [`encode_milimg`])
//! - Decoding back to PNG or RGBA ([`MilimgDecoder`], [`decode_milimg`])
//!
//! Compression is delegated to a [`FrameCodec`] implementation.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
mod config;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod quality;
pub mod raster;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

use bytes::Bytes;

pub use codec::{FrameCodec, FrameDecodeParams, FrameEncodeParams};
pub use config::{
    DEFAULT_BITRATE_BUDGET, DEFAULT_CODEC, DEFAULT_FRAMERATE, DEFAULT_MAX_PIXELS, DecoderConfig,
    EncoderConfig,
};
pub use container::{ContainerInfo, MilimgContainer, PayloadRange, parse_container_info};
pub use decoder::MilimgDecoder;
pub use encoder::MilimgEncoder;
pub use error::{CodecError, FormatError, MilimgError, Result};
pub use header::{MAGIC, MilimgHeader, Version, is_milimg};
pub use quality::Quality;

/// Quality used when the caller has no preference.
pub const DEFAULT_QUALITY: i32 = 0;

/// Encodes a PNG, JPEG or WebP image into a milimg container.
///
/// `quality` must be in `0..=63` (lower is better, [`DEFAULT_QUALITY`] is
/// the best).
pub async fn encode_milimg<C: FrameCodec>(codec: C, image: &[u8], quality: i32) -> Result<Bytes> {
    MilimgEncoder::new(codec).encode(image, quality).await
}

/// Decodes a milimg container and returns the image as PNG.
pub async fn decode_milimg<C: FrameCodec>(codec: C, data: Bytes) -> Result<Bytes> {
    MilimgDecoder::new(codec).decode(data).await
}

/// Reads the header and payload locations of a container without decoding it.
pub fn parse_milimg_container(data: &[u8]) -> Result<ContainerInfo> {
    Ok(parse_container_info(data)?)
}

#[cfg(test)]
#[cfg_attr(all(coverage_nightly, test), coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{XorCodec, gradient_image, png_bytes, solid_image};

    #[tokio::test]
    async fn test_round_trip_opaque() {
        let codec = XorCodec::new();
        let source = solid_image(5, 3, [12, 34, 56, 255]);

        let data = encode_milimg(&codec, &png_bytes(&source), DEFAULT_QUALITY)
            .await
            .unwrap();
        let png = decode_milimg(&codec, data).await.unwrap();

        let decoded = raster::decode_image(&png, None).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded, source);
    }

    #[tokio::test]
    async fn test_round_trip_alpha() {
        let codec = XorCodec::new();
        let source = gradient_image(16, 4);

        let data = encode_milimg(&codec, &png_bytes(&source), 30)
            .await
            .unwrap();
        assert_eq!(parse_milimg_container(&data).unwrap().version, Version::Alpha);

        let png = decode_milimg(&codec, data).await.unwrap();
        let decoded = raster::decode_image(&png, None).unwrap();
        assert_eq!(decoded, source);
    }

    #[tokio::test]
    async fn test_version_selection() {
        let codec = XorCodec::new();
        let mut image = solid_image(2, 2, [255, 255, 255, 255]);

        let data = encode_milimg(&codec, &png_bytes(&image), 0).await.unwrap();
        assert_eq!(parse_milimg_container(&data).unwrap().version, Version::Opaque);

        image.get_pixel_mut(0, 1).0[3] = 0;
        let data = encode_milimg(&codec, &png_bytes(&image), 0).await.unwrap();
        assert_eq!(parse_milimg_container(&data).unwrap().version, Version::Alpha);
    }

    #[tokio::test]
    async fn test_parse_does_not_touch_codec() {
        let codec = XorCodec::new();
        let source = gradient_image(7, 9);
        let data = encode_milimg(&codec, &png_bytes(&source), 0).await.unwrap();
        assert_eq!(codec.encode_calls(), 2);

        let info = parse_milimg_container(&data).unwrap();
        assert_eq!(info.version, Version::Alpha);
        assert_eq!((info.width, info.height), (7, 9));
        assert_eq!(info.container_len(), data.len() as u64);
        assert_eq!(codec.encode_calls(), 2);
        assert_eq!(codec.decode_calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_magic_always_invalid_format() {
        let codec = XorCodec::new();
        let data = encode_milimg(&codec, &png_bytes(&solid_image(2, 2, [0; 4])), 0)
            .await
            .unwrap();

        for garbage in [b"MILIMG00", b"Milimg01", b"\x89PNG\r\n\x1a\n"] {
            let mut bad = data.to_vec();
            bad[..8].copy_from_slice(garbage);
            let err = decode_milimg(&codec, Bytes::from(bad.clone()))
                .await
                .unwrap_err();
            assert!(err.is_invalid_format(), "{err}");
            assert!(parse_milimg_container(&bad).unwrap_err().is_invalid_format());
        }
        assert_eq!(codec.decode_calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let codec = Arc::new(XorCodec::new());
        let mut tasks = Vec::new();
        for size in 1..=8u32 {
            let codec = Arc::clone(&codec);
            tasks.push(tokio::spawn(async move {
                let source = gradient_image(size, size + 1);
                let data = encode_milimg(Arc::clone(&codec), &png_bytes(&source), 0)
                    .await
                    .unwrap();
                let decoded = MilimgDecoder::new(codec)
                    .decode_raster(data)
                    .await
                    .unwrap();
                (source, decoded)
            }));
        }

        for task in tasks {
            let (source, decoded) = task.await.unwrap();
            assert_eq!(decoded, source);
        }
    }
}
