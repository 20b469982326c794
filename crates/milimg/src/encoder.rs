//! Container encoder.

use bytes::Bytes;
use image::RgbaImage;
use tracing::{debug, trace};

use crate::codec::{FrameCodec, FrameEncodeParams};
use crate::config::EncoderConfig;
use crate::container::MilimgContainer;
use crate::error::{MilimgError, Result};
use crate::quality::Quality;
use crate::raster;

/// Packs images into milimg containers using a [`FrameCodec`].
///
/// The encoder holds no per-call state, so one instance can serve concurrent
/// calls as long as the codec allows it.
#[derive(Debug)]
pub struct MilimgEncoder<C> {
    codec: C,
    config: EncoderConfig,
}

impl<C: FrameCodec> MilimgEncoder<C> {
    /// Creates an encoder with the default configuration.
    pub fn new(codec: C) -> Self {
        Self::with_config(codec, EncoderConfig::default())
    }

    /// Creates an encoder with the given configuration.
    pub fn with_config(codec: C, config: EncoderConfig) -> Self {
        Self { codec, config }
    }

    /// The encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The underlying frame codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Encodes a PNG, JPEG or WebP image into a milimg container.
    ///
    /// `quality` must be in `0..=63`; it is checked before the image is
    /// decoded.
    pub async fn encode(&self, image: &[u8], quality: i32) -> Result<Bytes> {
        let quality = Quality::new(quality)?;
        let raster = raster::decode_image(image, self.config.format_hint).map_err(|err| {
            debug!("Failed to decode source image ({} bytes): {}", image.len(), err);
            MilimgError::encoding(err)
        })?;
        self.encode_raster(&raster, quality).await
    }

    /// Encodes an RGBA raster into a milimg container.
    ///
    /// The color payload is always encoded from a fully opaque copy of the
    /// raster. If any pixel has alpha below 255 a second payload holding the
    /// alpha channel as grayscale is encoded after it.
    pub async fn encode_raster(&self, raster: &RgbaImage, quality: Quality) -> Result<Bytes> {
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Err(MilimgError::invalid_argument(format!(
                "image has no pixels: {width}x{height}"
            )));
        }

        let use_alpha = raster::has_transparency(raster);
        let params = self.frame_params(quality);
        debug!(
            "Encoding {}x{} milimg (alpha: {}, quality: {}, bitrate: {})",
            width, height, use_alpha, quality, params.bitrate
        );

        let color = self
            .encode_frame(&raster::flatten_alpha(raster), &params, "color")
            .await?;
        let alpha = if use_alpha {
            let mask = raster::alpha_to_grayscale(raster);
            Some(self.encode_frame(&mask, &params, "alpha").await?)
        } else {
            None
        };

        let container = MilimgContainer {
            width,
            height,
            color,
            alpha,
        };
        let mut buf = Vec::with_capacity(container.encoded_len());
        container.mux(&mut buf).map_err(MilimgError::encoding)?;

        debug!(
            "Encoded milimg version {}: {} bytes",
            container.version().to_u32(),
            buf.len()
        );
        Ok(Bytes::from(buf))
    }

    fn frame_params(&self, quality: Quality) -> FrameEncodeParams {
        FrameEncodeParams {
            codec: self.config.codec.clone(),
            bitrate: quality.bitrate(self.config.bitrate_budget),
            framerate: self.config.framerate,
            key_frame: true,
        }
    }

    async fn encode_frame(
        &self,
        frame: &RgbaImage,
        params: &FrameEncodeParams,
        plane: &str,
    ) -> Result<Bytes> {
        let payload = self
            .codec
            .encode_frame(frame, params)
            .await
            .map_err(|err| {
                debug!("Failed to encode {} payload: {}", plane, err);
                MilimgError::Encoding(err)
            })?;
        trace!("Encoded {} payload: {} bytes", plane, payload.len());
        Ok(payload)
    }
}
