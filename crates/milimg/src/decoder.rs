//! Container decoder.

use std::io;

use bytes::Bytes;
use image::RgbaImage;
use tracing::{debug, trace};

use crate::codec::{FrameCodec, FrameDecodeParams};
use crate::config::DecoderConfig;
use crate::container::MilimgContainer;
use crate::error::{FormatError, MilimgError, Result};
use crate::raster;

/// Unpacks milimg containers using a [`FrameCodec`].
#[derive(Debug)]
pub struct MilimgDecoder<C> {
    codec: C,
    config: DecoderConfig,
}

impl<C: FrameCodec> MilimgDecoder<C> {
    /// Creates a decoder with the default configuration.
    pub fn new(codec: C) -> Self {
        Self::with_config(codec, DecoderConfig::default())
    }

    /// Creates a decoder with the given configuration.
    pub fn with_config(codec: C, config: DecoderConfig) -> Self {
        Self { codec, config }
    }

    /// The decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The underlying frame codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decodes a container and returns the image as PNG.
    pub async fn decode(&self, data: Bytes) -> Result<Bytes> {
        let image = self.decode_raster(data).await?;
        let png = raster::encode_png(&image).map_err(|err| {
            debug!("Failed to encode decoded image as PNG: {}", err);
            MilimgError::decoding(err)
        })?;
        Ok(Bytes::from(png))
    }

    /// Decodes a container into an RGBA raster.
    ///
    /// The whole container structure is validated before the codec sees any
    /// payload, so malformed input never reaches it.
    pub async fn decode_raster(&self, data: Bytes) -> Result<RgbaImage> {
        let container = MilimgContainer::demux(&mut io::Cursor::new(data)).map_err(|err| {
            debug!("Rejected milimg container: {}", err);
            MilimgError::InvalidFormat(err)
        })?;

        let (width, height) = (container.width, container.height);
        if container.header().pixel_count() > self.config.max_pixels {
            return Err(FormatError::DimensionsTooLarge {
                width,
                height,
                max_pixels: self.config.max_pixels,
            }
            .into());
        }

        debug!(
            "Decoding {}x{} milimg (color: {} bytes, alpha: {:?} bytes)",
            width,
            height,
            container.color.len(),
            container.alpha.as_ref().map(Bytes::len)
        );

        let params = FrameDecodeParams {
            codec: self.config.codec.clone(),
            width,
            height,
        };

        let mut image = self.decode_frame(container.color, &params, "color").await?;
        match container.alpha {
            Some(alpha) => {
                let mask = self.decode_frame(alpha, &params, "alpha").await?;
                raster::apply_grayscale_alpha(&mut image, &mask);
            }
            None => {
                for pixel in image.pixels_mut() {
                    pixel.0[3] = u8::MAX;
                }
            }
        }

        Ok(image)
    }

    async fn decode_frame(
        &self,
        payload: Bytes,
        params: &FrameDecodeParams,
        plane: &str,
    ) -> Result<RgbaImage> {
        let frame = self
            .codec
            .decode_frame(payload, params)
            .await
            .map_err(|err| {
                debug!("Failed to decode {} payload: {}", plane, err);
                MilimgError::Decoding(err)
            })?;

        if frame.dimensions() != (params.width, params.height) {
            let (width, height) = frame.dimensions();
            debug!(
                "Decoded {} frame is {}x{}, header declares {}x{}",
                plane, width, height, params.width, params.height
            );
            return Err(MilimgError::decoding(format!(
                "{plane} frame is {width}x{height}, expected {}x{}",
                params.width, params.height
            )));
        }

        trace!("Decoded {} payload", plane);
        Ok(frame)
    }
}
