use image::ImageFormat;

/// WebCodecs-style codec string: AV1 Main profile, level 3.0, Main tier, 8-bit.
pub const DEFAULT_CODEC: &str = "av01.0.04M.08";

/// Numerator of the bitrate rule `budget / (quality + 1)`.
pub const DEFAULT_BITRATE_BUDGET: u64 = 10_000_000;

/// Frame rate announced to the frame encoder. Containers hold a single key frame.
pub const DEFAULT_FRAMERATE: u32 = 30;

/// Largest image the decoder accepts by default, in pixels.
pub const DEFAULT_MAX_PIXELS: u64 = 16384 * 16384;

/// Options for [`MilimgEncoder`](crate::MilimgEncoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Codec string handed to the frame encoder
    pub codec: String,

    /// Frame rate handed to the frame encoder
    pub framerate: u32,

    /// Bitrate at quality 0. Quality `q` encodes at `bitrate_budget / (q + 1)`.
    pub bitrate_budget: u64,

    /// Format of the source image. `None` sniffs it from the leading bytes.
    pub format_hint: Option<ImageFormat>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_CODEC.to_owned(),
            framerate: DEFAULT_FRAMERATE,
            bitrate_budget: DEFAULT_BITRATE_BUDGET,
            format_hint: None,
        }
    }
}

impl EncoderConfig {
    /// Sets the codec string.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    /// Sets the frame rate.
    pub fn with_framerate(mut self, framerate: u32) -> Self {
        self.framerate = framerate;
        self
    }

    /// Sets the bitrate at quality 0.
    pub fn with_bitrate_budget(mut self, bitrate_budget: u64) -> Self {
        self.bitrate_budget = bitrate_budget;
        self
    }

    /// Forces the source image format.
    pub fn with_format_hint(mut self, format: ImageFormat) -> Self {
        self.format_hint = Some(format);
        self
    }
}

/// Options for [`MilimgDecoder`](crate::MilimgDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Codec string handed to the frame decoder
    pub codec: String,

    /// Containers declaring more pixels than this are rejected before any
    /// payload is decoded.
    pub max_pixels: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_CODEC.to_owned(),
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl DecoderConfig {
    /// Sets the codec string.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    /// Sets the pixel limit.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_config_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.codec, "av01.0.04M.08");
        assert_eq!(config.framerate, 30);
        assert_eq!(config.bitrate_budget, 10_000_000);
        assert_eq!(config.format_hint, None);
    }

    #[test]
    fn test_config_builders() {
        let config = EncoderConfig::default()
            .with_codec("av01.0.08M.10")
            .with_framerate(1)
            .with_bitrate_budget(1_000)
            .with_format_hint(ImageFormat::Png);
        assert_eq!(config.codec, "av01.0.08M.10");
        assert_eq!(config.framerate, 1);
        assert_eq!(config.bitrate_budget, 1_000);
        assert_eq!(config.format_hint, Some(ImageFormat::Png));

        let config = DecoderConfig::default().with_max_pixels(64);
        assert_eq!(config.max_pixels, 64);
        assert_eq!(config.codec, DEFAULT_CODEC);
    }
}
