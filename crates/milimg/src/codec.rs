//! Frame codec capability.
//!
//! The container never compresses pixels itself. It hands single RGBA frames
//! to a [`FrameCodec`] and stores whatever bitstream comes back. The codec is
//! not expected to preserve alpha: frames passed to
//! [`encode_frame`](FrameCodec::encode_frame) are always fully opaque.

use async_trait::async_trait;
use bytes::Bytes;
use image::RgbaImage;

use crate::error::CodecError;

/// Parameters for encoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEncodeParams {
    /// Codec string, e.g. `av01.0.04M.08`.
    pub codec: String,
    /// Target bitrate in bits per second.
    pub bitrate: u64,
    /// Nominal frame rate.
    pub framerate: u32,
    /// Whether to emit a key frame. Always `true` for milimg payloads.
    pub key_frame: bool,
}

/// Parameters for decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDecodeParams {
    /// Codec string, e.g. `av01.0.04M.08`.
    pub codec: String,
    /// Coded width from the container header.
    pub width: u32,
    /// Coded height from the container header.
    pub height: u32,
}

/// A single-frame compressor.
///
/// Implementations own whatever session state they need for the duration of a
/// call and must release it before the returned future completes, on success
/// and on error. Dropping the future abandons the call.
#[async_trait]
pub trait FrameCodec: Send + Sync {
    /// Compresses an opaque frame into a complete, independently decodable
    /// bitstream.
    async fn encode_frame(
        &self,
        frame: &RgbaImage,
        params: &FrameEncodeParams,
    ) -> Result<Bytes, CodecError>;

    /// Decompresses a bitstream produced by [`encode_frame`](Self::encode_frame).
    async fn decode_frame(
        &self,
        data: Bytes,
        params: &FrameDecodeParams,
    ) -> Result<RgbaImage, CodecError>;
}

#[async_trait]
impl<C: FrameCodec + ?Sized> FrameCodec for &C {
    async fn encode_frame(
        &self,
        frame: &RgbaImage,
        params: &FrameEncodeParams,
    ) -> Result<Bytes, CodecError> {
        (**self).encode_frame(frame, params).await
    }

    async fn decode_frame(
        &self,
        data: Bytes,
        params: &FrameDecodeParams,
    ) -> Result<RgbaImage, CodecError> {
        (**self).decode_frame(data, params).await
    }
}

#[async_trait]
impl<C: FrameCodec + ?Sized> FrameCodec for std::sync::Arc<C> {
    async fn encode_frame(
        &self,
        frame: &RgbaImage,
        params: &FrameEncodeParams,
    ) -> Result<Bytes, CodecError> {
        (**self).encode_frame(frame, params).await
    }

    async fn decode_frame(
        &self,
        data: Bytes,
        params: &FrameDecodeParams,
    ) -> Result<RgbaImage, CodecError> {
        (**self).decode_frame(data, params).await
    }
}
