//! Fake frame codecs and image builders for container tests.
//!
//! This module is available for local milimg tests and optionally for
//! downstream crate tests when the `test-utils` feature is enabled.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use image::{Rgba, RgbaImage};

use crate::codec::{FrameCodec, FrameDecodeParams, FrameEncodeParams};
use crate::error::CodecError;

/// Key applied to every pixel byte by [`XorCodec`].
const XOR_KEY: u8 = 0x5A;

/// Lossless stand-in for an AV1 codec.
///
/// A "bitstream" is the frame width and height (big-endian `u32`s) followed by
/// the RGBA bytes XOR-ed with a fixed key. Every call is recorded so tests can
/// check what the container handed to the codec.
#[derive(Debug, Default)]
pub struct XorCodec {
    encode_calls: AtomicUsize,
    decode_calls: AtomicUsize,
    encoded_frames: Mutex<Vec<(RgbaImage, FrameEncodeParams)>>,
    decode_params: Mutex<Vec<FrameDecodeParams>>,
}

impl XorCodec {
    /// Creates a codec with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `encode_frame` calls so far.
    pub fn encode_calls(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }

    /// Number of `decode_frame` calls so far.
    pub fn decode_calls(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }

    /// Frames and parameters passed to `encode_frame`, in call order.
    pub fn encoded_frames(&self) -> Vec<(RgbaImage, FrameEncodeParams)> {
        self.encoded_frames
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }

    /// Parameters passed to `decode_frame`, in call order.
    pub fn decode_params(&self) -> Vec<FrameDecodeParams> {
        self.decode_params
            .lock()
            .map(|params| params.clone())
            .unwrap_or_default()
    }

    /// Produces the bitstream `encode_frame` would return, without recording.
    pub fn bitstream(frame: &RgbaImage) -> Bytes {
        let raw = frame.as_raw();
        let mut buf = BytesMut::with_capacity(8 + raw.len());
        buf.put_u32(frame.width());
        buf.put_u32(frame.height());
        buf.extend(raw.iter().map(|byte| byte ^ XOR_KEY));
        buf.freeze()
    }
}

#[async_trait]
impl FrameCodec for XorCodec {
    async fn encode_frame(
        &self,
        frame: &RgbaImage,
        params: &FrameEncodeParams,
    ) -> Result<Bytes, CodecError> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut frames) = self.encoded_frames.lock() {
            frames.push((frame.clone(), params.clone()));
        }
        Ok(Self::bitstream(frame))
    }

    async fn decode_frame(
        &self,
        data: Bytes,
        params: &FrameDecodeParams,
    ) -> Result<RgbaImage, CodecError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut recorded) = self.decode_params.lock() {
            recorded.push(params.clone());
        }

        if data.len() < 8 {
            return Err(format!("bitstream too short: {} bytes", data.len()).into());
        }
        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let pixels = data[8..].iter().map(|byte| byte ^ XOR_KEY).collect();
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| format!("bitstream does not hold a {width}x{height} frame").into())
    }
}

/// Codec whose every call fails.
#[derive(Debug, Default)]
pub struct FailingCodec {
    calls: AtomicUsize,
}

impl FailingCodec {
    /// Creates a failing codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls so far, encode and decode combined.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameCodec for FailingCodec {
    async fn encode_frame(
        &self,
        _frame: &RgbaImage,
        _params: &FrameEncodeParams,
    ) -> Result<Bytes, CodecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("encoder session could not be configured".into())
    }

    async fn decode_frame(
        &self,
        _data: Bytes,
        _params: &FrameDecodeParams,
    ) -> Result<RgbaImage, CodecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("decoder session could not be configured".into())
    }
}

/// A `width`x`height` image filled with `pixel`.
pub fn solid_image(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(pixel))
}

/// A `width`x`height` image with a color gradient and a horizontal alpha ramp.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let a = (x * 255 / width.max(1)) as u8;
        Rgba([r, g, 128, a])
    })
}

/// PNG encoding of `image`.
pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    crate::raster::encode_png(image).unwrap_or_default()
}
