//! Error types for milimg container encoding and decoding.

use std::io;

use thiserror::Error;

/// Boxed error raised by an external collaborator (frame codec, raster codec).
pub type CodecError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while encoding, decoding or inspecting a container.
#[derive(Error, Debug)]
pub enum MilimgError {
    /// A caller-supplied argument is out of range (e.g. quality outside `0..=63`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The container bytes are structurally invalid.
    #[error("invalid milimg container: {0}")]
    InvalidFormat(#[from] FormatError),

    /// Raster decoding or the frame encoder failed.
    #[error("encoding failed: {0}")]
    Encoding(#[source] CodecError),

    /// The frame decoder or the PNG encoder failed.
    #[error("decoding failed: {0}")]
    Decoding(#[source] CodecError),
}

impl MilimgError {
    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Wrap a collaborator error raised on the encode path.
    pub fn encoding(err: impl Into<CodecError>) -> Self {
        Self::Encoding(err.into())
    }

    /// Wrap a collaborator error raised on the decode path.
    pub fn decoding(err: impl Into<CodecError>) -> Self {
        Self::Decoding(err.into())
    }

    /// Returns `true` for [`MilimgError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns `true` for [`MilimgError::InvalidFormat`].
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }
}

/// Structural problems found while parsing container bytes.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The first 8 bytes are not `"Milimg00"`.
    #[error("invalid signature: expected \"Milimg00\", got {0:?}")]
    InvalidSignature([u8; 8]),

    /// The version field is neither 0 nor 1.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),

    /// Width or height is zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// The declared image is larger than the decoder accepts.
    #[error("dimensions {width}x{height} exceed the limit of {max_pixels} pixels")]
    DimensionsTooLarge {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Configured pixel limit.
        max_pixels: u64,
    },

    /// A declared payload size does not fit in memory on this platform.
    #[error("payload size {0} is not addressable")]
    PayloadTooLarge(u64),

    /// The buffer ends before a header field or payload does.
    #[error("unexpected end of data: expected {expected} bytes, got {actual}")]
    UnexpectedEof {
        /// Expected number of bytes.
        expected: u64,
        /// Actual number of bytes available.
        actual: u64,
    },

    /// An I/O error occurred while reading the container.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for milimg operations.
pub type Result<T> = std::result::Result<T, MilimgError>;
