//! Fixed-layout milimg header.
//!
//! Every container starts with a 28-byte header. All multi-byte integers are
//! big-endian.
//!
//! ```text
//! Offset  Size  Field
//! 0       8     magic: "Milimg00"
//! 8       4     version: 0 (opaque) or 1 (alpha payload present)
//! 12      4     width
//! 16      4     height
//! 20      8     color_payload_size
//! ```

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Buf;

use crate::error::FormatError;

/// Container signature: `"Milimg00"`.
pub const MAGIC: [u8; 8] = *b"Milimg00";

/// Returns `true` if `data` starts with the milimg signature.
pub fn is_milimg(data: &[u8]) -> bool {
    data.starts_with(&MAGIC)
}

/// Container version, which doubles as the alpha flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Color payload only; every pixel is fully opaque.
    Opaque,
    /// Color payload followed by a grayscale alpha payload.
    Alpha,
}

impl Version {
    /// Picks the version for an image with or without transparency.
    pub const fn from_alpha(has_alpha: bool) -> Self {
        if has_alpha { Self::Alpha } else { Self::Opaque }
    }

    /// Whether an alpha payload follows the color payload.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Alpha)
    }

    /// The on-disk value.
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Opaque => 0,
            Self::Alpha => 1,
        }
    }
}

impl TryFrom<u32> for Version {
    type Error = FormatError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Opaque),
            1 => Ok(Self::Alpha),
            other => Err(FormatError::UnsupportedVersion(other)),
        }
    }
}

impl From<Version> for u32 {
    fn from(value: Version) -> Self {
        value.to_u32()
    }
}

/// The fixed part of a milimg container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilimgHeader {
    /// Container version.
    pub version: Version,
    /// Image width in pixels. Never zero.
    pub width: u32,
    /// Image height in pixels. Never zero.
    pub height: u32,
    /// Length of the color payload that immediately follows the header.
    pub color_payload_size: u64,
}

impl MilimgHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 28;

    /// Whether the container carries an alpha payload.
    pub fn has_alpha(&self) -> bool {
        self.version.has_alpha()
    }

    /// Number of pixels described by the header.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Demuxes a header from the current cursor position.
    ///
    /// The signature is checked before the buffer length, so a buffer that
    /// does not start with `"Milimg00"` is always reported as
    /// [`FormatError::InvalidSignature`] once 8 bytes are available.
    pub fn demux<T: AsRef<[u8]>>(reader: &mut io::Cursor<T>) -> Result<Self, FormatError> {
        let available = reader.remaining();
        if available < MAGIC.len() {
            return Err(FormatError::UnexpectedEof {
                expected: Self::SIZE as u64,
                actual: available as u64,
            });
        }

        let mut signature = [0u8; 8];
        reader.read_exact(&mut signature)?;
        if signature != MAGIC {
            return Err(FormatError::InvalidSignature(signature));
        }

        if available < Self::SIZE {
            return Err(FormatError::UnexpectedEof {
                expected: Self::SIZE as u64,
                actual: available as u64,
            });
        }

        let version = Version::try_from(reader.read_u32::<BigEndian>()?)?;
        let width = reader.read_u32::<BigEndian>()?;
        let height = reader.read_u32::<BigEndian>()?;
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height });
        }

        let color_payload_size = reader.read_u64::<BigEndian>()?;

        Ok(MilimgHeader {
            version,
            width,
            height,
            color_payload_size,
        })
    }

    /// Muxes this header to the given writer.
    pub fn mux<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u32::<BigEndian>(self.version.to_u32())?;
        writer.write_u32::<BigEndian>(self.width)?;
        writer.write_u32::<BigEndian>(self.height)?;
        writer.write_u64::<BigEndian>(self.color_payload_size)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(coverage_nightly, test), coverage(off))]
mod tests {
    use super::*;

    fn header_bytes(version: u32, width: u32, height: u32, color_size: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"Milimg00");
        buf.extend_from_slice(&version.to_be_bytes());
        buf.extend_from_slice(&width.to_be_bytes());
        buf.extend_from_slice(&height.to_be_bytes());
        buf.extend_from_slice(&color_size.to_be_bytes());
        buf
    }

    #[test]
    fn test_header_demux() {
        let buf = header_bytes(1, 640, 480, 1234);
        let mut cursor = io::Cursor::new(buf.as_slice());
        let header = MilimgHeader::demux(&mut cursor).unwrap();
        insta::assert_debug_snapshot!(header, @r"
        MilimgHeader {
            version: Alpha,
            width: 640,
            height: 480,
            color_payload_size: 1234,
        }
        ");
        assert_eq!(cursor.position(), MilimgHeader::SIZE as u64);
        assert!(header.has_alpha());
        assert_eq!(header.pixel_count(), 640 * 480);
    }

    #[test]
    fn test_header_byte_layout() {
        let header = MilimgHeader {
            version: Version::Opaque,
            width: 2,
            height: 3,
            color_payload_size: 0x0102_0304_0506_0708,
        };
        let mut buf = Vec::new();
        header.mux(&mut buf).unwrap();
        assert_eq!(buf.len(), MilimgHeader::SIZE);

        assert_eq!(&buf[0..8], b"Milimg00");
        assert_eq!(&buf[8..12], &[0, 0, 0, 0]);
        assert_eq!(&buf[12..16], &[0, 0, 0, 2]);
        assert_eq!(&buf[16..20], &[0, 0, 0, 3]);
        assert_eq!(&buf[20..28], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_header_round_trip() {
        let header = MilimgHeader {
            version: Version::Alpha,
            width: 1920,
            height: 1080,
            color_payload_size: 42,
        };
        let mut buf = Vec::new();
        header.mux(&mut buf).unwrap();
        let parsed = MilimgHeader::demux(&mut io::Cursor::new(buf)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_invalid_signature() {
        let mut buf = header_bytes(0, 2, 2, 0);
        buf[..8].copy_from_slice(b"Milimg01");
        let err = MilimgHeader::demux(&mut io::Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSignature(sig) if &sig == b"Milimg01"));
    }

    #[test]
    fn test_header_invalid_signature_wins_over_length() {
        let err = MilimgHeader::demux(&mut io::Cursor::new(b"PNG\r\n\x1a\n\0")).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSignature(_)));
    }

    #[test]
    fn test_header_truncated() {
        let buf = header_bytes(0, 2, 2, 0);
        let err = MilimgHeader::demux(&mut io::Cursor::new(&buf[..20])).unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnexpectedEof {
                expected: 28,
                actual: 20
            }
        ));

        let err = MilimgHeader::demux(&mut io::Cursor::new(&buf[..3])).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { actual: 3, .. }));

        let err = MilimgHeader::demux(&mut io::Cursor::new(&[] as &[u8])).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { actual: 0, .. }));
    }

    #[test]
    fn test_header_unsupported_version() {
        let buf = header_bytes(2, 2, 2, 0);
        let err = MilimgHeader::demux(&mut io::Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_header_zero_dimensions() {
        let buf = header_bytes(0, 0, 16, 0);
        let err = MilimgHeader::demux(&mut io::Cursor::new(buf)).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidDimensions {
                width: 0,
                height: 16
            }
        ));

        let buf = header_bytes(0, 16, 0, 0);
        let err = MilimgHeader::demux(&mut io::Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, FormatError::InvalidDimensions { height: 0, .. }));
    }

    #[test]
    fn test_version_values() {
        assert_eq!(Version::try_from(0).unwrap(), Version::Opaque);
        assert_eq!(Version::try_from(1).unwrap(), Version::Alpha);
        assert!(Version::try_from(u32::MAX).is_err());
        assert_eq!(u32::from(Version::from_alpha(true)), 1);
        assert_eq!(u32::from(Version::from_alpha(false)), 0);
    }

    #[test]
    fn test_is_milimg() {
        assert!(is_milimg(b"Milimg00 and then some"));
        assert!(!is_milimg(b"Milimg0"));
        assert!(!is_milimg(b"\x89PNG\r\n\x1a\n"));
    }
}
