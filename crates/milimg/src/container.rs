//! Container framing: header, color payload and optional alpha payload.
//!
//! ```text
//! Offset                 Size                Field
//! 0                      28                  header (see `header`)
//! 28                     color_payload_size  color payload
//! 28 + color_size        8                   alpha_payload_size (version 1 only)
//! 36 + color_size        alpha_payload_size  alpha payload (version 1 only)
//! ```
//!
//! Bytes after the last payload are ignored.

use std::io::{self, Write};
use std::ops::Range;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::{Buf, Bytes};
use bytes_util::BytesCursorExt;

use crate::error::FormatError;
use crate::header::{MilimgHeader, Version};

/// Size of the length prefix in front of the alpha payload.
const ALPHA_SIZE_FIELD: usize = 8;

/// Location of a payload inside a container buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRange {
    /// Offset of the first payload byte from the start of the container.
    pub offset: u64,
    /// Payload length in bytes.
    pub len: u64,
}

impl PayloadRange {
    /// Offset one past the last payload byte.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }

    /// The payload as an index range into the container buffer.
    pub fn as_range(&self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }
}

/// Header-level description of a container, obtained without touching any
/// payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Container version.
    pub version: Version,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Where the color payload lives.
    pub color: PayloadRange,
    /// Where the alpha payload lives, for version 1 containers.
    pub alpha: Option<PayloadRange>,
}

impl ContainerInfo {
    /// Whether the container carries an alpha payload.
    pub fn has_alpha(&self) -> bool {
        self.version.has_alpha()
    }

    /// Number of bytes the container occupies, excluding trailing data.
    pub fn container_len(&self) -> u64 {
        self.alpha.map_or(self.color.end(), |alpha| alpha.end())
    }

    /// Demuxes the container structure from the current cursor position.
    ///
    /// Every declared payload size is checked against the bytes that are
    /// actually present, but the payloads themselves are skipped.
    pub fn demux<T: AsRef<[u8]>>(reader: &mut io::Cursor<T>) -> Result<Self, FormatError> {
        let header = MilimgHeader::demux(reader)?;
        let color = skip_payload(reader, header.color_payload_size)?;
        let alpha = if header.has_alpha() {
            let size = read_payload_size(reader)?;
            Some(skip_payload(reader, size)?)
        } else {
            None
        };

        Ok(ContainerInfo {
            version: header.version,
            width: header.width,
            height: header.height,
            color,
            alpha,
        })
    }
}

/// Parses the structure of a container buffer without decoding any payload.
pub fn parse_container_info(data: &[u8]) -> Result<ContainerInfo, FormatError> {
    ContainerInfo::demux(&mut io::Cursor::new(data))
}

/// A complete container with zero-copy payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilimgContainer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Compressed color bitstream.
    pub color: Bytes,
    /// Compressed grayscale alpha bitstream, if the image has transparency.
    pub alpha: Option<Bytes>,
}

impl MilimgContainer {
    /// The version implied by the presence of an alpha payload.
    pub fn version(&self) -> Version {
        Version::from_alpha(self.alpha.is_some())
    }

    /// The fixed header describing this container.
    pub fn header(&self) -> MilimgHeader {
        MilimgHeader {
            version: self.version(),
            width: self.width,
            height: self.height,
            color_payload_size: self.color.len() as u64,
        }
    }

    /// Number of bytes [`mux`](Self::mux) writes.
    pub fn encoded_len(&self) -> usize {
        let alpha = self
            .alpha
            .as_ref()
            .map_or(0, |alpha| ALPHA_SIZE_FIELD + alpha.len());
        MilimgHeader::SIZE + self.color.len() + alpha
    }

    /// Demuxes a container from a `Cursor<Bytes>`.
    ///
    /// Payloads are zero-copy slices of the cursor's buffer.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FormatError> {
        let header = MilimgHeader::demux(reader)?;
        let color = extract_payload(reader, header.color_payload_size)?;
        let alpha = if header.has_alpha() {
            let size = read_payload_size(reader)?;
            Some(extract_payload(reader, size)?)
        } else {
            None
        };

        Ok(MilimgContainer {
            width: header.width,
            height: header.height,
            color,
            alpha,
        })
    }

    /// Muxes this container to the given writer.
    pub fn mux<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.header().mux(writer)?;
        writer.write_all(&self.color)?;
        if let Some(alpha) = &self.alpha {
            writer.write_u64::<BigEndian>(alpha.len() as u64)?;
            writer.write_all(alpha)?;
        }
        Ok(())
    }
}

fn read_payload_size<T: AsRef<[u8]>>(reader: &mut io::Cursor<T>) -> Result<u64, FormatError> {
    let available = reader.remaining();
    if available < ALPHA_SIZE_FIELD {
        return Err(FormatError::UnexpectedEof {
            expected: ALPHA_SIZE_FIELD as u64,
            actual: available as u64,
        });
    }
    Ok(reader.read_u64::<BigEndian>()?)
}

fn skip_payload<T: AsRef<[u8]>>(
    reader: &mut io::Cursor<T>,
    size: u64,
) -> Result<PayloadRange, FormatError> {
    let available = reader.remaining() as u64;
    if size > available {
        return Err(FormatError::UnexpectedEof {
            expected: size,
            actual: available,
        });
    }

    let offset = reader.position();
    reader.advance(size as usize);
    Ok(PayloadRange { offset, len: size })
}

fn extract_payload(reader: &mut io::Cursor<Bytes>, size: u64) -> Result<Bytes, FormatError> {
    let len = usize::try_from(size).map_err(|_| FormatError::PayloadTooLarge(size))?;
    let available = reader.remaining() as u64;
    reader
        .extract_bytes(len)
        .map_err(|_| FormatError::UnexpectedEof {
            expected: size,
            actual: available,
        })
}
