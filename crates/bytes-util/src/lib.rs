//! Zero-copy helpers for reading [`Bytes`] through an [`io::Cursor`].
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

use std::io;

use bytes::Bytes;

/// Extension trait for `io::Cursor<Bytes>` that slices the underlying buffer
/// instead of copying out of it.
pub trait BytesCursorExt {
    /// Extracts `size` bytes from the cursor and advances it past them.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if fewer than `size` bytes
    /// remain. The cursor is not moved on failure.
    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes>;
}

impl BytesCursorExt for io::Cursor<Bytes> {
    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes> {
        let len = self.get_ref().len();
        let position = (self.position() as usize).min(len);
        let end = position
            .checked_add(size)
            .filter(|end| *end <= len)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("requested {size} bytes, {} remaining", len - position),
                )
            })?;

        self.set_position(end as u64);
        Ok(self.get_ref().slice(position..end))
    }
}

#[cfg(test)]
#[cfg_attr(all(coverage_nightly, test), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bytes() {
        let mut cursor = io::Cursor::new(Bytes::from_static(b"hello world"));
        let hello = cursor.extract_bytes(5).unwrap();
        assert_eq!(hello.as_ref(), b"hello");
        assert_eq!(cursor.position(), 5);

        let rest = cursor.extract_bytes(6).unwrap();
        assert_eq!(rest.as_ref(), b" world");
        assert_eq!(cursor.position(), 11);
        assert!(cursor.extract_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn test_extract_bytes_past_end() {
        let mut cursor = io::Cursor::new(Bytes::from_static(b"abc"));
        cursor.set_position(1);
        let err = cursor.extract_bytes(3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_extract_bytes_overflowing_size() {
        let mut cursor = io::Cursor::new(Bytes::from_static(b"abc"));
        cursor.set_position(1);
        assert!(cursor.extract_bytes(usize::MAX).is_err());
    }
}
