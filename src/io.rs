//! Byte-level helpers shared by the reader and writer paths.
//!
//! Fixed-width scalars go through `byteorder` in BigEndian; strings are
//! varint-length-prefixed UTF-8 unless a header slot documents the fixed
//! 4-byte prefix, which [`read_string_binary`] / [`write_string_binary`]
//! implement.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::encoding::varint;
use crate::error::{Error, Result};

/// A reader that tracks its absolute position in the underlying stream.
#[derive(Debug)]
pub struct PositionedReader<R> {
    inner: R,
    position: u64,
}

impl<R> PositionedReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Absolute position of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for PositionedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.position += read as u64;
        Ok(read)
    }
}

impl<R: Seek> Seek for PositionedReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let position = self.inner.seek(pos)?;
        self.position = position;
        Ok(position)
    }
}

// see (unstable) Seek::stream_len
pub fn stream_len(seek: &mut impl Seek) -> std::result::Result<u64, std::io::Error> {
    let old_pos = seek.seek(SeekFrom::Current(0))?;
    let len = seek.seek(SeekFrom::End(0))?;

    if old_pos != len {
        seek.seek(SeekFrom::Start(old_pos))?;
    }

    Ok(len)
}

/// Reads exactly `length` UTF-8 bytes.
pub fn read_string<R: Read>(reader: &mut R, length: usize) -> Result<String> {
    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Corrupt(format!("string is not UTF-8: {}", e)))
}

/// Reads a varint length followed by that many UTF-8 bytes.
pub fn read_varint_string<R: Read>(reader: &mut R) -> Result<String> {
    let length = varint::read_u32(reader)? as usize;
    read_string(reader, length)
}

pub fn write_varint_string(value: &str, out: &mut Vec<u8>) {
    varint::write_u32(value.len() as u32, out);
    out.extend_from_slice(value.as_bytes());
}

/// Serialized length of `value` as written by [`write_varint_string`].
pub fn varint_string_len(value: &str) -> usize {
    varint::length_u32(value.len() as u32) + value.len()
}

/// Reads a 4-byte BigEndian length followed by that many bytes.
pub fn read_string_binary<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let length = reader.read_i32::<BigEndian>()?;
    if length < 0 {
        return Err(Error::Corrupt(format!("negative binary length {}", length)));
    }
    let mut buffer = vec![0u8; length as usize];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

pub fn write_string_binary(value: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(value.len() as i32).to_be_bytes());
    out.extend_from_slice(value);
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn position_tracks_reads_and_seeks() {
        let mut reader = PositionedReader::new(Cursor::new(vec![0u8; 16]));
        let mut buffer = [0u8; 5];
        reader.read_exact(&mut buffer).unwrap();
        assert_eq!(reader.position(), 5);
        reader.seek(SeekFrom::Start(12)).unwrap();
        assert_eq!(reader.position(), 12);
        reader.read_exact(&mut buffer[..2]).unwrap();
        assert_eq!(reader.position(), 14);
    }

    #[test]
    fn strings_roundtrip() {
        let mut out = vec![];
        write_varint_string("device.turbine.1", &mut out);
        assert_eq!(out.len(), varint_string_len("device.turbine.1"));
        let mut reader = out.as_slice();
        assert_eq!(read_varint_string(&mut reader).unwrap(), "device.turbine.1");

        let mut out = vec![];
        write_string_binary(b"\x00\x01\x02", &mut out);
        assert_eq!(out[..4], [0, 0, 0, 3]);
        let mut reader = out.as_slice();
        assert_eq!(read_string_binary(&mut reader).unwrap(), b"\x00\x01\x02");
    }

    #[test]
    fn short_string_is_eof() {
        let mut out = vec![];
        write_varint_string("abcdef", &mut out);
        out.truncate(4);
        assert!(matches!(
            read_varint_string(&mut out.as_slice()),
            Err(Error::UnexpectedEof(_))
        ));
    }
}
