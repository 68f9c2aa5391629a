//! File-structure constants and the row-group / chunk header grammars.
//!
//! ```text
//! rowgroup_hdr := 0x00 device_id:string data_size:i64 num_chunks:i32
//! chunk_hdr    := 0x01 sensor:string data_size:i32 data_type:i16
//!                 num_pages:i32 compression:i16 encoding:i16 max_tombstone:i64
//! ```

use std::convert::TryFrom;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::io::{read_varint_string, varint_string_len, write_varint_string};
use crate::types::DataType;

/// The 6-byte signature at both ends of every file.
pub const MAGIC: [u8; 6] = *b"TsFile";

/// The version byte immediately after the leading magic.
pub const VERSION: u8 = 1;

/// Version number recorded in the footer.
pub const FOOTER_VERSION: i32 = 1;

/// Bytes occupied by the trailing footer length plus the tail magic.
pub const FOOTER_SIZE: u64 = 4 + MAGIC.len() as u64;

pub const ROW_GROUP_MARKER: u8 = 0x00;
pub const CHUNK_MARKER: u8 = 0x01;

/// Header opening the region of one device's chunks. `data_size` covers the
/// chunk bytes that follow the header and is backpatched when the group is
/// sealed.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupHeader {
    pub device_id: String,
    pub data_size: i64,
    pub num_chunks: i32,
}

impl RowGroupHeader {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.push(ROW_GROUP_MARKER);
        write_varint_string(&self.device_id, out);
        out.extend_from_slice(&self.data_size.to_be_bytes());
        out.extend_from_slice(&self.num_chunks.to_be_bytes());
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let marker = reader.read_u8()?;
        if marker != ROW_GROUP_MARKER {
            return Err(Error::Corrupt(format!(
                "expected row group marker {:#04x}, found {:#04x}",
                ROW_GROUP_MARKER, marker
            )));
        }
        let device_id = read_varint_string(reader)?;
        let data_size = reader.read_i64::<BigEndian>()?;
        let num_chunks = reader.read_i32::<BigEndian>()?;
        Ok(Self {
            device_id,
            data_size,
            num_chunks,
        })
    }

    pub fn serialized_size(&self) -> usize {
        1 + varint_string_len(&self.device_id) + 8 + 4
    }

    /// Offset of the `data_size` field relative to the header start, for the
    /// writer's backpatch.
    pub fn data_size_offset(&self) -> usize {
        1 + varint_string_len(&self.device_id)
    }
}

/// Header opening the pages of one sensor. `data_size` covers the page bytes
/// that follow the header.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHeader {
    pub sensor_id: String,
    pub data_size: i32,
    pub data_type: DataType,
    pub num_pages: i32,
    pub compression: Compression,
    pub encoding: Encoding,
    /// Tombstones are out of scope; carried for format compatibility,
    /// always written 0.
    pub max_tombstone: i64,
}

impl ChunkHeader {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.push(CHUNK_MARKER);
        write_varint_string(&self.sensor_id, out);
        out.extend_from_slice(&self.data_size.to_be_bytes());
        out.extend_from_slice(&i16::from(self.data_type).to_be_bytes());
        out.extend_from_slice(&self.num_pages.to_be_bytes());
        out.extend_from_slice(&i16::from(self.compression).to_be_bytes());
        out.extend_from_slice(&i16::from(self.encoding).to_be_bytes());
        out.extend_from_slice(&self.max_tombstone.to_be_bytes());
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let marker = reader.read_u8()?;
        if marker != CHUNK_MARKER {
            return Err(Error::Corrupt(format!(
                "expected chunk marker {:#04x}, found {:#04x}",
                CHUNK_MARKER, marker
            )));
        }
        let sensor_id = read_varint_string(reader)?;
        let data_size = reader.read_i32::<BigEndian>()?;
        let data_type = DataType::try_from(reader.read_i16::<BigEndian>()?)?;
        let num_pages = reader.read_i32::<BigEndian>()?;
        let compression = Compression::try_from(reader.read_i16::<BigEndian>()?)?;
        let encoding = Encoding::try_from(reader.read_i16::<BigEndian>()?)?;
        let max_tombstone = reader.read_i64::<BigEndian>()?;
        Ok(Self {
            sensor_id,
            data_size,
            data_type,
            num_pages,
            compression,
            encoding,
            max_tombstone,
        })
    }

    pub fn serialized_size(&self) -> usize {
        1 + varint_string_len(&self.sensor_id) + 4 + 2 + 4 + 2 + 2 + 8
    }
}
