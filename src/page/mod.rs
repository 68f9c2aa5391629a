//! Page framing: the smallest self-describing unit of encoded values.

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::Result;
use crate::statistics::Statistics;
use crate::types::DataType;

/// Header preceding every page payload.
///
/// ```text
/// page_hdr := uncompressed:i32 compressed:i32 num_values:i32
///             max_ts:i64 min_ts:i64 statistics<data_type>
/// ```
///
/// No encoding or data type is stored here; both are inherited from the
/// enclosing chunk header and must be supplied to [`PageHeader::deserialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub uncompressed_size: i32,
    pub compressed_size: i32,
    pub num_values: i32,
    pub max_timestamp: i64,
    pub min_timestamp: i64,
    pub statistics: Statistics,
}

impl PageHeader {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.uncompressed_size.to_be_bytes());
        out.extend_from_slice(&self.compressed_size.to_be_bytes());
        out.extend_from_slice(&self.num_values.to_be_bytes());
        out.extend_from_slice(&self.max_timestamp.to_be_bytes());
        out.extend_from_slice(&self.min_timestamp.to_be_bytes());
        self.statistics.serialize(out);
    }

    pub fn deserialize<R: Read>(reader: &mut R, data_type: DataType) -> Result<Self> {
        let uncompressed_size = reader.read_i32::<BigEndian>()?;
        let compressed_size = reader.read_i32::<BigEndian>()?;
        let num_values = reader.read_i32::<BigEndian>()?;
        let max_timestamp = reader.read_i64::<BigEndian>()?;
        let min_timestamp = reader.read_i64::<BigEndian>()?;
        let statistics = Statistics::deserialize(reader, data_type)?;
        Ok(Self {
            uncompressed_size,
            compressed_size,
            num_values,
            max_timestamp,
            min_timestamp,
            statistics,
        })
    }

    pub fn serialized_size(&self) -> usize {
        4 + 4 + 4 + 8 + 8 + self.statistics.serialized_size()
    }
}
