use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::io::{
    read_string_binary, read_varint_string, varint_string_len, write_string_binary,
    write_varint_string,
};
use crate::statistics::Statistics;
use crate::types::DataType;

/// Named per-chunk summaries attached to chunk metadata. Built once from the
/// sealed chunk statistics; serialization is pure and repeatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsDigest {
    entries: BTreeMap<String, Vec<u8>>,
}

impl TsDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard digest of a sealed chunk: `min`, `max`, `first`, `last`
    /// and, for numeric types, `sum`.
    pub fn from_statistics(statistics: &Statistics) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("min".to_string(), statistics.min_bytes());
        entries.insert("max".to_string(), statistics.max_bytes());
        entries.insert("first".to_string(), statistics.first_bytes());
        entries.insert("last".to_string(), statistics.last_bytes());
        if let Some(sum) = statistics.sum_bytes() {
            entries.insert("sum".to_string(), sum);
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as i32).to_be_bytes());
        for (key, value) in &self.entries {
            write_varint_string(key, out);
            write_string_binary(value, out);
        }
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_i32::<BigEndian>()?;
        if count < 0 {
            return Err(Error::Corrupt(format!("negative digest count {}", count)));
        }
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = read_varint_string(reader)?;
            let value = read_string_binary(reader)?;
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    pub fn serialized_size(&self) -> usize {
        4 + self
            .entries
            .iter()
            .map(|(k, v)| varint_string_len(k) + 4 + v.len())
            .sum::<usize>()
    }
}

/// Footer entry locating one chunk and summarizing its content.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMetadata {
    pub sensor_id: String,
    /// Absolute file offset of the chunk header's marker byte.
    pub file_offset: i64,
    /// Header plus page bytes.
    pub total_size: i64,
    pub data_type: DataType,
    pub num_points: i64,
    pub digest: TsDigest,
}

impl ChunkMetadata {
    pub fn serialize(&self, out: &mut Vec<u8>) {
        write_varint_string(&self.sensor_id, out);
        out.extend_from_slice(&self.file_offset.to_be_bytes());
        out.extend_from_slice(&self.total_size.to_be_bytes());
        out.extend_from_slice(&i16::from(self.data_type).to_be_bytes());
        out.extend_from_slice(&self.num_points.to_be_bytes());
        self.digest.serialize(out);
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let sensor_id = read_varint_string(reader)?;
        let file_offset = reader.read_i64::<BigEndian>()?;
        let total_size = reader.read_i64::<BigEndian>()?;
        let data_type = DataType::try_from(reader.read_i16::<BigEndian>()?)?;
        let num_points = reader.read_i64::<BigEndian>()?;
        let digest = TsDigest::deserialize(reader)?;
        Ok(Self {
            sensor_id,
            file_offset,
            total_size,
            data_type,
            num_points,
            digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn digest_from_statistics_is_repeatable() {
        let mut statistics = Statistics::new(DataType::Int32);
        statistics.update(&Value::Int32(10)).unwrap();
        statistics.update(&Value::Int32(30)).unwrap();

        let digest = TsDigest::from_statistics(&statistics);
        assert_eq!(digest.len(), 5);
        assert_eq!(digest.get("min"), Some(&10i32.to_be_bytes()[..]));
        assert_eq!(digest.get("sum"), Some(&40f64.to_be_bytes()[..]));

        let mut first = vec![];
        digest.serialize(&mut first);
        let mut second = vec![];
        digest.serialize(&mut second);
        assert_eq!(first, second);
        assert_eq!(first.len(), digest.serialized_size());

        let back = TsDigest::deserialize(&mut first.as_slice()).unwrap();
        assert_eq!(back, digest);
    }

    #[test]
    fn boolean_digest_has_no_sum() {
        let mut statistics = Statistics::new(DataType::Boolean);
        statistics.update(&Value::Boolean(true)).unwrap();
        let digest = TsDigest::from_statistics(&statistics);
        assert_eq!(digest.len(), 4);
        assert!(digest.get("sum").is_none());
    }

    #[test]
    fn chunk_metadata_roundtrip() {
        let mut statistics = Statistics::new(DataType::Int64);
        statistics.update(&Value::Int64(5)).unwrap();
        let meta = ChunkMetadata {
            sensor_id: "s1".to_string(),
            file_offset: 7,
            total_size: 321,
            data_type: DataType::Int64,
            num_points: 1,
            digest: TsDigest::from_statistics(&statistics),
        };
        let mut out = vec![];
        meta.serialize(&mut out);
        let back = ChunkMetadata::deserialize(&mut out.as_slice()).unwrap();
        assert_eq!(back, meta);
    }
}
