use std::collections::BTreeMap;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use super::{ChunkMetadata, RowGroupMetadata, Schema};
use crate::error::{Error, Result};
use crate::io::{read_varint_string, write_varint_string};

/// The footer: sensor schema, device → sensor → chunk-metadata index and the
/// format version. Serialized exactly once, immediately before the trailing
/// length and magic.
///
/// ```text
/// footer_metadata := schema_list device_index tsfile_version:i32
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    version: i32,
    schema: Schema,
    device_index: BTreeMap<String, BTreeMap<String, Vec<ChunkMetadata>>>,
}

impl FileMetadata {
    pub fn new(version: i32, schema: Schema, row_groups: Vec<RowGroupMetadata>) -> Self {
        let mut device_index: BTreeMap<String, BTreeMap<String, Vec<ChunkMetadata>>> =
            BTreeMap::new();
        for group in row_groups {
            let (device_id, chunks) = group.into_parts();
            let sensors = device_index.entry(device_id).or_default();
            for chunk in chunks {
                sensors.entry(chunk.sensor_id.clone()).or_default().push(chunk);
            }
        }
        Self {
            version,
            schema,
            device_index,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.device_index.keys().map(|k| k.as_str())
    }

    pub fn sensors_of(&self, device_id: &str) -> Option<impl Iterator<Item = &str>> {
        self.device_index
            .get(device_id)
            .map(|sensors| sensors.keys().map(|k| k.as_str()))
    }

    /// All chunk metadata of one (device, sensor), in write order.
    pub fn chunks_of(&self, device_id: &str, sensor_id: &str) -> Option<&[ChunkMetadata]> {
        self.device_index
            .get(device_id)
            .and_then(|sensors| sensors.get(sensor_id))
            .map(|chunks| chunks.as_slice())
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        self.schema.serialize(out);
        out.extend_from_slice(&(self.device_index.len() as i32).to_be_bytes());
        for (device_id, sensors) in &self.device_index {
            write_varint_string(device_id, out);
            out.extend_from_slice(&(sensors.len() as i32).to_be_bytes());
            for (sensor_id, chunks) in sensors {
                write_varint_string(sensor_id, out);
                out.extend_from_slice(&(chunks.len() as i32).to_be_bytes());
                for chunk in chunks {
                    chunk.serialize(out);
                }
            }
        }
        out.extend_from_slice(&self.version.to_be_bytes());
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let schema = Schema::deserialize(reader)?;

        let device_count = reader.read_i32::<BigEndian>()?;
        if device_count < 0 {
            return Err(Error::Corrupt(format!(
                "negative device count {}",
                device_count
            )));
        }
        let mut device_index = BTreeMap::new();
        for _ in 0..device_count {
            let device_id = read_varint_string(reader)?;
            let sensor_count = reader.read_i32::<BigEndian>()?;
            if sensor_count < 0 {
                return Err(Error::Corrupt(format!(
                    "negative sensor count {}",
                    sensor_count
                )));
            }
            let mut sensors = BTreeMap::new();
            for _ in 0..sensor_count {
                let sensor_id = read_varint_string(reader)?;
                let chunk_count = reader.read_i32::<BigEndian>()?;
                if chunk_count < 0 {
                    return Err(Error::Corrupt(format!(
                        "negative chunk count {}",
                        chunk_count
                    )));
                }
                let mut chunks = Vec::with_capacity(chunk_count as usize);
                for _ in 0..chunk_count {
                    chunks.push(ChunkMetadata::deserialize(reader)?);
                }
                sensors.insert(sensor_id, chunks);
            }
            device_index.insert(device_id, sensors);
        }

        let version = reader.read_i32::<BigEndian>()?;
        Ok(Self {
            version,
            schema,
            device_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;
    use crate::encoding::Encoding;
    use crate::metadata::{SensorDescriptor, TsDigest};
    use crate::types::DataType;

    fn chunk(sensor: &str, offset: i64) -> ChunkMetadata {
        ChunkMetadata {
            sensor_id: sensor.to_string(),
            file_offset: offset,
            total_size: 10,
            data_type: DataType::Int32,
            num_points: 3,
            digest: TsDigest::new(),
        }
    }

    #[test]
    fn index_groups_chunks_by_device_and_sensor() {
        let mut schema = Schema::new();
        schema.register(
            SensorDescriptor::new(
                "s1",
                DataType::Int32,
                Encoding::Plain,
                Compression::Uncompressed,
            )
            .unwrap(),
        );

        let groups = vec![
            RowGroupMetadata::new("d1".to_string(), vec![chunk("s1", 7), chunk("s2", 60)]),
            RowGroupMetadata::new("d1".to_string(), vec![chunk("s1", 120)]),
            RowGroupMetadata::new("d2".to_string(), vec![chunk("s1", 200)]),
        ];
        let metadata = FileMetadata::new(1, schema, groups);

        assert_eq!(metadata.devices().collect::<Vec<_>>(), vec!["d1", "d2"]);
        let chunks = metadata.chunks_of("d1", "s1").unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].file_offset, 7);
        assert_eq!(chunks[1].file_offset, 120);
        assert!(metadata.chunks_of("d3", "s1").is_none());

        let mut out = vec![];
        metadata.serialize(&mut out);
        let back = FileMetadata::deserialize(&mut out.as_slice()).unwrap();
        assert_eq!(back, metadata);
    }
}
