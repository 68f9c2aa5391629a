use std::convert::TryFrom;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::compression::Compression;
use crate::encoding::{self, Encoding};
use crate::error::{Error, Result};
use crate::io::{read_varint_string, write_varint_string};
use crate::types::DataType;

/// How one sensor's values are typed, encoded and compressed.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
    sensor_id: String,
    data_type: DataType,
    encoding: Encoding,
    compression: Compression,
}

impl SensorDescriptor {
    /// Fails when no codec exists for the (encoding, data type) pair.
    pub fn new(
        sensor_id: impl Into<String>,
        data_type: DataType,
        encoding: Encoding,
        compression: Compression,
    ) -> Result<Self> {
        if !encoding::supports(encoding, data_type) {
            return Err(Error::UnknownEncoding(i16::from(encoding)));
        }
        Ok(Self {
            sensor_id: sensor_id.into(),
            data_type,
            encoding,
            compression,
        })
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        write_varint_string(&self.sensor_id, out);
        out.extend_from_slice(&i16::from(self.data_type).to_be_bytes());
        out.extend_from_slice(&i16::from(self.encoding).to_be_bytes());
        out.extend_from_slice(&i16::from(self.compression).to_be_bytes());
    }

    pub(crate) fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let sensor_id = read_varint_string(reader)?;
        let data_type = DataType::try_from(reader.read_i16::<BigEndian>()?)?;
        let encoding = Encoding::try_from(reader.read_i16::<BigEndian>()?)?;
        let compression = Compression::try_from(reader.read_i16::<BigEndian>()?)?;
        SensorDescriptor::new(sensor_id, data_type, encoding, compression)
    }
}

/// The registered sensors of a file, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    sensors: Vec<SensorDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sensor, replacing a previous descriptor with the same id.
    pub fn register(&mut self, descriptor: SensorDescriptor) {
        if let Some(existing) = self
            .sensors
            .iter_mut()
            .find(|d| d.sensor_id == descriptor.sensor_id)
        {
            *existing = descriptor;
        } else {
            self.sensors.push(descriptor);
        }
    }

    pub fn get(&self, sensor_id: &str) -> Option<&SensorDescriptor> {
        self.sensors.iter().find(|d| d.sensor_id == sensor_id)
    }

    pub fn sensors(&self) -> &[SensorDescriptor] {
        &self.sensors
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.sensors.len() as i32).to_be_bytes());
        for sensor in &self.sensors {
            sensor.serialize(out);
        }
    }

    pub(crate) fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_i32::<BigEndian>()?;
        if count < 0 {
            return Err(Error::Corrupt(format!("negative schema count {}", count)));
        }
        let mut sensors = Vec::with_capacity(count as usize);
        for _ in 0..count {
            sensors.push(SensorDescriptor::deserialize(reader)?);
        }
        Ok(Self { sensors })
    }
}
