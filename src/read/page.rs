use std::io::Cursor;

use crate::encoding::{self, varint, Decoder, Encoding};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

/// Iterates the `(timestamp, value)` pairs of one decompressed page payload.
///
/// The payload is split at its `time_len:varint` prefix into the time and
/// value regions; each region gets its own decoder instance. The time column
/// is PLAIN/INT64 unless the caller says otherwise.
pub struct PageReader {
    time_decoder: Box<dyn Decoder>,
    value_decoder: Box<dyn Decoder>,
}

impl PageReader {
    pub fn new(payload: Vec<u8>, data_type: DataType, encoding: Encoding) -> Result<Self> {
        Self::with_time_encoding(payload, data_type, encoding, Encoding::Plain)
    }

    pub fn with_time_encoding(
        payload: Vec<u8>,
        data_type: DataType,
        encoding: Encoding,
        time_encoding: Encoding,
    ) -> Result<Self> {
        let mut cursor = Cursor::new(payload);
        let time_length = varint::read_u32(&mut cursor)? as usize;
        let split = cursor.position() as usize;
        let payload = cursor.into_inner();
        if split + time_length > payload.len() {
            return Err(Error::TruncatedPage(format!(
                "time region of {} bytes exceeds the {}-byte payload",
                time_length,
                payload.len() - split
            )));
        }
        let time_bytes = payload[split..split + time_length].to_vec();
        let value_bytes = payload[split + time_length..].to_vec();
        Ok(Self {
            time_decoder: encoding::new_decoder(time_encoding, DataType::Int64, time_bytes)?,
            value_decoder: encoding::new_decoder(encoding, data_type, value_bytes)?,
        })
    }

    /// True while both columns have values; a one-sided leftover is a
    /// truncated page.
    pub fn has_next(&mut self) -> Result<bool> {
        let times = self.time_decoder.has_next()?;
        let values = self.value_decoder.has_next()?;
        if times != values {
            return Err(Error::TruncatedPage(format!(
                "time column {} while value column {}",
                if times { "continues" } else { "is exhausted" },
                if values { "continues" } else { "is exhausted" },
            )));
        }
        Ok(times)
    }

    pub fn next(&mut self) -> Result<(i64, Value)> {
        let timestamp = match self.time_decoder.next()? {
            Value::Int64(timestamp) => timestamp,
            other => {
                return Err(Error::Corrupt(format!(
                    "time decoder produced a {:?} value",
                    other.data_type()
                )))
            }
        };
        let value = self.value_decoder.next()?;
        Ok((timestamp, value))
    }
}
