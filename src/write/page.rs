use crate::compression::{self, Compression};
use crate::encoding::{self, varint, Encoder, Encoding};
use crate::error::{Error, Result};
use crate::page::PageHeader;
use crate::statistics::Statistics;
use crate::types::{DataType, Value};

/// Accumulates one page's time and value columns through the chunk's
/// encoders, tracking statistics as values arrive.
///
/// The writer exclusively owns its buffers and its statistics accumulator;
/// sealing moves the framed page into the chunk's page buffer.
pub struct PageWriter {
    data_type: DataType,
    encoding: Encoding,
    time_encoder: Box<dyn Encoder>,
    value_encoder: Box<dyn Encoder>,
    time_buffer: Vec<u8>,
    value_buffer: Vec<u8>,
    statistics: Statistics,
    value_count: usize,
    min_timestamp: Option<i64>,
    max_timestamp: i64,
}

impl PageWriter {
    pub fn try_new(data_type: DataType, encoding: Encoding) -> Result<Self> {
        Ok(Self {
            data_type,
            encoding,
            time_encoder: encoding::new_encoder(Encoding::Plain, DataType::Int64)?,
            value_encoder: encoding::new_encoder(encoding, data_type)?,
            time_buffer: vec![],
            value_buffer: vec![],
            statistics: Statistics::new(data_type),
            value_count: 0,
            min_timestamp: None,
            max_timestamp: 0,
        })
    }

    pub fn write(&mut self, timestamp: i64, value: &Value) -> Result<()> {
        self.time_encoder
            .encode(&Value::Int64(timestamp), &mut self.time_buffer)?;
        self.value_encoder.encode(value, &mut self.value_buffer)?;
        self.statistics.update(value)?;
        if self.min_timestamp.is_none() {
            self.min_timestamp = Some(timestamp);
        }
        self.max_timestamp = timestamp;
        self.value_count += 1;
        Ok(())
    }

    /// Seals the page: flushes both encoders, frames the payload as
    /// `time_len:varint time_bytes value_bytes`, compresses it, and emits
    /// `PageHeader` plus payload into `out`. Returns the header and leaves
    /// the writer reset for the next page.
    pub fn seal_into(&mut self, compression: Compression, out: &mut Vec<u8>) -> Result<PageHeader> {
        let min_timestamp = self.min_timestamp.ok_or(Error::NoDataToFlush)?;

        self.time_encoder.flush(&mut self.time_buffer)?;
        self.value_encoder.flush(&mut self.value_buffer)?;

        let mut payload =
            Vec::with_capacity(5 + self.time_buffer.len() + self.value_buffer.len());
        varint::write_u32(self.time_buffer.len() as u32, &mut payload);
        payload.extend_from_slice(&self.time_buffer);
        payload.extend_from_slice(&self.value_buffer);

        let uncompressed_size = payload.len() as i32;
        let compressed = compression::compress(compression, payload)?;

        let header = PageHeader {
            uncompressed_size,
            compressed_size: compressed.len() as i32,
            num_values: self.value_count as i32,
            max_timestamp: self.max_timestamp,
            min_timestamp,
            statistics: self.statistics.clone(),
        };
        header.serialize(out);
        out.extend_from_slice(&compressed);

        self.reset()?;
        Ok(header)
    }

    /// Clears buffers and statistics and drops the unset-min sentinel; the
    /// encoders are replaced so no buffered window survives.
    pub fn reset(&mut self) -> Result<()> {
        self.time_buffer.clear();
        self.value_buffer.clear();
        self.time_encoder = encoding::new_encoder(Encoding::Plain, DataType::Int64)?;
        self.value_encoder = encoding::new_encoder(self.encoding, self.data_type)?;
        self.statistics = Statistics::new(self.data_type);
        self.value_count = 0;
        self.min_timestamp = None;
        self.max_timestamp = 0;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.min_timestamp.is_none()
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    /// Bytes already encoded into the column buffers.
    pub fn current_data_size(&self) -> usize {
        self.time_buffer.len() + self.value_buffer.len()
    }

    /// Upper-bound memory estimate for the flush policy: encoded bytes,
    /// bytes still buffered inside the encoders, and the header.
    pub fn estimate_max_mem_size(&self) -> usize {
        self.current_data_size()
            + self.time_encoder.estimated_size()
            + self.value_encoder.estimated_size()
            + 28
            + self.statistics.serialized_size()
    }
}
