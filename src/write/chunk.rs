use std::io::{Seek, Write};

use super::file::TsFileIoWriter;
use super::page::PageWriter;
use crate::error::{Error, Result};
use crate::metadata::SensorDescriptor;
use crate::statistics::Statistics;
use crate::types::Value;

/// Buffers the pages of one sensor within the current row group.
///
/// A page is sealed into the chunk buffer when its memory estimate crosses
/// the configured threshold; the whole chunk is flushed when the enclosing
/// row group is sealed.
pub struct ChunkWriter {
    descriptor: SensorDescriptor,
    page_writer: PageWriter,
    page_buffer: Vec<u8>,
    num_pages: i32,
    total_value_count: i64,
    statistics: Statistics,
    last_timestamp: Option<i64>,
    page_size_threshold: usize,
}

impl ChunkWriter {
    pub fn try_new(descriptor: SensorDescriptor, page_size_threshold: usize) -> Result<Self> {
        let page_writer = PageWriter::try_new(descriptor.data_type(), descriptor.encoding())?;
        let statistics = Statistics::new(descriptor.data_type());
        Ok(Self {
            descriptor,
            page_writer,
            page_buffer: vec![],
            num_pages: 0,
            total_value_count: 0,
            statistics,
            last_timestamp: None,
            page_size_threshold,
        })
    }

    pub fn descriptor(&self) -> &SensorDescriptor {
        &self.descriptor
    }

    pub fn write(&mut self, timestamp: i64, value: &Value) -> Result<()> {
        if value.data_type() != self.descriptor.data_type() {
            return Err(Error::Corrupt(format!(
                "sensor {:?} expects {:?} values, received {:?}",
                self.descriptor.sensor_id(),
                self.descriptor.data_type(),
                value.data_type()
            )));
        }
        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                return Err(Error::Corrupt(format!(
                    "out-of-order timestamp {} after {} on sensor {:?}",
                    timestamp,
                    last,
                    self.descriptor.sensor_id()
                )));
            }
        }
        self.page_writer.write(timestamp, value)?;
        self.last_timestamp = Some(timestamp);
        if self.page_writer.estimate_max_mem_size() >= self.page_size_threshold {
            self.seal_page()?;
        }
        Ok(())
    }

    fn seal_page(&mut self) -> Result<()> {
        if self.page_writer.is_empty() {
            return Ok(());
        }
        let header = self
            .page_writer
            .seal_into(self.descriptor.compression(), &mut self.page_buffer)?;
        self.statistics.merge(&header.statistics)?;
        self.num_pages += 1;
        self.total_value_count += header.num_values as i64;
        Ok(())
    }

    /// Sealed pages plus whatever the open page would add.
    pub fn estimate_max_size(&self) -> usize {
        self.page_buffer.len() + self.page_writer.estimate_max_mem_size()
    }

    pub fn is_empty(&self) -> bool {
        self.num_pages == 0 && self.page_writer.is_empty()
    }

    /// Seals the open page and writes the chunk header followed by all page
    /// bytes through `io`. An empty chunk is rejected. Returns the chunk's
    /// total size in bytes.
    pub fn flush_to<W: Write + Seek>(&mut self, io: &mut TsFileIoWriter<W>) -> Result<i64> {
        self.seal_page()?;
        if self.num_pages == 0 {
            return Err(Error::NoDataToFlush);
        }
        let header_size = io.start_flush_chunk(
            &self.descriptor,
            &self.statistics,
            self.page_buffer.len(),
            self.num_pages,
        )?;
        io.write_bytes(&self.page_buffer)?;
        io.end_chunk(self.total_value_count)?;
        Ok(header_size as i64 + self.page_buffer.len() as i64)
    }
}
