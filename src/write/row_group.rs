use std::io::{Seek, Write};

use super::chunk::ChunkWriter;
use super::file::TsFileIoWriter;
use super::DataPoint;
use crate::error::{Error, Result};
use crate::metadata::Schema;

/// Owns the sensor → ChunkWriter map of one device, in write order.
///
/// Chunk writers are created lazily from the registered schema; a point for
/// an unregistered sensor fails the write.
pub struct ChunkGroupWriter {
    device_id: String,
    chunk_writers: Vec<(String, ChunkWriter)>,
    page_size_threshold: usize,
}

impl ChunkGroupWriter {
    pub fn new(device_id: impl Into<String>, page_size_threshold: usize) -> Self {
        Self {
            device_id: device_id.into(),
            chunk_writers: vec![],
            page_size_threshold,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn write(&mut self, point: &DataPoint, schema: &Schema) -> Result<()> {
        let writer = match self
            .chunk_writers
            .iter_mut()
            .position(|(sensor, _)| sensor == &point.sensor_id)
        {
            Some(at) => &mut self.chunk_writers[at].1,
            None => {
                let descriptor = schema
                    .get(&point.sensor_id)
                    .ok_or_else(|| Error::UnknownSensor(point.sensor_id.clone()))?;
                let writer = ChunkWriter::try_new(descriptor.clone(), self.page_size_threshold)?;
                self.chunk_writers.push((point.sensor_id.clone(), writer));
                let at = self.chunk_writers.len() - 1;
                &mut self.chunk_writers[at].1
            }
        };
        writer.write(point.timestamp, &point.value)
    }

    /// Summed memory estimate of every open chunk.
    pub fn estimate_max_size(&self) -> usize {
        self.chunk_writers
            .iter()
            .map(|(_, writer)| writer.estimate_max_size())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_writers.iter().all(|(_, w)| w.is_empty())
    }

    /// Seals every non-empty chunk into one row group in write order and
    /// clears the group for the next flush.
    pub fn flush_to<W: Write + Seek>(&mut self, io: &mut TsFileIoWriter<W>) -> Result<()> {
        let num_chunks = self
            .chunk_writers
            .iter()
            .filter(|(_, writer)| !writer.is_empty())
            .count();
        io.start_row_group(&self.device_id, num_chunks as i32)?;
        for (_, writer) in &mut self.chunk_writers {
            if writer.is_empty() {
                continue;
            }
            writer.flush_to(io)?;
        }
        io.end_row_group()?;
        self.chunk_writers.clear();
        Ok(())
    }
}
