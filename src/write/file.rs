use std::io::{Seek, SeekFrom, Write};

use log::error;

use crate::error::{Error, Result};
use crate::format::{ChunkHeader, RowGroupHeader, FOOTER_VERSION, MAGIC, VERSION};
use crate::metadata::{
    ChunkMetadata, FileMetadata, RowGroupMetadata, Schema, SensorDescriptor, TsDigest,
};
use crate::statistics::Statistics;
use crate::types::DataType;

struct CurrentChunk {
    offset: u64,
    sensor_id: String,
    data_type: DataType,
    statistics: Statistics,
}

struct CurrentRowGroup {
    device_id: String,
    data_size_field_offset: u64,
    data_start: u64,
    chunks: Vec<ChunkMetadata>,
    current_chunk: Option<CurrentChunk>,
}

/// The low-level append-only writer.
///
/// Construction writes the leading magic and version byte. `start_row_group`
/// / `start_flush_chunk` / `write_bytes` / `end_chunk` / `end_row_group`
/// drive the layout; `close` serializes the footer, its 4-byte length and
/// the trailing magic. Every write appends; the single exception is the
/// backpatch of a row group header's `data_size` in `end_row_group`.
///
/// The first error poisons the writer: all subsequent calls return a clone
/// of it.
pub struct TsFileIoWriter<W: Write + Seek> {
    writer: W,
    offset: u64,
    schema: Schema,
    row_groups: Vec<RowGroupMetadata>,
    current_group: Option<CurrentRowGroup>,
    poisoned: Option<Error>,
}

impl<W: Write + Seek> TsFileIoWriter<W> {
    pub fn try_new(writer: W, schema: Schema) -> Result<Self> {
        let mut io = Self {
            writer,
            offset: 0,
            schema,
            row_groups: vec![],
            current_group: None,
            poisoned: None,
        };
        io.emit(&MAGIC)?;
        io.emit(&[VERSION])?;
        Ok(io)
    }

    /// Absolute offset of the next appended byte.
    pub fn pos(&self) -> u64 {
        self.offset
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    fn run<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if let Some(error) = &self.poisoned {
            return Err(error.clone());
        }
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("tsfile writer poisoned: {}", e);
                self.poisoned = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Opens a row group: emits its header with a placeholder `data_size`
    /// and remembers the offset for the backpatch.
    pub fn start_row_group(&mut self, device_id: &str, num_chunks: i32) -> Result<()> {
        self.run(|io| {
            if io.current_group.is_some() {
                return Err(Error::Corrupt(
                    "row group started while another is open".to_string(),
                ));
            }
            let header = RowGroupHeader {
                device_id: device_id.to_string(),
                data_size: 0,
                num_chunks,
            };
            let header_offset = io.offset;
            let mut buffer = vec![];
            header.serialize(&mut buffer);
            io.emit(&buffer)?;
            io.current_group = Some(CurrentRowGroup {
                device_id: device_id.to_string(),
                data_size_field_offset: header_offset + header.data_size_offset() as u64,
                data_start: io.offset,
                chunks: vec![],
                current_chunk: None,
            });
            Ok(())
        })
    }

    /// Emits a chunk header and returns its byte size. The page bytes follow
    /// via `write_bytes`.
    pub fn start_flush_chunk(
        &mut self,
        descriptor: &SensorDescriptor,
        statistics: &Statistics,
        data_size: usize,
        num_pages: i32,
    ) -> Result<usize> {
        self.run(|io| {
            let group = io.current_group.as_mut().ok_or_else(|| {
                Error::Corrupt("chunk started outside of a row group".to_string())
            })?;
            if group.current_chunk.is_some() {
                return Err(Error::Corrupt(
                    "chunk started while another is open".to_string(),
                ));
            }
            let chunk_offset = io.offset;
            let header = ChunkHeader {
                sensor_id: descriptor.sensor_id().to_string(),
                data_size: data_size as i32,
                data_type: descriptor.data_type(),
                num_pages,
                compression: descriptor.compression(),
                encoding: descriptor.encoding(),
                max_tombstone: 0,
            };
            let mut buffer = vec![];
            header.serialize(&mut buffer);
            let header_size = buffer.len();
            io.emit(&buffer)?;
            if let Some(group) = io.current_group.as_mut() {
                group.current_chunk = Some(CurrentChunk {
                    offset: chunk_offset,
                    sensor_id: descriptor.sensor_id().to_string(),
                    data_type: descriptor.data_type(),
                    statistics: statistics.clone(),
                });
            }
            Ok(header_size)
        })
    }

    /// Appends a chunk's accumulated page bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.run(|io| {
            let group = io
                .current_group
                .as_ref()
                .ok_or_else(|| Error::Corrupt("write outside of a row group".to_string()))?;
            if group.current_chunk.is_none() {
                return Err(Error::Corrupt("write outside of a chunk".to_string()));
            }
            io.emit(bytes)
        })
    }

    /// Seals the open chunk, recording its metadata in the current row
    /// group's index.
    pub fn end_chunk(&mut self, total_value_count: i64) -> Result<()> {
        self.run(|io| {
            let offset = io.offset;
            let group = io
                .current_group
                .as_mut()
                .ok_or_else(|| Error::Corrupt("chunk ended outside of a row group".to_string()))?;
            let chunk = group
                .current_chunk
                .take()
                .ok_or_else(|| Error::Corrupt("chunk ended while none is open".to_string()))?;
            group.chunks.push(ChunkMetadata {
                sensor_id: chunk.sensor_id,
                file_offset: chunk.offset as i64,
                total_size: (offset - chunk.offset) as i64,
                data_type: chunk.data_type,
                num_points: total_value_count,
                digest: TsDigest::from_statistics(&chunk.statistics),
            });
            Ok(())
        })
    }

    /// Seals the row group: backpatches the header's `data_size` and appends
    /// the group's metadata to the footer index. A failed backpatch declares
    /// the file corrupt.
    pub fn end_row_group(&mut self) -> Result<()> {
        self.run(|io| {
            let group = io
                .current_group
                .take()
                .ok_or_else(|| Error::Corrupt("row group ended while none is open".to_string()))?;
            if group.current_chunk.is_some() {
                return Err(Error::Corrupt(
                    "row group ended while a chunk is open".to_string(),
                ));
            }
            let data_size = (io.offset - group.data_start) as i64;
            io.backpatch(group.data_size_field_offset, data_size)
                .map_err(|e| {
                    error!("row group backpatch failed: {}", e);
                    Error::Corrupt(format!("row group backpatch failed: {}", e))
                })?;
            io.row_groups
                .push(RowGroupMetadata::new(group.device_id, group.chunks));
            Ok(())
        })
    }

    fn backpatch(&mut self, at: u64, data_size: i64) -> Result<()> {
        self.writer.seek(SeekFrom::Start(at))?;
        self.writer.write_all(&data_size.to_be_bytes())?;
        self.writer.seek(SeekFrom::Start(self.offset))?;
        Ok(())
    }

    /// Serializes the footer, its length and the trailing magic, and returns
    /// the underlying writer.
    pub fn close(mut self) -> Result<W> {
        if let Some(error) = &self.poisoned {
            return Err(error.clone());
        }
        if self.current_group.is_some() {
            return Err(Error::Corrupt("closed while a row group is open".to_string()));
        }
        let metadata = FileMetadata::new(
            FOOTER_VERSION,
            self.schema.clone(),
            std::mem::take(&mut self.row_groups),
        );
        let mut buffer = vec![];
        metadata.serialize(&mut buffer);
        let footer_length = buffer.len() as i32;
        self.emit(&buffer)?;
        self.emit(&footer_length.to_be_bytes())?;
        self.emit(&MAGIC)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
