use std::io::{Seek, Write};

use super::file::TsFileIoWriter;
use super::row_group::ChunkGroupWriter;
use super::{DataPoint, WriteOptions};
use crate::error::Result;
use crate::metadata::Schema;

/// Top-level ingestion facade: routes points to per-device chunk groups and
/// flushes them as row groups when the memory threshold is crossed or the
/// file is closed.
pub struct TsFileWriter<W: Write + Seek> {
    io: TsFileIoWriter<W>,
    schema: Schema,
    groups: Vec<ChunkGroupWriter>,
    options: WriteOptions,
}

impl<W: Write + Seek> TsFileWriter<W> {
    pub fn try_new(writer: W, schema: Schema, options: WriteOptions) -> Result<Self> {
        let io = TsFileIoWriter::try_new(writer, schema.clone())?;
        Ok(Self {
            io,
            schema,
            groups: vec![],
            options,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Appends one point for `device_id`. The point's sensor must be in the
    /// schema and its timestamps non-decreasing per sensor.
    pub fn write(&mut self, device_id: &str, point: DataPoint) -> Result<()> {
        let group = match self
            .groups
            .iter_mut()
            .position(|g| g.device_id() == device_id)
        {
            Some(at) => &mut self.groups[at],
            None => {
                self.groups
                    .push(ChunkGroupWriter::new(device_id, self.options.page_size));
                let at = self.groups.len() - 1;
                &mut self.groups[at]
            }
        };
        group.write(&point, &self.schema)?;

        let in_memory: usize = self.groups.iter().map(|g| g.estimate_max_size()).sum();
        if in_memory >= self.options.row_group_size {
            self.flush_row_groups()?;
        }
        Ok(())
    }

    /// Seals every non-empty device group as one row group, in the order
    /// devices first appeared.
    pub fn flush_row_groups(&mut self) -> Result<()> {
        for group in &mut self.groups {
            if group.is_empty() {
                continue;
            }
            group.flush_to(&mut self.io)?;
        }
        Ok(())
    }

    /// Flushes open groups and finalizes the file, returning the underlying
    /// writer.
    pub fn close(mut self) -> Result<W> {
        self.flush_row_groups()?;
        self.io.close()
    }
}
