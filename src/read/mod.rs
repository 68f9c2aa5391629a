//! Read path: the sequential file walker and the page pair iterator.

mod metadata;
mod page;

pub use metadata::read_file_metadata;
pub use page::PageReader;

use std::io::{Read, Seek, SeekFrom};

use crate::compression::{self, Compression};
use crate::error::{Error, Result};
use crate::format::{ChunkHeader, RowGroupHeader, MAGIC, VERSION};
use crate::io::{stream_len, PositionedReader};
use crate::metadata::FileMetadata;
use crate::page::PageHeader;
use crate::types::DataType;

/// Sequentially walks a file: magic framing, row groups, chunks, pages.
///
/// Structural mismatches end the read session with a typed error; partial
/// iteration before that point is fine.
pub struct TsFileSequenceReader<R: Read + Seek> {
    reader: PositionedReader<R>,
    file_size: u64,
    footer_start: Option<u64>,
    metadata: Option<FileMetadata>,
}

impl<R: Read + Seek> TsFileSequenceReader<R> {
    /// Wraps `reader` without validating anything yet; drive the individual
    /// steps, or use [`TsFileSequenceReader::open`].
    pub fn new(mut reader: R) -> Result<Self> {
        let file_size = stream_len(&mut reader)?;
        Ok(Self {
            reader: PositionedReader::new(reader),
            file_size,
            footer_start: None,
            metadata: None,
        })
    }

    /// Verifies both magics and the version, reads the footer and positions
    /// the cursor on the first row group.
    pub fn open(reader: R) -> Result<Self> {
        let mut this = Self::new(reader)?;
        this.read_head_magic()?;
        this.read_version()?;
        this.read_tail_magic()?;
        this.read_file_metadata()?;
        Ok(this)
    }

    /// Absolute position of the next byte to be read.
    pub fn pos(&self) -> u64 {
        self.reader.position()
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn metadata(&self) -> Option<&FileMetadata> {
        self.metadata.as_ref()
    }

    pub fn read_head_magic(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut head = [0u8; 6];
        self.reader.read_exact(&mut head)?;
        if head != MAGIC {
            return Err(Error::BadMagic(format!(
                "head bytes {:?} do not spell the magic",
                head
            )));
        }
        Ok(())
    }

    /// The version byte immediately after the leading magic.
    pub fn read_version(&mut self) -> Result<u8> {
        self.reader.seek(SeekFrom::Start(MAGIC.len() as u64))?;
        let mut version = [0u8; 1];
        self.reader.read_exact(&mut version)?;
        if version[0] != VERSION {
            return Err(Error::VersionUnsupported(version[0]));
        }
        Ok(version[0])
    }

    pub fn read_tail_magic(&mut self) -> Result<()> {
        if self.file_size < MAGIC.len() as u64 {
            return Err(Error::BadMagic("file shorter than the magic".to_string()));
        }
        self.reader
            .seek(SeekFrom::Start(self.file_size - MAGIC.len() as u64))?;
        let mut tail = [0u8; 6];
        self.reader.read_exact(&mut tail)?;
        if tail != MAGIC {
            return Err(Error::BadMagic(format!(
                "tail bytes {:?} do not spell the magic",
                tail
            )));
        }
        Ok(())
    }

    /// Parses the footer and resets the cursor to the first row group.
    pub fn read_file_metadata(&mut self) -> Result<&FileMetadata> {
        let (metadata, footer_start) = metadata::read_file_metadata(&mut self.reader)?;
        self.footer_start = Some(footer_start);
        self.reader.seek(SeekFrom::Start(MAGIC.len() as u64 + 1))?;
        Ok(self.metadata.insert(metadata))
    }

    /// True while the cursor is before the footer. Requires the footer to
    /// have been read.
    pub fn has_next_row_group(&self) -> Result<bool> {
        let footer_start = self.footer_start.ok_or_else(|| {
            Error::Corrupt("row group iteration before reading the footer".to_string())
        })?;
        Ok(self.pos() < footer_start)
    }

    pub fn read_row_group_header(&mut self) -> Result<RowGroupHeader> {
        RowGroupHeader::deserialize(&mut self.reader)
    }

    pub fn read_chunk_header(&mut self) -> Result<ChunkHeader> {
        ChunkHeader::deserialize(&mut self.reader)
    }

    /// Reads the chunk header at `offset` (for resolving footer index
    /// entries). Moves the cursor.
    pub fn read_chunk_header_at(&mut self, offset: u64) -> Result<ChunkHeader> {
        self.reader.seek(SeekFrom::Start(offset))?;
        self.read_chunk_header()
    }

    /// Reads a page header; data type, encoding and compression are
    /// inherited from the enclosing chunk header.
    pub fn read_page_header(&mut self, data_type: DataType) -> Result<PageHeader> {
        PageHeader::deserialize(&mut self.reader, data_type)
    }

    /// Reads exactly the page's `compressed_size` bytes and decompresses
    /// them into the payload the [`PageReader`] consumes.
    pub fn read_page(&mut self, header: &PageHeader, compression: Compression) -> Result<Vec<u8>> {
        if header.compressed_size < 0 || header.uncompressed_size < 0 {
            return Err(Error::Corrupt(format!(
                "page header declares negative sizes {}/{}",
                header.uncompressed_size, header.compressed_size
            )));
        }
        let mut compressed = vec![0u8; header.compressed_size as usize];
        self.reader.read_exact(&mut compressed)?;
        compression::decompress(compression, compressed, header.uncompressed_size as usize)
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn bad_head_magic() {
        let mut bytes = b"BadMgc".to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        let mut reader = TsFileSequenceReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            reader.read_head_magic(),
            Err(Error::BadMagic(_))
        ));
    }

    #[test]
    fn iteration_requires_the_footer() {
        let reader = TsFileSequenceReader::new(Cursor::new(vec![0u8; 32])).unwrap();
        assert!(matches!(
            reader.has_next_row_group(),
            Err(Error::Corrupt(_))
        ));
    }
}
