use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::format::{FOOTER_SIZE, MAGIC};
use crate::io::stream_len;
use crate::metadata::FileMetadata;

/// Smallest well-formed file: leading magic + version, empty footer
/// metadata, trailing length + magic.
const MIN_FILE_SIZE: u64 = 7 + FOOTER_SIZE;

// Layout of the file tail
// +---------------------+-----------------+------------+----------+
// |    Rest of file     | footer_metadata | length:i32 | MAGIC(6) |
// +---------------------+-----------------+------------+----------+
//
// The footer length sits at len-10; the footer itself starts at
// len-10-length.
/// Reads the footer. Returns the parsed metadata and the footer's start
/// offset, which bounds sequential row-group iteration.
pub fn read_file_metadata<R: Read + Seek>(reader: &mut R) -> Result<(FileMetadata, u64)> {
    let file_size = stream_len(reader)?;
    if file_size < MIN_FILE_SIZE {
        return Err(Error::Corrupt(format!(
            "file of {} bytes cannot hold the magic framing",
            file_size
        )));
    }

    reader.seek(SeekFrom::End(-(MAGIC.len() as i64)))?;
    let mut tail = [0u8; 6];
    reader.read_exact(&mut tail)?;
    if tail != MAGIC {
        return Err(Error::BadMagic(format!(
            "tail bytes {:?} do not spell the magic",
            tail
        )));
    }

    reader.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
    let footer_length = reader.read_i32::<BigEndian>()?;
    if footer_length < 0 || footer_length as u64 + MIN_FILE_SIZE > file_size {
        return Err(Error::Corrupt(format!(
            "footer length {} does not fit a {}-byte file",
            footer_length, file_size
        )));
    }

    let footer_start = file_size - FOOTER_SIZE - footer_length as u64;
    reader.seek(SeekFrom::Start(footer_start))?;
    let mut buffer = vec![0u8; footer_length as usize];
    reader.read_exact(&mut buffer)?;

    let mut cursor = Cursor::new(buffer);
    let metadata = FileMetadata::deserialize(&mut cursor)?;
    if cursor.position() != footer_length as u64 {
        return Err(Error::Corrupt(format!(
            "footer metadata consumed {} of its declared {} bytes",
            cursor.position(),
            footer_length
        )));
    }
    Ok((metadata, footer_start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_is_corrupt() {
        let mut cursor = Cursor::new(vec![0u8; 10]);
        assert!(matches!(
            read_file_metadata(&mut cursor),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn missing_tail_magic_is_bad_magic() {
        let mut bytes = vec![0u8; 64];
        bytes.extend_from_slice(b"NotTsF");
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            read_file_metadata(&mut cursor),
            Err(Error::BadMagic(_))
        ));
    }

    #[test]
    fn oversized_footer_length_is_corrupt() {
        let mut bytes = vec![0u8; 32];
        bytes.extend_from_slice(&i32::MAX.to_be_bytes());
        bytes.extend_from_slice(&MAGIC);
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            read_file_metadata(&mut cursor),
            Err(Error::Corrupt(_))
        ));
    }
}
