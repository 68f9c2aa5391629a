use std::io::Cursor;

use tsfile2::compression::Compression;
use tsfile2::encoding::Encoding;
use tsfile2::metadata::Schema;
use tsfile2::read::TsFileSequenceReader;
use tsfile2::types::{DataType, Value};
use tsfile2::write::WriteOptions;
use tsfile2::Error;

use super::utils::{sensor, write_file};

fn valid_file() -> Vec<u8> {
    let mut schema = Schema::new();
    schema.register(sensor(
        "s1",
        DataType::Int32,
        Encoding::Plain,
        Compression::Uncompressed,
    ));
    write_file(
        schema,
        WriteOptions::default(),
        &[
            ("d1", "s1", 1, Value::Int32(10)),
            ("d1", "s1", 2, Value::Int32(20)),
        ],
    )
}

#[test]
fn corrupt_head_magic_fails() {
    let mut bytes = valid_file();
    bytes[0..6].copy_from_slice(b"\xde\xad\xbe\xef\x00\x01");
    assert!(matches!(
        TsFileSequenceReader::open(Cursor::new(bytes)),
        Err(Error::BadMagic(_))
    ));
}

#[test]
fn truncated_tail_magic_fails() {
    let mut bytes = valid_file();
    bytes.truncate(bytes.len() - 6);
    assert!(matches!(
        TsFileSequenceReader::open(Cursor::new(bytes)),
        Err(Error::BadMagic(_))
    ));
}

#[test]
fn unsupported_version_fails() {
    let mut bytes = valid_file();
    bytes[6] = 99;
    assert!(matches!(
        TsFileSequenceReader::open(Cursor::new(bytes)),
        Err(Error::VersionUnsupported(99))
    ));
}

#[test]
fn corrupt_footer_length_fails() {
    let mut bytes = valid_file();
    let at = bytes.len() - 10;
    bytes[at..at + 4].copy_from_slice(&i32::MAX.to_be_bytes());
    assert!(matches!(
        TsFileSequenceReader::open(Cursor::new(bytes)),
        Err(Error::Corrupt(_))
    ));
}

#[test]
fn file_cut_before_the_footer_is_detected() {
    // a writer dropped without close leaves leading magic but no footer
    let bytes = valid_file();
    let cut = bytes.len() / 2;
    let truncated = bytes[..cut].to_vec();
    assert!(TsFileSequenceReader::open(Cursor::new(truncated)).is_err());
}

#[test]
fn chunk_marker_expected_at_chunk_offset() {
    let bytes = valid_file();
    let mut reader = TsFileSequenceReader::open(Cursor::new(bytes)).unwrap();
    let metadata = reader.read_file_metadata().unwrap().clone();
    let chunk_meta = &metadata.chunks_of("d1", "s1").unwrap()[0];
    // one byte past the marker no longer parses as a chunk header
    let result = reader.read_chunk_header_at(chunk_meta.file_offset as u64 + 1);
    assert!(result.is_err());
}
