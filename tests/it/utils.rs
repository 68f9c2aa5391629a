use std::collections::BTreeMap;
use std::io::Cursor;

use tsfile2::compression::Compression;
use tsfile2::encoding::Encoding;
use tsfile2::metadata::{Schema, SensorDescriptor};
use tsfile2::read::{PageReader, TsFileSequenceReader};
use tsfile2::types::{DataType, Value};
use tsfile2::write::{DataPoint, TsFileWriter, WriteOptions};
use tsfile2::Result;

pub fn sensor(
    id: &str,
    data_type: DataType,
    encoding: Encoding,
    compression: Compression,
) -> SensorDescriptor {
    SensorDescriptor::new(id, data_type, encoding, compression).unwrap()
}

/// Writes one file from `(device, sensor, timestamp, value)` rows in order.
pub fn write_file(
    schema: Schema,
    options: WriteOptions,
    rows: &[(&str, &str, i64, Value)],
) -> Vec<u8> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut writer = TsFileWriter::try_new(Cursor::new(vec![]), schema, options).unwrap();
    for (device, sensor, timestamp, value) in rows {
        writer
            .write(device, DataPoint::new(*sensor, *timestamp, value.clone()))
            .unwrap();
    }
    writer.close().unwrap().into_inner()
}

/// Sequentially decodes every pair in the file, keyed by (device, sensor).
pub fn read_all_pairs(bytes: Vec<u8>) -> Result<BTreeMap<(String, String), Vec<(i64, Value)>>> {
    let mut reader = TsFileSequenceReader::open(Cursor::new(bytes))?;
    let mut pairs: BTreeMap<(String, String), Vec<(i64, Value)>> = BTreeMap::new();
    while reader.has_next_row_group()? {
        let group = reader.read_row_group_header()?;
        for _ in 0..group.num_chunks {
            let chunk = reader.read_chunk_header()?;
            for _ in 0..chunk.num_pages {
                let header = reader.read_page_header(chunk.data_type)?;
                let payload = reader.read_page(&header, chunk.compression)?;
                let mut page = PageReader::new(payload, chunk.data_type, chunk.encoding)?;
                let into = pairs
                    .entry((group.device_id.clone(), chunk.sensor_id.clone()))
                    .or_default();
                while page.has_next()? {
                    into.push(page.next()?);
                }
            }
        }
    }
    Ok(pairs)
}
