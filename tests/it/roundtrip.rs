use std::io::Cursor;

use tsfile2::compression::Compression;
use tsfile2::encoding::Encoding;
use tsfile2::format::FOOTER_SIZE;
use tsfile2::metadata::Schema;
use tsfile2::read::{PageReader, TsFileSequenceReader};
use tsfile2::statistics::Statistics;
use tsfile2::types::{DataType, Value};
use tsfile2::write::WriteOptions;
use tsfile2::MAGIC;

use super::utils::{read_all_pairs, sensor, write_file};

fn s1_schema(compression: Compression) -> Schema {
    let mut schema = Schema::new();
    schema.register(sensor("s1", DataType::Int32, Encoding::Plain, compression));
    schema
}

fn s1_rows() -> Vec<(&'static str, &'static str, i64, Value)> {
    vec![
        ("d1", "s1", 1, Value::Int32(10)),
        ("d1", "s1", 2, Value::Int32(20)),
        ("d1", "s1", 3, Value::Int32(30)),
    ]
}

#[test]
fn plain_int32_roundtrip_with_statistics() {
    let bytes = write_file(
        s1_schema(Compression::Uncompressed),
        WriteOptions::default(),
        &s1_rows(),
    );

    // magic framing and footer length back-reference
    assert_eq!(&bytes[0..6], &MAGIC);
    assert_eq!(&bytes[bytes.len() - 6..], &MAGIC);
    let length_at = bytes.len() - FOOTER_SIZE as usize;
    let footer_length = i32::from_be_bytes(bytes[length_at..length_at + 4].try_into().unwrap());
    assert!(footer_length > 0);
    let footer_start = length_at - footer_length as usize;
    assert!(footer_start > 7);
    // the footer metadata parses from exactly that region
    let metadata =
        tsfile2::metadata::FileMetadata::deserialize(&mut &bytes[footer_start..length_at]).unwrap();
    assert_eq!(metadata.chunks_of("d1", "s1").unwrap().len(), 1);

    let pairs = read_all_pairs(bytes.clone()).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(
        pairs[&("d1".to_string(), "s1".to_string())],
        vec![
            (1, Value::Int32(10)),
            (2, Value::Int32(20)),
            (3, Value::Int32(30)),
        ]
    );

    // page statistics: min 10, max 30, first 10, last 30, sum 60.0
    let mut reader = TsFileSequenceReader::open(Cursor::new(bytes)).unwrap();
    assert!(reader.has_next_row_group().unwrap());
    let group = reader.read_row_group_header().unwrap();
    assert_eq!(group.device_id, "d1");
    let chunk = reader.read_chunk_header().unwrap();
    assert_eq!(chunk.sensor_id, "s1");
    assert_eq!(chunk.num_pages, 1);
    let header = reader.read_page_header(chunk.data_type).unwrap();
    assert_eq!(header.num_values, 3);
    assert_eq!(header.min_timestamp, 1);
    assert_eq!(header.max_timestamp, 3);
    match &header.statistics {
        Statistics::Int32(stats) => {
            assert_eq!(stats.min, 10);
            assert_eq!(stats.max, 30);
            assert_eq!(stats.first, 10);
            assert_eq!(stats.last, 30);
            assert_eq!(stats.sum, 60.0);
        }
        other => panic!("unexpected statistics {:?}", other),
    }
}

#[cfg(feature = "snappy")]
#[test]
fn snappy_bytes_differ_but_pairs_do_not() {
    let uncompressed = write_file(
        s1_schema(Compression::Uncompressed),
        WriteOptions::default(),
        &s1_rows(),
    );
    let snappy = write_file(
        s1_schema(Compression::Snappy),
        WriteOptions::default(),
        &s1_rows(),
    );
    assert_ne!(uncompressed, snappy);
    assert_eq!(
        read_all_pairs(uncompressed).unwrap(),
        read_all_pairs(snappy).unwrap()
    );
}

#[test]
fn gorilla_float_roundtrip() {
    let mut schema = Schema::new();
    schema.register(sensor(
        "s1",
        DataType::Float,
        Encoding::Gorilla,
        Compression::Uncompressed,
    ));
    let rows = vec![
        ("d1", "s1", 1, Value::Float(1.5)),
        ("d1", "s1", 2, Value::Float(1.5)),
        ("d1", "s1", 3, Value::Float(2.5)),
    ];
    let pairs = read_all_pairs(write_file(schema, WriteOptions::default(), &rows)).unwrap();
    assert_eq!(
        pairs[&("d1".to_string(), "s1".to_string())],
        vec![
            (1, Value::Float(1.5)),
            (2, Value::Float(1.5)),
            (3, Value::Float(2.5)),
        ]
    );
}

#[test]
fn single_value_page() {
    let mut schema = Schema::new();
    schema.register(sensor(
        "s1",
        DataType::Text,
        Encoding::Plain,
        Compression::Uncompressed,
    ));
    let rows = vec![("d1", "s1", 7, Value::Text("on".to_string()))];
    let pairs = read_all_pairs(write_file(schema, WriteOptions::default(), &rows)).unwrap();
    assert_eq!(
        pairs[&("d1".to_string(), "s1".to_string())],
        vec![(7, Value::Text("on".to_string()))]
    );
}

#[test]
fn rle_and_ts2diff_survive_the_full_file() {
    let mut schema = Schema::new();
    schema.register(sensor(
        "counts",
        DataType::Int32,
        Encoding::Rle,
        Compression::Uncompressed,
    ));
    schema.register(sensor(
        "arrivals",
        DataType::Int64,
        Encoding::Ts2Diff,
        Compression::Uncompressed,
    ));

    let mut rows = vec![];
    let values: Vec<i32> = std::iter::repeat(4)
        .take(40)
        .chain([1, 2, 3])
        .chain(std::iter::repeat(9).take(20))
        .collect();
    for (i, v) in values.iter().enumerate() {
        rows.push(("d1", "counts", i as i64, Value::Int32(*v)));
    }
    for i in 0..200i64 {
        rows.push(("d1", "arrivals", i, Value::Int64(1_000_000 + i * 17)));
    }

    let pairs = read_all_pairs(write_file(schema, WriteOptions::default(), &rows)).unwrap();
    let counts = &pairs[&("d1".to_string(), "counts".to_string())];
    assert_eq!(counts.len(), values.len());
    for (i, v) in values.iter().enumerate() {
        assert_eq!(counts[i], (i as i64, Value::Int32(*v)));
    }
    let arrivals = &pairs[&("d1".to_string(), "arrivals".to_string())];
    assert_eq!(arrivals.len(), 200);
    assert_eq!(arrivals[199], (199, Value::Int64(1_000_000 + 199 * 17)));
}

#[test]
fn small_pages_keep_per_page_invariants() {
    let mut schema = Schema::new();
    schema.register(sensor(
        "s1",
        DataType::Int64,
        Encoding::Plain,
        Compression::Uncompressed,
    ));
    let rows: Vec<_> = (0..300i64)
        .map(|i| ("d1", "s1", i, Value::Int64(i * 2)))
        .collect();
    let options = WriteOptions {
        page_size: 256,
        ..WriteOptions::default()
    };
    let bytes = write_file(schema, options, &rows);

    let mut reader = TsFileSequenceReader::open(Cursor::new(bytes)).unwrap();
    let mut total = 0usize;
    let mut pages = 0;
    while reader.has_next_row_group().unwrap() {
        let group = reader.read_row_group_header().unwrap();
        for _ in 0..group.num_chunks {
            let chunk = reader.read_chunk_header().unwrap();
            for _ in 0..chunk.num_pages {
                let header = reader.read_page_header(chunk.data_type).unwrap();
                let payload = reader.read_page(&header, chunk.compression).unwrap();
                let mut page =
                    PageReader::new(payload, chunk.data_type, chunk.encoding).unwrap();
                let mut decoded = vec![];
                while page.has_next().unwrap() {
                    decoded.push(page.next().unwrap());
                }
                // num_values, min_ts and max_ts describe exactly the decoded pairs
                assert_eq!(header.num_values as usize, decoded.len());
                assert_eq!(
                    header.min_timestamp,
                    decoded.iter().map(|(t, _)| *t).min().unwrap()
                );
                assert_eq!(
                    header.max_timestamp,
                    decoded.iter().map(|(t, _)| *t).max().unwrap()
                );
                assert!(header.min_timestamp <= header.max_timestamp);
                total += decoded.len();
                pages += 1;
            }
        }
    }
    assert_eq!(total, 300);
    assert!(pages > 1);
}

#[test]
fn two_devices_two_sensors_and_the_footer_index() {
    let mut schema = Schema::new();
    schema.register(sensor(
        "s1",
        DataType::Int64,
        Encoding::Ts2Diff,
        Compression::Uncompressed,
    ));
    schema.register(sensor(
        "s2",
        DataType::Double,
        Encoding::Gorilla,
        Compression::Uncompressed,
    ));

    let mut rows = vec![];
    for i in 0..50i64 {
        rows.push(("d1", "s1", i, Value::Int64(i)));
        rows.push(("d1", "s2", i, Value::Double(i as f64 / 4.0)));
    }
    for i in 0..50i64 {
        rows.push(("d2", "s1", i, Value::Int64(-i)));
        rows.push(("d2", "s2", i, Value::Double(i as f64 * 3.0)));
    }
    let bytes = write_file(schema, WriteOptions::default(), &rows);

    // sequential read yields row groups in write order
    let mut reader = TsFileSequenceReader::open(Cursor::new(bytes.clone())).unwrap();
    let mut devices = vec![];
    while reader.has_next_row_group().unwrap() {
        let group = reader.read_row_group_header().unwrap();
        devices.push(group.device_id.clone());
        for _ in 0..group.num_chunks {
            let chunk = reader.read_chunk_header().unwrap();
            for _ in 0..chunk.num_pages {
                let header = reader.read_page_header(chunk.data_type).unwrap();
                reader.read_page(&header, chunk.compression).unwrap();
            }
        }
    }
    assert_eq!(devices, vec!["d1", "d2"]);

    // every footer chunk offset resolves to a chunk header matching the
    // metadata's declared type and the schema's encoding/compression
    let metadata = reader.read_file_metadata().unwrap().clone();
    for device in ["d1", "d2"] {
        for sensor_id in ["s1", "s2"] {
            let chunks = metadata.chunks_of(device, sensor_id).unwrap().to_vec();
            assert!(!chunks.is_empty());
            for chunk_meta in &chunks {
                let header = reader
                    .read_chunk_header_at(chunk_meta.file_offset as u64)
                    .unwrap();
                assert_eq!(header.sensor_id, *sensor_id);
                assert_eq!(header.data_type, chunk_meta.data_type);
                let descriptor = metadata.schema().get(sensor_id).unwrap();
                assert_eq!(header.encoding, descriptor.encoding());
                assert_eq!(header.compression, descriptor.compression());
            }
        }
    }

    // and the decoded pairs match the input per (device, sensor)
    let pairs = read_all_pairs(bytes).unwrap();
    assert_eq!(pairs.len(), 4);
    assert_eq!(
        pairs[&("d2".to_string(), "s1".to_string())][49],
        (49, Value::Int64(-49))
    );
}

#[cfg(feature = "snappy")]
#[test]
fn mixed_compressions_in_one_file() {
    let mut schema = Schema::new();
    schema.register(sensor(
        "raw",
        DataType::Boolean,
        Encoding::Plain,
        Compression::Uncompressed,
    ));
    schema.register(sensor(
        "packed",
        DataType::Int64,
        Encoding::Rle,
        Compression::Snappy,
    ));
    let mut rows = vec![];
    for i in 0..100i64 {
        rows.push(("d1", "raw", i, Value::Boolean(i % 3 == 0)));
        rows.push(("d1", "packed", i, Value::Int64(i / 10)));
    }
    let pairs = read_all_pairs(write_file(schema, WriteOptions::default(), &rows)).unwrap();
    assert_eq!(pairs[&("d1".to_string(), "raw".to_string())].len(), 100);
    assert_eq!(
        pairs[&("d1".to_string(), "packed".to_string())][95],
        (95, Value::Int64(9))
    );
}
