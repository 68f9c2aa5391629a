use std::convert::TryFrom;

pub mod gorilla;
pub mod plain;
pub mod rle;
pub mod ts2diff;
pub mod varint;
pub mod zigzag;

use crate::error::{Error, Result};
use crate::types::{DataType, Value};

/// Value encoding kinds. Wire codes follow the original table; codes of
/// kinds this crate does not implement parse as unknown.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum Encoding {
    /// Raw BigEndian at the type's natural width; TEXT is varint
    /// length-prefixed UTF-8.
    Plain,
    /// Hybrid run-length / bit-packed runs, INT32 and INT64.
    Rle,
    /// Blocked delta encoding for INT64 timestamps.
    Ts2Diff,
    /// XOR float compression with leading/trailing-zero control bits,
    /// FLOAT and DOUBLE.
    Gorilla,
}

impl TryFrom<i16> for Encoding {
    type Error = Error;

    fn try_from(code: i16) -> Result<Self> {
        Ok(match code {
            0 => Encoding::Plain,
            2 => Encoding::Rle,
            4 => Encoding::Ts2Diff,
            8 => Encoding::Gorilla,
            _ => return Err(Error::UnknownEncoding(code)),
        })
    }
}

impl From<Encoding> for i16 {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Plain => 0,
            Encoding::Rle => 2,
            Encoding::Ts2Diff => 4,
            Encoding::Gorilla => 8,
        }
    }
}

/// A stateful column encoder. May buffer an arbitrary window of values;
/// everything buffered is emitted by `flush`, after which the encoder is
/// back in its initial state.
pub trait Encoder {
    fn encode(&mut self, value: &Value, out: &mut Vec<u8>) -> Result<()>;

    fn flush(&mut self, out: &mut Vec<u8>) -> Result<()>;

    /// Bytes currently buffered inside the encoder, for flush policies.
    fn estimated_size(&self) -> usize;
}

/// A stateful iterator over one column region of a page.
pub trait Decoder {
    fn has_next(&mut self) -> Result<bool>;

    fn next(&mut self) -> Result<Value>;
}

/// Creates the encoder for an (encoding, data type) pair, rejecting pairs
/// with no codec.
pub fn new_encoder(encoding: Encoding, data_type: DataType) -> Result<Box<dyn Encoder>> {
    Ok(match (encoding, data_type) {
        (Encoding::Plain, _) => Box::new(plain::PlainEncoder::new(data_type)),
        (Encoding::Rle, DataType::Int32) => Box::new(rle::RleEncoder::<i32>::new()),
        (Encoding::Rle, DataType::Int64) => Box::new(rle::RleEncoder::<i64>::new()),
        (Encoding::Ts2Diff, DataType::Int64) => Box::new(ts2diff::DeltaEncoder::new()),
        (Encoding::Gorilla, DataType::Float) => Box::new(gorilla::GorillaEncoder::<f32>::new()),
        (Encoding::Gorilla, DataType::Double) => Box::new(gorilla::GorillaEncoder::<f64>::new()),
        _ => return Err(Error::UnknownEncoding(i16::from(encoding))),
    })
}

/// Creates the decoder for an (encoding, data type) pair over one column
/// region of a decompressed page.
pub fn new_decoder(
    encoding: Encoding,
    data_type: DataType,
    data: Vec<u8>,
) -> Result<Box<dyn Decoder>> {
    Ok(match (encoding, data_type) {
        (Encoding::Plain, _) => Box::new(plain::PlainDecoder::new(data_type, data)),
        (Encoding::Rle, DataType::Int32) => Box::new(rle::RleDecoder::<i32>::try_new(data)?),
        (Encoding::Rle, DataType::Int64) => Box::new(rle::RleDecoder::<i64>::try_new(data)?),
        (Encoding::Ts2Diff, DataType::Int64) => Box::new(ts2diff::DeltaDecoder::try_new(data)?),
        (Encoding::Gorilla, DataType::Float) => {
            Box::new(gorilla::GorillaDecoder::<f32>::try_new(data)?)
        }
        (Encoding::Gorilla, DataType::Double) => {
            Box::new(gorilla::GorillaDecoder::<f64>::try_new(data)?)
        }
        _ => return Err(Error::UnknownEncoding(i16::from(encoding))),
    })
}

/// Whether a codec exists for the (encoding, data type) pair.
pub fn supports(encoding: Encoding, data_type: DataType) -> bool {
    matches!(
        (encoding, data_type),
        (Encoding::Plain, _)
            | (Encoding::Rle, DataType::Int32)
            | (Encoding::Rle, DataType::Int64)
            | (Encoding::Ts2Diff, DataType::Int64)
            | (Encoding::Gorilla, DataType::Float)
            | (Encoding::Gorilla, DataType::Double)
    )
}

/// Returns the ceil of value/8.
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}
