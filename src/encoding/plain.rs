//! PLAIN: raw BigEndian at the type's natural width.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use super::{varint, Decoder, Encoder};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

pub struct PlainEncoder {
    data_type: DataType,
}

impl PlainEncoder {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }
}

impl Encoder for PlainEncoder {
    fn encode(&mut self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        if value.data_type() != self.data_type {
            return Err(Error::Corrupt(format!(
                "plain encoder for {:?} received a {:?} value",
                self.data_type,
                value.data_type()
            )));
        }
        match value {
            Value::Boolean(v) => out.push(*v as u8),
            Value::Int32(v) => out.extend_from_slice(&v.to_be_bytes()),
            Value::Int64(v) => out.extend_from_slice(&v.to_be_bytes()),
            Value::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
            Value::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
            Value::Text(v) => {
                varint::write_u32(v.len() as u32, out);
                out.extend_from_slice(v.as_bytes());
            }
        }
        Ok(())
    }

    fn flush(&mut self, _out: &mut Vec<u8>) -> Result<()> {
        // values were emitted as they arrived
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        0
    }
}

pub struct PlainDecoder {
    data_type: DataType,
    cursor: Cursor<Vec<u8>>,
}

impl PlainDecoder {
    pub fn new(data_type: DataType, data: Vec<u8>) -> Self {
        Self {
            data_type,
            cursor: Cursor::new(data),
        }
    }
}

impl Decoder for PlainDecoder {
    fn has_next(&mut self) -> Result<bool> {
        Ok(self.cursor.position() < self.cursor.get_ref().len() as u64)
    }

    fn next(&mut self) -> Result<Value> {
        Ok(match self.data_type {
            DataType::Boolean => Value::Boolean(self.cursor.read_u8()? != 0),
            DataType::Int32 => Value::Int32(self.cursor.read_i32::<BigEndian>()?),
            DataType::Int64 => Value::Int64(self.cursor.read_i64::<BigEndian>()?),
            DataType::Float => Value::Float(self.cursor.read_f32::<BigEndian>()?),
            DataType::Double => Value::Double(self.cursor.read_f64::<BigEndian>()?),
            DataType::Text => {
                let length = varint::read_u32(&mut self.cursor)? as usize;
                let mut buffer = vec![0u8; length];
                self.cursor.read_exact(&mut buffer)?;
                Value::Text(String::from_utf8(buffer).map_err(|e| {
                    Error::Corrupt(format!("plain TEXT value is not UTF-8: {}", e))
                })?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data_type: DataType, values: Vec<Value>) {
        let mut encoder = PlainEncoder::new(data_type);
        let mut buffer = vec![];
        for value in &values {
            encoder.encode(value, &mut buffer).unwrap();
        }
        encoder.flush(&mut buffer).unwrap();

        let mut decoder = PlainDecoder::new(data_type, buffer);
        let mut decoded = vec![];
        while decoder.has_next().unwrap() {
            decoded.push(decoder.next().unwrap());
        }
        assert_eq!(decoded, values);
    }

    #[test]
    fn all_primitives_roundtrip() {
        roundtrip(
            DataType::Boolean,
            vec![Value::Boolean(true), Value::Boolean(false)],
        );
        roundtrip(
            DataType::Int32,
            vec![Value::Int32(-1), Value::Int32(0), Value::Int32(i32::MAX)],
        );
        roundtrip(
            DataType::Int64,
            vec![Value::Int64(1 << 40), Value::Int64(i64::MIN)],
        );
        roundtrip(DataType::Float, vec![Value::Float(1.5), Value::Float(-0.0)]);
        roundtrip(
            DataType::Double,
            vec![Value::Double(std::f64::consts::PI)],
        );
        roundtrip(
            DataType::Text,
            vec![
                Value::Text("".to_string()),
                Value::Text("status=ok".to_string()),
            ],
        );
    }

    #[test]
    fn int32_is_big_endian() {
        let mut encoder = PlainEncoder::new(DataType::Int32);
        let mut buffer = vec![];
        encoder.encode(&Value::Int32(1), &mut buffer).unwrap();
        assert_eq!(buffer, vec![0, 0, 0, 1]);
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let mut encoder = PlainEncoder::new(DataType::Int32);
        let mut buffer = vec![];
        assert!(matches!(
            encoder.encode(&Value::Int64(1), &mut buffer),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn trailing_partial_value_is_eof() {
        let mut decoder = PlainDecoder::new(DataType::Int32, vec![0, 0, 1]);
        assert!(decoder.has_next().unwrap());
        assert!(matches!(decoder.next(), Err(Error::UnexpectedEof(_))));
    }
}
