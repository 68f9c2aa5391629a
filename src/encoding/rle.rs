//! Hybrid run-length / bit-packed encoding for INT32 and INT64.
//!
//! Stream grammar (self-delimiting):
//!
//! ```text
//! stream := bit_width:u8 num_values:varint run*
//! run    := header:varint body
//! ```
//!
//! A header with the low bit set is a bit-packed run of `header >> 1` values
//! stored back to back in `ceil8(count * bit_width)` bytes in the canonical
//! framing of [`crate::bits`]; otherwise it is an RLE run of `header >> 1`
//! copies of one value stored in `ceil8(bit_width)` bytes. Runs of at least
//! [`MIN_REPEATS`] equal values become RLE runs.

use std::io::{Cursor, Read};

use byteorder::ReadBytesExt;

use super::{ceil8, varint, Decoder, Encoder};
use crate::bits;
use crate::error::{Error, Result};
use crate::types::Value;

/// Shortest run of equal values worth an RLE run; shorter runs go to the
/// bit-packed buffer.
const MIN_REPEATS: usize = 8;

/// An integer that can travel through the canonical bit-packed framing.
pub trait PackedNative: Copy + PartialEq + std::fmt::Debug {
    const BYTE_WIDTH: usize;

    /// Smallest width holding the two's-complement pattern of every value.
    fn bit_width(values: &[Self]) -> usize;

    fn pack(self, data: &mut [u8], pos: usize, width: usize);

    fn unpack(data: &[u8], pos: usize, width: usize) -> Self;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Result<Self>;
}

impl PackedNative for i32 {
    const BYTE_WIDTH: usize = 4;

    fn bit_width(values: &[Self]) -> usize {
        let max = values.iter().map(|v| *v as u32).max().unwrap_or(0);
        32 - max.leading_zeros() as usize
    }

    fn pack(self, data: &mut [u8], pos: usize, width: usize) {
        bits::int_to_bytes(self, data, pos, width);
    }

    fn unpack(data: &[u8], pos: usize, width: usize) -> Self {
        bits::bytes_to_int(data, pos, width)
    }

    fn into_value(self) -> Value {
        Value::Int32(self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int32(v) => Ok(*v),
            other => Err(Error::Corrupt(format!(
                "rle encoder for INT32 received a {:?} value",
                other.data_type()
            ))),
        }
    }
}

impl PackedNative for i64 {
    const BYTE_WIDTH: usize = 8;

    fn bit_width(values: &[Self]) -> usize {
        let max = values.iter().map(|v| *v as u64).max().unwrap_or(0);
        64 - max.leading_zeros() as usize
    }

    fn pack(self, data: &mut [u8], pos: usize, width: usize) {
        bits::long_to_bytes(self, data, pos, width);
    }

    fn unpack(data: &[u8], pos: usize, width: usize) -> Self {
        bits::bytes_to_long(data, pos, width)
    }

    fn into_value(self) -> Value {
        Value::Int64(self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int64(v) => Ok(*v),
            other => Err(Error::Corrupt(format!(
                "rle encoder for INT64 received a {:?} value",
                other.data_type()
            ))),
        }
    }
}

pub struct RleEncoder<T: PackedNative> {
    values: Vec<T>,
}

impl<T: PackedNative> RleEncoder<T> {
    pub fn new() -> Self {
        Self { values: vec![] }
    }

    fn flush_literals(literals: &mut Vec<T>, width: usize, out: &mut Vec<u8>) {
        if literals.is_empty() {
            return;
        }
        varint::write_u64((literals.len() as u64) << 1 | 1, out);
        let start = out.len();
        out.resize(start + ceil8(literals.len() * width), 0);
        for (i, value) in literals.iter().enumerate() {
            value.pack(&mut out[start..], i * width, width);
        }
        literals.clear();
    }
}

impl<T: PackedNative> Default for RleEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PackedNative> Encoder for RleEncoder<T> {
    fn encode(&mut self, value: &Value, _out: &mut Vec<u8>) -> Result<()> {
        self.values.push(T::from_value(value)?);
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let width = T::bit_width(&self.values);
        out.push(width as u8);
        varint::write_u32(self.values.len() as u32, out);

        let mut literals: Vec<T> = vec![];
        let mut i = 0;
        while i < self.values.len() {
            let mut j = i + 1;
            while j < self.values.len() && self.values[j] == self.values[i] {
                j += 1;
            }
            let run = j - i;
            if run >= MIN_REPEATS {
                Self::flush_literals(&mut literals, width, out);
                varint::write_u64((run as u64) << 1, out);
                let start = out.len();
                out.resize(start + ceil8(width), 0);
                self.values[i].pack(&mut out[start..], 0, width);
            } else {
                literals.extend(std::iter::repeat(self.values[i]).take(run));
            }
            i = j;
        }
        Self::flush_literals(&mut literals, width, out);
        self.values.clear();
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.values.len() * T::BYTE_WIDTH
    }
}

enum Run<T> {
    Rle { value: T, left: usize },
    Packed { values: Vec<T>, next: usize },
}

pub struct RleDecoder<T: PackedNative> {
    cursor: Cursor<Vec<u8>>,
    width: usize,
    total: usize,
    delivered: usize,
    run: Option<Run<T>>,
}

impl<T: PackedNative> RleDecoder<T> {
    pub fn try_new(data: Vec<u8>) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let width = cursor.read_u8()? as usize;
        if width > T::BYTE_WIDTH * 8 {
            return Err(Error::Corrupt(format!(
                "rle bit width {} exceeds the value width",
                width
            )));
        }
        let total = varint::read_u32(&mut cursor)? as usize;
        Ok(Self {
            cursor,
            width,
            total,
            delivered: 0,
            run: None,
        })
    }

    fn refill(&mut self) -> Result<()> {
        let header = varint::read_u64(&mut self.cursor)?;
        if header & 1 == 1 {
            let count = (header >> 1) as usize;
            let mut packed = vec![0u8; ceil8(count * self.width)];
            self.cursor.read_exact(&mut packed)?;
            let values = (0..count)
                .map(|i| T::unpack(&packed, i * self.width, self.width))
                .collect();
            self.run = Some(Run::Packed { values, next: 0 });
        } else {
            let left = (header >> 1) as usize;
            let mut buffer = vec![0u8; ceil8(self.width)];
            self.cursor.read_exact(&mut buffer)?;
            let value = T::unpack(&buffer, 0, self.width);
            self.run = Some(Run::Rle { value, left });
        }
        Ok(())
    }
}

impl<T: PackedNative> Decoder for RleDecoder<T> {
    fn has_next(&mut self) -> Result<bool> {
        Ok(self.delivered < self.total)
    }

    fn next(&mut self) -> Result<Value> {
        if self.delivered >= self.total {
            return Err(Error::UnexpectedEof("rle stream exhausted".to_string()));
        }
        loop {
            match &mut self.run {
                Some(Run::Rle { value, left }) if *left > 0 => {
                    *left -= 1;
                    self.delivered += 1;
                    return Ok(value.into_value());
                }
                Some(Run::Packed { values, next }) if *next < values.len() => {
                    let value = values[*next];
                    *next += 1;
                    self.delivered += 1;
                    return Ok(value.into_value());
                }
                _ => self.refill()?,
            }
        }
    }
}
