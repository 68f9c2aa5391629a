//! GORILLA: XOR compression for FLOAT and DOUBLE.
//!
//! ```text
//! stream := num_values:varint bit-stream
//! ```
//!
//! The first value is stored raw. Every further value is XORed with its
//! predecessor: control bit `0` for a zero XOR; `10` re-uses the previous
//! leading/trailing window and stores only its significant bits; `11` stores
//! a new leading-zero count (5 bits for FLOAT, 6 for DOUBLE), the
//! significant-bit length (6/7 bits), then the bits themselves.

use std::io::Cursor;

use super::{varint, Decoder, Encoder};
use crate::bits::{self, BitWriter};
use crate::error::{Error, Result};
use crate::types::Value;

/// A float that can travel through the XOR bit stream.
pub trait XorNative: Copy {
    const WIDTH: usize;
    const LEADING_BITS: usize;
    const LENGTH_BITS: usize;

    fn to_bits64(self) -> u64;

    fn from_bits64(bits: u64) -> Self;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Result<Self>;
}

impl XorNative for f32 {
    const WIDTH: usize = 32;
    const LEADING_BITS: usize = 5;
    const LENGTH_BITS: usize = 6;

    fn to_bits64(self) -> u64 {
        self.to_bits() as u64
    }

    fn from_bits64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(*v),
            other => Err(Error::Corrupt(format!(
                "gorilla encoder for FLOAT received a {:?} value",
                other.data_type()
            ))),
        }
    }
}

impl XorNative for f64 {
    const WIDTH: usize = 64;
    const LEADING_BITS: usize = 6;
    const LENGTH_BITS: usize = 7;

    fn to_bits64(self) -> u64 {
        self.to_bits()
    }

    fn from_bits64(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Double(v) => Ok(*v),
            other => Err(Error::Corrupt(format!(
                "gorilla encoder for DOUBLE received a {:?} value",
                other.data_type()
            ))),
        }
    }
}

pub struct GorillaEncoder<T: XorNative> {
    count: u32,
    stream: BitWriter,
    previous: u64,
    previous_leading: usize,
    previous_trailing: usize,
    marker: std::marker::PhantomData<T>,
}

impl<T: XorNative> GorillaEncoder<T> {
    pub fn new() -> Self {
        Self {
            count: 0,
            stream: BitWriter::new(),
            previous: 0,
            previous_leading: usize::MAX,
            previous_trailing: 0,
            marker: std::marker::PhantomData,
        }
    }
}

impl<T: XorNative> Default for GorillaEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: XorNative> Encoder for GorillaEncoder<T> {
    fn encode(&mut self, value: &Value, _out: &mut Vec<u8>) -> Result<()> {
        let value = T::from_value(value)?.to_bits64();
        if self.count == 0 {
            self.stream.write_bits(value, T::WIDTH);
        } else {
            let xor = value ^ self.previous;
            if xor == 0 {
                self.stream.write_bit(false);
            } else {
                self.stream.write_bit(true);
                let leading_cap = (1 << T::LEADING_BITS) - 1;
                let leading = std::cmp::min(
                    xor.leading_zeros() as usize - (64 - T::WIDTH),
                    leading_cap,
                );
                let trailing = xor.trailing_zeros() as usize;
                if self.previous_leading != usize::MAX
                    && leading >= self.previous_leading
                    && trailing >= self.previous_trailing
                {
                    self.stream.write_bit(false);
                    let significant = T::WIDTH - self.previous_leading - self.previous_trailing;
                    self.stream
                        .write_bits(xor >> self.previous_trailing, significant);
                } else {
                    self.stream.write_bit(true);
                    let significant = T::WIDTH - leading - trailing;
                    self.stream.write_bits(leading as u64, T::LEADING_BITS);
                    self.stream.write_bits(significant as u64, T::LENGTH_BITS);
                    self.stream.write_bits(xor >> trailing, significant);
                    self.previous_leading = leading;
                    self.previous_trailing = trailing;
                }
            }
        }
        self.previous = value;
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<u8>) -> Result<()> {
        varint::write_u32(self.count, out);
        let stream = std::mem::take(&mut self.stream);
        out.extend_from_slice(&stream.into_inner());
        self.count = 0;
        self.previous = 0;
        self.previous_leading = usize::MAX;
        self.previous_trailing = 0;
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.stream.len() / 8
    }
}

pub struct GorillaDecoder<T: XorNative> {
    data: Vec<u8>,
    position: usize,
    total: usize,
    delivered: usize,
    previous: u64,
    previous_leading: usize,
    previous_trailing: usize,
    marker: std::marker::PhantomData<T>,
}

impl<T: XorNative> GorillaDecoder<T> {
    pub fn try_new(data: Vec<u8>) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let total = varint::read_u32(&mut cursor)? as usize;
        let position = cursor.position() as usize * 8;
        Ok(Self {
            data: cursor.into_inner(),
            position,
            total,
            delivered: 0,
            previous: 0,
            previous_leading: 0,
            previous_trailing: 0,
            marker: std::marker::PhantomData,
        })
    }

    fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.position / 8)
            .ok_or_else(|| Error::UnexpectedEof("gorilla stream exhausted".to_string()))?;
        let bit = bits::get_bit(*byte, self.position);
        self.position += 1;
        Ok(bit)
    }

    fn read_bits(&mut self, count: usize) -> Result<u64> {
        let mut value = 0u64;
        for _ in 0..count {
            value = value << 1 | self.read_bit()? as u64;
        }
        Ok(value)
    }
}

impl<T: XorNative> Decoder for GorillaDecoder<T> {
    fn has_next(&mut self) -> Result<bool> {
        Ok(self.delivered < self.total)
    }

    fn next(&mut self) -> Result<Value> {
        if self.delivered >= self.total {
            return Err(Error::UnexpectedEof("gorilla stream exhausted".to_string()));
        }
        let value = if self.delivered == 0 {
            self.read_bits(T::WIDTH)?
        } else if !self.read_bit()? {
            self.previous
        } else if !self.read_bit()? {
            let significant = T::WIDTH - self.previous_leading - self.previous_trailing;
            let xor = self.read_bits(significant)? << self.previous_trailing;
            self.previous ^ xor
        } else {
            let leading = self.read_bits(T::LEADING_BITS)? as usize;
            let significant = self.read_bits(T::LENGTH_BITS)? as usize;
            if leading + significant > T::WIDTH {
                return Err(Error::Corrupt(format!(
                    "gorilla window {}+{} exceeds {} bits",
                    leading,
                    significant,
                    T::WIDTH
                )));
            }
            let trailing = T::WIDTH - leading - significant;
            self.previous_leading = leading;
            self.previous_trailing = trailing;
            let xor = self.read_bits(significant)? << trailing;
            self.previous ^ xor
        };
        self.previous = value;
        self.delivered += 1;
        Ok(T::from_bits64(value).into_value())
    }
}
