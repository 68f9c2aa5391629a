//! TS_2DIFF: blocked delta encoding for INT64 timestamps.
//!
//! ```text
//! stream := num_values:varint [first:zigzag-varint block*]
//! block  := min_delta:zigzag-varint bit_width:u8 packed-residuals
//! ```
//!
//! Each block covers up to [`BLOCK_SIZE`] consecutive deltas; residuals are
//! `delta - min_delta`, bit-packed back to back in the canonical framing.
//! Arithmetic is wrapping, so timestamp sequences spanning the full i64
//! range still round-trip.

use std::io::{Cursor, Read};

use byteorder::ReadBytesExt;

use super::{ceil8, varint, zigzag, Decoder, Encoder};
use crate::bits;
use crate::error::{Error, Result};
use crate::types::Value;

/// Deltas per block.
const BLOCK_SIZE: usize = 128;

pub struct DeltaEncoder {
    values: Vec<i64>,
}

impl DeltaEncoder {
    pub fn new() -> Self {
        Self { values: vec![] }
    }
}

impl Default for DeltaEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for DeltaEncoder {
    fn encode(&mut self, value: &Value, _out: &mut Vec<u8>) -> Result<()> {
        match value {
            Value::Int64(v) => self.values.push(*v),
            other => {
                return Err(Error::Corrupt(format!(
                    "delta encoder received a {:?} value",
                    other.data_type()
                )))
            }
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<u8>) -> Result<()> {
        varint::write_u32(self.values.len() as u32, out);
        if self.values.is_empty() {
            return Ok(());
        }
        varint::write_u64(zigzag::encode(self.values[0]), out);

        let deltas: Vec<i64> = self
            .values
            .windows(2)
            .map(|w| w[1].wrapping_sub(w[0]))
            .collect();
        for block in deltas.chunks(BLOCK_SIZE) {
            let min_delta = *block.iter().min().unwrap();
            varint::write_u64(zigzag::encode(min_delta), out);

            let residuals: Vec<i64> = block.iter().map(|d| d.wrapping_sub(min_delta)).collect();
            let max = residuals.iter().map(|r| *r as u64).max().unwrap();
            let width = 64 - max.leading_zeros() as usize;
            out.push(width as u8);

            let start = out.len();
            out.resize(start + ceil8(block.len() * width), 0);
            for (i, residual) in residuals.iter().enumerate() {
                bits::long_to_bytes(*residual, &mut out[start..], i * width, width);
            }
        }
        self.values.clear();
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.values.len() * 8
    }
}

pub struct DeltaDecoder {
    cursor: Cursor<Vec<u8>>,
    total: usize,
    delivered: usize,
    previous: i64,
    pending: Vec<i64>,
    next_pending: usize,
}

impl DeltaDecoder {
    pub fn try_new(data: Vec<u8>) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let total = varint::read_u32(&mut cursor)? as usize;
        let first = if total > 0 {
            zigzag::decode(varint::read_u64(&mut cursor)?)
        } else {
            0
        };
        Ok(Self {
            cursor,
            total,
            delivered: 0,
            previous: first,
            pending: vec![],
            next_pending: 0,
        })
    }

    fn refill(&mut self) -> Result<()> {
        // total - 1 deltas follow the first value; delivered - 1 are consumed
        let left = self.total - self.delivered;
        let count = std::cmp::min(BLOCK_SIZE, left);

        let min_delta = zigzag::decode(varint::read_u64(&mut self.cursor)?);
        let width = self.cursor.read_u8()? as usize;
        if width > 64 {
            return Err(Error::Corrupt(format!(
                "delta block bit width {} exceeds 64",
                width
            )));
        }
        let mut packed = vec![0u8; ceil8(count * width)];
        self.cursor.read_exact(&mut packed)?;

        self.pending = (0..count)
            .map(|i| bits::bytes_to_long(&packed, i * width, width).wrapping_add(min_delta))
            .collect();
        self.next_pending = 0;
        Ok(())
    }
}

impl Decoder for DeltaDecoder {
    fn has_next(&mut self) -> Result<bool> {
        Ok(self.delivered < self.total)
    }

    fn next(&mut self) -> Result<Value> {
        if self.delivered >= self.total {
            return Err(Error::UnexpectedEof("delta stream exhausted".to_string()));
        }
        if self.delivered == 0 {
            self.delivered = 1;
            return Ok(Value::Int64(self.previous));
        }
        if self.next_pending == self.pending.len() {
            self.refill()?;
        }
        let delta = self.pending[self.next_pending];
        self.next_pending += 1;
        self.previous = self.previous.wrapping_add(delta);
        self.delivered += 1;
        Ok(Value::Int64(self.previous))
    }
}
