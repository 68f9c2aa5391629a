use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::Result;
use crate::types::NativeType;

/// A fixed-width value that statistics can be rolled up over.
pub trait StatNative: NativeType + PartialOrd {
    fn as_f64(self) -> f64;

    fn read_from<R: Read>(reader: &mut R) -> Result<Self>;
}

impl StatNative for i32 {
    fn as_f64(self) -> f64 {
        self as f64
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i32::<BigEndian>()?)
    }
}

impl StatNative for i64 {
    fn as_f64(self) -> f64 {
        self as f64
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i64::<BigEndian>()?)
    }
}

impl StatNative for f32 {
    fn as_f64(self) -> f64 {
        self as f64
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f32::<BigEndian>()?)
    }
}

impl StatNative for f64 {
    fn as_f64(self) -> f64 {
        self
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f64::<BigEndian>()?)
    }
}

/// Roll-up over one numeric column region: `min‖max‖first‖last‖sum` on the
/// wire, `sum` always f64.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveStatistics<T: StatNative> {
    pub min: T,
    pub max: T,
    pub first: T,
    pub last: T,
    pub sum: f64,
    pub is_empty: bool,
}

impl<T: StatNative> PrimitiveStatistics<T> {
    pub fn new() -> Self {
        Self {
            min: T::default(),
            max: T::default(),
            first: T::default(),
            last: T::default(),
            sum: 0.0,
            is_empty: true,
        }
    }

    /// Folds one value in. `first` is immutable after the first call.
    pub fn update(&mut self, value: T) {
        if self.is_empty {
            self.min = value;
            self.max = value;
            self.first = value;
            self.last = value;
            self.sum = value.as_f64();
            self.is_empty = false;
        } else {
            if value < self.min {
                self.min = value;
            }
            if value > self.max {
                self.max = value;
            }
            self.last = value;
            self.sum += value.as_f64();
        }
    }

    /// Folds a later region's roll-up in; `other` must have been accumulated
    /// after `self`.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty {
            return;
        }
        if self.is_empty {
            *self = other.clone();
            return;
        }
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.last = other.last;
        self.sum += other.sum;
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.min.to_be_bytes().as_ref());
        out.extend_from_slice(self.max.to_be_bytes().as_ref());
        out.extend_from_slice(self.first.to_be_bytes().as_ref());
        out.extend_from_slice(self.last.to_be_bytes().as_ref());
        out.extend_from_slice(&self.sum.to_be_bytes());
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let min = T::read_from(reader)?;
        let max = T::read_from(reader)?;
        let first = T::read_from(reader)?;
        let last = T::read_from(reader)?;
        let sum = f64::read_from(reader)?;
        Ok(Self {
            min,
            max,
            first,
            last,
            sum,
            is_empty: false,
        })
    }

    pub fn serialized_size() -> usize {
        4 * std::mem::size_of::<T>() + 8
    }
}

impl<T: StatNative> Default for PrimitiveStatistics<T> {
    fn default() -> Self {
        Self::new()
    }
}
