//! Per-page and per-chunk roll-ups, updated as values are appended and
//! serialized into page headers and chunk digests.

mod boolean;
mod primitive;
mod text;

pub use boolean::BooleanStatistics;
pub use primitive::{PrimitiveStatistics, StatNative};
pub use text::TextStatistics;

use std::io::Read;

use crate::error::{Error, Result};
use crate::types::{DataType, Value};

/// Statistics tagged by data type. The wire layout is the concatenation
/// `min‖max‖first‖last‖sum` for numeric types (`sum` always f64); BOOLEAN
/// and TEXT omit the sum.
#[derive(Debug, Clone, PartialEq)]
pub enum Statistics {
    Boolean(BooleanStatistics),
    Int32(PrimitiveStatistics<i32>),
    Int64(PrimitiveStatistics<i64>),
    Float(PrimitiveStatistics<f32>),
    Double(PrimitiveStatistics<f64>),
    Text(TextStatistics),
}

impl Statistics {
    pub fn new(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => Statistics::Boolean(BooleanStatistics::new()),
            DataType::Int32 => Statistics::Int32(PrimitiveStatistics::new()),
            DataType::Int64 => Statistics::Int64(PrimitiveStatistics::new()),
            DataType::Float => Statistics::Float(PrimitiveStatistics::new()),
            DataType::Double => Statistics::Double(PrimitiveStatistics::new()),
            DataType::Text => Statistics::Text(TextStatistics::new()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Statistics::Boolean(_) => DataType::Boolean,
            Statistics::Int32(_) => DataType::Int32,
            Statistics::Int64(_) => DataType::Int64,
            Statistics::Float(_) => DataType::Float,
            Statistics::Double(_) => DataType::Double,
            Statistics::Text(_) => DataType::Text,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Statistics::Boolean(s) => s.is_empty,
            Statistics::Int32(s) => s.is_empty,
            Statistics::Int64(s) => s.is_empty,
            Statistics::Float(s) => s.is_empty,
            Statistics::Double(s) => s.is_empty,
            Statistics::Text(s) => s.is_empty,
        }
    }

    /// Folds one value in; the value's tag must match.
    pub fn update(&mut self, value: &Value) -> Result<()> {
        match (self, value) {
            (Statistics::Boolean(s), Value::Boolean(v)) => s.update(*v),
            (Statistics::Int32(s), Value::Int32(v)) => s.update(*v),
            (Statistics::Int64(s), Value::Int64(v)) => s.update(*v),
            (Statistics::Float(s), Value::Float(v)) => s.update(*v),
            (Statistics::Double(s), Value::Double(v)) => s.update(*v),
            (Statistics::Text(s), Value::Text(v)) => s.update(v),
            (stats, value) => {
                return Err(Error::Corrupt(format!(
                    "statistics for {:?} updated with a {:?} value",
                    stats.data_type(),
                    value.data_type()
                )))
            }
        }
        Ok(())
    }

    /// Folds a later region's roll-up in.
    pub fn merge(&mut self, other: &Statistics) -> Result<()> {
        match (self, other) {
            (Statistics::Boolean(a), Statistics::Boolean(b)) => a.merge(b),
            (Statistics::Int32(a), Statistics::Int32(b)) => a.merge(b),
            (Statistics::Int64(a), Statistics::Int64(b)) => a.merge(b),
            (Statistics::Float(a), Statistics::Float(b)) => a.merge(b),
            (Statistics::Double(a), Statistics::Double(b)) => a.merge(b),
            (Statistics::Text(a), Statistics::Text(b)) => a.merge(b),
            (a, b) => {
                return Err(Error::Corrupt(format!(
                    "statistics for {:?} merged with statistics for {:?}",
                    a.data_type(),
                    b.data_type()
                )))
            }
        }
        Ok(())
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        match self {
            Statistics::Boolean(s) => s.serialize(out),
            Statistics::Int32(s) => s.serialize(out),
            Statistics::Int64(s) => s.serialize(out),
            Statistics::Float(s) => s.serialize(out),
            Statistics::Double(s) => s.serialize(out),
            Statistics::Text(s) => s.serialize(out),
        }
    }

    pub fn deserialize<R: Read>(reader: &mut R, data_type: DataType) -> Result<Self> {
        Ok(match data_type {
            DataType::Boolean => Statistics::Boolean(BooleanStatistics::deserialize(reader)?),
            DataType::Int32 => Statistics::Int32(PrimitiveStatistics::deserialize(reader)?),
            DataType::Int64 => Statistics::Int64(PrimitiveStatistics::deserialize(reader)?),
            DataType::Float => Statistics::Float(PrimitiveStatistics::deserialize(reader)?),
            DataType::Double => Statistics::Double(PrimitiveStatistics::deserialize(reader)?),
            DataType::Text => Statistics::Text(TextStatistics::deserialize(reader)?),
        })
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            Statistics::Boolean(_) => BooleanStatistics::serialized_size(),
            Statistics::Int32(_) => PrimitiveStatistics::<i32>::serialized_size(),
            Statistics::Int64(_) => PrimitiveStatistics::<i64>::serialized_size(),
            Statistics::Float(_) => PrimitiveStatistics::<f32>::serialized_size(),
            Statistics::Double(_) => PrimitiveStatistics::<f64>::serialized_size(),
            Statistics::Text(s) => s.serialized_size(),
        }
    }

    pub fn min_bytes(&self) -> Vec<u8> {
        match self {
            Statistics::Boolean(s) => vec![s.min as u8],
            Statistics::Int32(s) => s.min.to_be_bytes().to_vec(),
            Statistics::Int64(s) => s.min.to_be_bytes().to_vec(),
            Statistics::Float(s) => s.min.to_be_bytes().to_vec(),
            Statistics::Double(s) => s.min.to_be_bytes().to_vec(),
            Statistics::Text(s) => s.min.as_bytes().to_vec(),
        }
    }

    pub fn max_bytes(&self) -> Vec<u8> {
        match self {
            Statistics::Boolean(s) => vec![s.max as u8],
            Statistics::Int32(s) => s.max.to_be_bytes().to_vec(),
            Statistics::Int64(s) => s.max.to_be_bytes().to_vec(),
            Statistics::Float(s) => s.max.to_be_bytes().to_vec(),
            Statistics::Double(s) => s.max.to_be_bytes().to_vec(),
            Statistics::Text(s) => s.max.as_bytes().to_vec(),
        }
    }

    pub fn first_bytes(&self) -> Vec<u8> {
        match self {
            Statistics::Boolean(s) => vec![s.first as u8],
            Statistics::Int32(s) => s.first.to_be_bytes().to_vec(),
            Statistics::Int64(s) => s.first.to_be_bytes().to_vec(),
            Statistics::Float(s) => s.first.to_be_bytes().to_vec(),
            Statistics::Double(s) => s.first.to_be_bytes().to_vec(),
            Statistics::Text(s) => s.first.as_bytes().to_vec(),
        }
    }

    pub fn last_bytes(&self) -> Vec<u8> {
        match self {
            Statistics::Boolean(s) => vec![s.last as u8],
            Statistics::Int32(s) => s.last.to_be_bytes().to_vec(),
            Statistics::Int64(s) => s.last.to_be_bytes().to_vec(),
            Statistics::Float(s) => s.last.to_be_bytes().to_vec(),
            Statistics::Double(s) => s.last.to_be_bytes().to_vec(),
            Statistics::Text(s) => s.last.as_bytes().to_vec(),
        }
    }

    /// BigEndian f64 sum for numeric types, `None` for BOOLEAN and TEXT whose
    /// layout omits the sum.
    pub fn sum_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Statistics::Boolean(_) | Statistics::Text(_) => None,
            Statistics::Int32(s) => Some(s.sum.to_be_bytes().to_vec()),
            Statistics::Int64(s) => Some(s.sum.to_be_bytes().to_vec()),
            Statistics::Float(s) => Some(s.sum.to_be_bytes().to_vec()),
            Statistics::Double(s) => Some(s.sum.to_be_bytes().to_vec()),
        }
    }
}
