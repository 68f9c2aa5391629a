use std::convert::TryFrom;

use crate::error::Error;

/// The closed set of primitive data types a sensor may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Text,
}

impl DataType {
    /// Width in bytes of one plain-encoded value, `None` for TEXT which is
    /// length-prefixed.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            DataType::Boolean => Some(1),
            DataType::Int32 => Some(4),
            DataType::Int64 => Some(8),
            DataType::Float => Some(4),
            DataType::Double => Some(8),
            DataType::Text => None,
        }
    }
}

impl TryFrom<i16> for DataType {
    type Error = Error;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => DataType::Boolean,
            1 => DataType::Int32,
            2 => DataType::Int64,
            3 => DataType::Float,
            4 => DataType::Double,
            5 => DataType::Text,
            _ => return Err(Error::UnknownDataType(code)),
        })
    }
}

impl From<DataType> for i16 {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => 0,
            DataType::Int32 => 1,
            DataType::Int64 => 2,
            DataType::Float => 3,
            DataType::Double => 4,
            DataType::Text => 5,
        }
    }
}

/// A single sensor value, tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Text(_) => DataType::Text,
        }
    }
}

/// A physical native representation of a fixed-width value.
pub trait NativeType: Sized + Copy + std::fmt::Debug + Default {
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    fn to_be_bytes(&self) -> Self::Bytes;

    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! native {
    ($type:ty) => {
        impl NativeType for $type {
            type Bytes = [u8; std::mem::size_of::<Self>()];

            #[inline]
            fn to_be_bytes(&self) -> Self::Bytes {
                Self::to_be_bytes(*self)
            }

            #[inline]
            fn from_be_bytes(bytes: Self::Bytes) -> Self {
                Self::from_be_bytes(bytes)
            }
        }
    };
}

native!(i32);
native!(i64);
native!(f32);
native!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_codes_roundtrip() {
        for code in 0i16..6 {
            let data_type = DataType::try_from(code).unwrap();
            assert_eq!(i16::from(data_type), code);
        }
        assert_eq!(DataType::try_from(6), Err(Error::UnknownDataType(6)));
        assert_eq!(DataType::try_from(-1), Err(Error::UnknownDataType(-1)));
    }

    #[test]
    fn value_tags() {
        assert_eq!(Value::Int32(1).data_type(), DataType::Int32);
        assert_eq!(Value::Text("a".to_string()).data_type(), DataType::Text);
    }
}
