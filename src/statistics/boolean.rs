use std::io::Read;

use byteorder::ReadBytesExt;

use crate::error::Result;

/// BOOLEAN roll-up: `min‖max‖first‖last` as four single bytes, no sum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanStatistics {
    pub min: bool,
    pub max: bool,
    pub first: bool,
    pub last: bool,
    pub is_empty: bool,
}

impl BooleanStatistics {
    pub fn new() -> Self {
        Self {
            is_empty: true,
            ..Self::default()
        }
    }

    pub fn update(&mut self, value: bool) {
        if self.is_empty {
            self.min = value;
            self.max = value;
            self.first = value;
            self.last = value;
            self.is_empty = false;
        } else {
            self.min &= value;
            self.max |= value;
            self.last = value;
        }
    }

    pub fn merge(&mut self, other: &Self) {
        if other.is_empty {
            return;
        }
        if self.is_empty {
            *self = other.clone();
            return;
        }
        self.min &= other.min;
        self.max |= other.max;
        self.last = other.last;
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.push(self.min as u8);
        out.push(self.max as u8);
        out.push(self.first as u8);
        out.push(self.last as u8);
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            min: reader.read_u8()? != 0,
            max: reader.read_u8()? != 0,
            first: reader.read_u8()? != 0,
            last: reader.read_u8()? != 0,
            is_empty: false,
        })
    }

    pub fn serialized_size() -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_and_roundtrip() {
        let mut stats = BooleanStatistics::new();
        stats.update(true);
        stats.update(false);
        assert!(!stats.min);
        assert!(stats.max);
        assert!(stats.first);
        assert!(!stats.last);

        let mut out = vec![];
        stats.serialize(&mut out);
        assert_eq!(out, vec![0, 1, 1, 0]);
        let back = BooleanStatistics::deserialize(&mut out.as_slice()).unwrap();
        assert_eq!(back, stats);
    }
}
