use std::io::Read;

use crate::error::{Error, Result};
use crate::io::{read_string_binary, write_string_binary};

/// TEXT roll-up: `min‖max‖first‖last` as four 4-byte-length-prefixed
/// binaries, no sum. Ordering is lexicographic over the UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStatistics {
    pub min: String,
    pub max: String,
    pub first: String,
    pub last: String,
    pub is_empty: bool,
}

impl TextStatistics {
    pub fn new() -> Self {
        Self {
            is_empty: true,
            ..Self::default()
        }
    }

    pub fn update(&mut self, value: &str) {
        if self.is_empty {
            self.min = value.to_string();
            self.max = value.to_string();
            self.first = value.to_string();
            self.last = value.to_string();
            self.is_empty = false;
        } else {
            if value < self.min.as_str() {
                self.min = value.to_string();
            }
            if value > self.max.as_str() {
                self.max = value.to_string();
            }
            self.last = value.to_string();
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
        if other.min < self.min {
            self.min = other.min.clone();
        }
        if other.max > self.max {
            self.max = other.max.clone();
        }
        self.last = other.last.clone();
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        write_string_binary(self.min.as_bytes(), out);
        write_string_binary(self.max.as_bytes(), out);
        write_string_binary(self.first.as_bytes(), out);
        write_string_binary(self.last.as_bytes(), out);
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let mut field = |name: &str| -> Result<String> {
            String::from_utf8(read_string_binary(reader)?)
                .map_err(|e| Error::Corrupt(format!("TEXT {} statistic is not UTF-8: {}", name, e)))
        };
        let min = field("min")?;
        let max = field("max")?;
        let first = field("first")?;
        let last = field("last")?;
        Ok(Self {
            min,
            max,
            first,
            last,
            is_empty: false,
        })
    }

    pub fn serialized_size(&self) -> usize {
        16 + self.min.len() + self.max.len() + self.first.len() + self.last.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_roll_up() {
        let mut stats = TextStatistics::new();
        stats.update("pump");
        stats.update("fan");
        stats.update("valve");
        assert_eq!(stats.min, "fan");
        assert_eq!(stats.max, "valve");
        assert_eq!(stats.first, "pump");
        assert_eq!(stats.last, "valve");

        let mut out = vec![];
        stats.serialize(&mut out);
        assert_eq!(out.len(), stats.serialized_size());
        let back = TextStatistics::deserialize(&mut out.as_slice()).unwrap();
        assert_eq!(back, stats);
    }
}
