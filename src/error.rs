/// Errors the core may surface. The set is closed: readers return these from
/// every operation, writers fail fast and stay poisoned with the first one.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Leading or trailing magic mismatch.
    BadMagic(String),
    /// Version byte not in the supported set.
    VersionUnsupported(u8),
    /// Read past end of the file or of a framed region.
    UnexpectedEof(String),
    /// Time and value decoders of one page disagree on length.
    TruncatedPage(String),
    /// Continuation bit still set on the last permitted varint byte.
    MalformedVarInt,
    /// Data type code out of range.
    UnknownDataType(i16),
    /// Encoding code out of range, or an (encoding, data type) pair with no codec.
    UnknownEncoding(i16),
    /// Compression code out of range or not compiled in.
    UnknownCompression(i16),
    /// DataPoint for a sensor that is not in the schema.
    UnknownSensor(String),
    /// PageWriter or ChunkWriter flushed with no rows.
    NoDataToFlush,
    /// Structural invariant violation discovered mid-parse or mid-write.
    Corrupt(String),
    /// Underlying I/O failure. The only retryable kind.
    Io(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadMagic(message) => write!(fmt, "bad magic: {}", message),
            Error::VersionUnsupported(version) => {
                write!(fmt, "unsupported file version {}", version)
            }
            Error::UnexpectedEof(message) => write!(fmt, "unexpected end of file: {}", message),
            Error::TruncatedPage(message) => write!(fmt, "truncated page: {}", message),
            Error::MalformedVarInt => write!(fmt, "malformed varint"),
            Error::UnknownDataType(code) => write!(fmt, "unknown data type {}", code),
            Error::UnknownEncoding(code) => write!(fmt, "unknown encoding {}", code),
            Error::UnknownCompression(code) => write!(fmt, "unknown compression {}", code),
            Error::UnknownSensor(sensor) => write!(fmt, "sensor {:?} not in schema", sensor),
            Error::NoDataToFlush => write!(fmt, "no data to flush"),
            Error::Corrupt(message) => write!(fmt, "corrupt: {}", message),
            Error::Io(message) => write!(fmt, "underlying IO error: {}", message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof(e.to_string())
        } else {
            Error::Io(e.to_string())
        }
    }
}

#[cfg(feature = "snappy")]
impl From<snap::Error> for Error {
    fn from(e: snap::Error) -> Error {
        Error::Io(format!("underlying snap error: {}", e))
    }
}

/// A specialized `Result` for TsFile errors.
pub type Result<T> = std::result::Result<T, Error>;
