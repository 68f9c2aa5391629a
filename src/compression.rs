use std::convert::TryFrom;

use crate::error::{Error, Result};

/// Page-level compression kinds. Wire codes follow the original table, so
/// codes of kinds this crate does not implement still parse as unknown
/// rather than shifting the known ones.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum Compression {
    Uncompressed,
    Snappy,
    Gzip,
    Lzo,
    Lz4,
}

impl TryFrom<i16> for Compression {
    type Error = Error;

    fn try_from(code: i16) -> Result<Self> {
        Ok(match code {
            0 => Compression::Uncompressed,
            1 => Compression::Snappy,
            2 => Compression::Gzip,
            3 => Compression::Lzo,
            7 => Compression::Lz4,
            _ => return Err(Error::UnknownCompression(code)),
        })
    }
}

impl From<Compression> for i16 {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Uncompressed => 0,
            Compression::Snappy => 1,
            Compression::Gzip => 2,
            Compression::Lzo => 3,
            Compression::Lz4 => 7,
        }
    }
}

/// Compression codec interface. Codecs are exclusively owned by their caller
/// and carry no state between invocations.
pub trait Codec: std::fmt::Debug {
    /// Compresses `input_buf` and appends the result to `output_buf`.
    fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()>;

    /// Decompresses `input_buf` into `output_buf`, whose length must equal
    /// the uncompressed size declared by the page header.
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()>;
}

/// Returns the codec for `compression`, or `None` for `Uncompressed`.
pub fn create_codec(compression: &Compression) -> Result<Option<Box<dyn Codec>>> {
    match *compression {
        #[cfg(feature = "snappy")]
        Compression::Snappy => Ok(Some(Box::new(SnappyCodec::new()))),
        #[cfg(feature = "gzip")]
        Compression::Gzip => Ok(Some(Box::new(GZipCodec::new()))),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => Ok(Some(Box::new(Lz4Codec::new()))),
        Compression::Uncompressed => Ok(None),
        _ => Err(Error::UnknownCompression(i16::from(*compression))),
    }
}

/// Compresses a sealed page payload, returning `input` unchanged for
/// `Uncompressed`.
pub(crate) fn compress(compression: Compression, input: Vec<u8>) -> Result<Vec<u8>> {
    match create_codec(&compression)? {
        None => Ok(input),
        Some(mut codec) => {
            let mut output = Vec::with_capacity(input.len());
            codec.compress(&input, &mut output)?;
            Ok(output)
        }
    }
}

/// Decompresses a page payload into `uncompressed_size` bytes.
pub(crate) fn decompress(
    compression: Compression,
    input: Vec<u8>,
    uncompressed_size: usize,
) -> Result<Vec<u8>> {
    match create_codec(&compression)? {
        None => Ok(input),
        Some(mut codec) => {
            let mut output = vec![0u8; uncompressed_size];
            codec.decompress(&input, &mut output)?;
            Ok(output)
        }
    }
}

#[cfg(feature = "snappy")]
mod snappy_codec {
    use snap::raw::{decompress_len, max_compress_len, Decoder, Encoder};

    use super::Codec;
    use crate::error::{Error, Result};

    /// Codec for the Snappy block format.
    #[derive(Debug)]
    pub struct SnappyCodec {
        decoder: Decoder,
        encoder: Encoder,
    }

    impl SnappyCodec {
        pub(crate) fn new() -> Self {
            Self {
                decoder: Decoder::new(),
                encoder: Encoder::new(),
            }
        }
    }

    impl Codec for SnappyCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let length = decompress_len(input_buf)?;
            if length > output_buf.len() {
                return Err(Error::Corrupt(format!(
                    "snappy payload inflates to {} bytes but the header declares {}",
                    length,
                    output_buf.len()
                )));
            }
            self.decoder
                .decompress(input_buf, output_buf)
                .map_err(|e| e.into())
                .map(|_| ())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let output_buf_len = output_buf.len();
            let required_len = max_compress_len(input_buf.len());
            output_buf.resize(output_buf_len + required_len, 0);
            let n = self
                .encoder
                .compress(input_buf, &mut output_buf[output_buf_len..])?;
            output_buf.truncate(output_buf_len + n);
            Ok(())
        }
    }
}
#[cfg(feature = "snappy")]
pub use snappy_codec::*;

#[cfg(feature = "gzip")]
mod gzip_codec {
    use std::io::{Read, Write};

    use flate2::{read, write, Compression};

    use super::Codec;
    use crate::error::Result;

    /// Codec for the GZIP format.
    #[derive(Debug)]
    pub struct GZipCodec {}

    impl GZipCodec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for GZipCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let mut decoder = read::GzDecoder::new(input_buf);
            decoder.read_exact(output_buf).map_err(|e| e.into())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = write::GzEncoder::new(output_buf, Compression::default());
            encoder.write_all(input_buf)?;
            encoder.try_finish().map_err(|e| e.into())
        }
    }
}
#[cfg(feature = "gzip")]
pub use gzip_codec::*;

#[cfg(feature = "lz4")]
mod lz4_codec {
    use super::Codec;
    use crate::error::{Error, Result};

    /// Codec for the LZ4 block format with a prepended size.
    #[derive(Debug)]
    pub struct Lz4Codec {}

    impl Lz4Codec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for Lz4Codec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let decompressed = lz4_flex::decompress_size_prepended(input_buf)
                .map_err(|e| Error::Io(format!("underlying lz4 error: {}", e)))?;
            if decompressed.len() != output_buf.len() {
                return Err(Error::Corrupt(format!(
                    "lz4 payload inflates to {} bytes but the header declares {}",
                    decompressed.len(),
                    output_buf.len()
                )));
            }
            output_buf.copy_from_slice(&decompressed);
            Ok(())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            output_buf.extend_from_slice(&lz4_flex::compress_prepend_size(input_buf));
            Ok(())
        }
    }
}
#[cfg(feature = "lz4")]
pub use lz4_codec::*;
