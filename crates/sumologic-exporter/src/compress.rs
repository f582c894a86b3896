// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Payload compression applied right before a payload is sent.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use flate2::write::{DeflateEncoder, GzEncoder};
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::error::ConfigError;

const ZSTD_COMPRESSION_LEVEL: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    None,
    #[default]
    Gzip,
    Deflate,
    Zstd,
}

impl Compression {
    /// Value of the `Content-Encoding` header, if any.
    #[must_use]
    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gzip"),
            Compression::Deflate => Some("deflate"),
            Compression::Zstd => Some("zstd"),
        }
    }

    pub fn compress(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Compression::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::best());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Compression::Zstd => {
                let mut encoder = ZstdEncoder::new(Vec::new(), ZSTD_COMPRESSION_LEVEL)?;
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }
}

impl FromStr for Compression {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "deflate" => Ok(Compression::Deflate),
            "zstd" => Ok(Compression::Zstd),
            _ => Err(ConfigError::UnknownCompression(s.to_string())),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content_encoding().unwrap_or("none"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::{DeflateDecoder, GzDecoder};
    use std::io::Read;

    const MESSAGE: &str = "This is an example log";

    #[test]
    fn test_compress_gzip() {
        let data = Compression::Gzip.compress(MESSAGE.as_bytes()).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(&data[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, MESSAGE);
    }

    #[test]
    fn test_compress_deflate() {
        let data = Compression::Deflate.compress(MESSAGE.as_bytes()).unwrap();

        let mut decoded = String::new();
        DeflateDecoder::new(&data[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, MESSAGE);
    }

    #[test]
    fn test_compress_zstd() {
        let data = Compression::Zstd.compress(MESSAGE.as_bytes()).unwrap();

        let decoded = zstd::stream::decode_all(&data[..]).unwrap();
        assert_eq!(decoded, MESSAGE.as_bytes());
    }

    #[test]
    fn test_no_compression_is_identity() {
        let data = Compression::None.compress(MESSAGE.as_bytes()).unwrap();
        assert_eq!(data, MESSAGE.as_bytes());
        assert_eq!(Compression::None.content_encoding(), None);
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!(Compression::from_str("GZIP").unwrap(), Compression::Gzip);
        assert_eq!(Compression::from_str("deflate").unwrap(), Compression::Deflate);
        assert_eq!(Compression::from_str("").unwrap(), Compression::None);
        assert!(matches!(
            Compression::from_str("brotli"),
            Err(ConfigError::UnknownCompression(_))
        ));
    }
}
