use std::io::{self, Read};

use bytes::Bytes;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::{Error, Result};
use crate::packet::Packet;
use crate::parsing::ByteCursor;
use crate::types::Tag;

/// Available compression algorithms.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.3>
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CompressionAlgorithm {
    Uncompressed = 0,
    ZIP = 1,
    ZLIB = 2,
    BZip2 = 3,

    #[num_enum(catch_all)]
    Other(u8),
}

/// Compressed Data Packet
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.6>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    compression_algorithm: CompressionAlgorithm,
    #[debug("{} bytes", compressed_data.len())]
    compressed_data: Bytes,
}

pub enum Decompressor<R> {
    Uncompressed(R),
    Zip(DeflateDecoder<R>),
    Zlib(ZlibDecoder<R>),
}

impl<R: Read> Read for Decompressor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decompressor::Uncompressed(r) => r.read(buf),
            Decompressor::Zip(r) => r.read(buf),
            Decompressor::Zlib(r) => r.read(buf),
        }
    }
}

impl CompressedData {
    /// Parses a `CompressedData` packet body.
    pub fn from_body(body: Bytes) -> Result<Self> {
        let mut cur = ByteCursor::new(&body);
        let alg = CompressionAlgorithm::from(cur.read_u8("compression algorithm")?);

        Ok(CompressedData {
            compression_algorithm: alg,
            compressed_data: body.slice(1..),
        })
    }

    pub fn compression_algorithm(&self) -> CompressionAlgorithm {
        self.compression_algorithm
    }

    /// A reader producing the decompressed bytes.
    pub fn decompress(&self) -> Result<Decompressor<&[u8]>> {
        match self.compression_algorithm {
            CompressionAlgorithm::Uncompressed => {
                Ok(Decompressor::Uncompressed(&self.compressed_data[..]))
            }
            CompressionAlgorithm::ZIP => Ok(Decompressor::Zip(DeflateDecoder::new(
                &self.compressed_data[..],
            ))),
            CompressionAlgorithm::ZLIB => Ok(Decompressor::Zlib(ZlibDecoder::new(
                &self.compressed_data[..],
            ))),
            CompressionAlgorithm::BZip2 | CompressionAlgorithm::Other(_) => {
                crate::unsupported_err!("compression algorithm {:?}", self.compression_algorithm)
            }
        }
    }

    /// Decompresses everything, failing once more than `limit` bytes come out.
    pub fn decompress_bounded(&self, limit: usize) -> Result<Bytes> {
        let mut out = Vec::new();
        let mut reader = self.decompress()?.take((limit as u64).saturating_add(1));
        reader.read_to_end(&mut out)?;

        if out.len() > limit {
            return Err(Error::MalformedPacket {
                context: format!("decompressed data exceeds the limit of {limit} bytes"),
            });
        }
        debug!(
            "{:?}: {} -> {} bytes",
            self.compression_algorithm,
            self.compressed_data.len(),
            out.len()
        );

        Ok(out.into())
    }
}

impl Packet for CompressedData {
    fn tag(&self) -> Tag {
        Tag::CompressedData
    }
}
