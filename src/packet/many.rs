use bytes::{Bytes, BytesMut};
use log::{debug, warn};

use crate::errors::Result;
use crate::packet::PacketHeader;
use crate::parsing::ByteCursor;
use crate::types::PacketLength;

/// Iterates over the packets in a buffer, yielding each header with its body.
///
/// Bodies with fixed lengths are zero copy slices of the input, partial
/// bodies are joined into one buffer. Iteration stops after the first error.
#[derive(Debug)]
pub struct PacketParser {
    data: Bytes,
    offset: usize,
    failed: bool,
}

impl PacketParser {
    pub fn new(data: impl Into<Bytes>) -> Self {
        PacketParser {
            data: data.into(),
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next packet in the input.
    pub fn position(&self) -> usize {
        self.offset
    }

    fn next_packet(&mut self) -> Result<(PacketHeader, Bytes)> {
        let data = self.data.clone();
        let mut cur = ByteCursor::new(&data[self.offset..]);
        let header = PacketHeader::from_cursor(&mut cur)?;
        let start = self.offset;

        let body = match header.packet_length() {
            PacketLength::Fixed(len) => {
                let body_start = start + cur.position();
                cur.read_take(len as usize, "packet body")?;
                data.slice(body_start..start + cur.position())
            }
            PacketLength::Indeterminate => {
                let body_start = start + cur.position();
                cur.rest();
                data.slice(body_start..)
            }
            PacketLength::Partial(len) => {
                let mut body = BytesMut::with_capacity((len as usize).min(cur.remaining()));
                let mut chunk_len = len;
                loop {
                    body.extend_from_slice(cur.read_take(chunk_len as usize, "partial body")?);
                    match PacketLength::from_new_format(&mut cur)? {
                        PacketLength::Partial(len) => chunk_len = len,
                        PacketLength::Fixed(len) => {
                            body.extend_from_slice(cur.read_take(len as usize, "partial body")?);
                            break;
                        }
                        PacketLength::Indeterminate => {
                            crate::malformed_err!("indeterminate length inside a partial body");
                        }
                    }
                }
                body.freeze()
            }
        };

        self.offset = start + cur.position();
        debug!(
            "packet {:?} at offset {}, {} body bytes",
            header.tag(),
            start,
            body.len()
        );

        Ok((header, body))
    }
}

impl Iterator for PacketParser {
    type Item = Result<(PacketHeader, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        let res = self.next_packet();
        if let Err(ref err) = res {
            warn!("stopping packet parsing at offset {}: {}", self.offset, err);
            self.failed = true;
        }

        Some(res)
    }
}
