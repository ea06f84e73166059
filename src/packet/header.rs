use std::io;

use byteorder::WriteBytesExt;

use crate::errors::Result;
use crate::malformed_err;
use crate::parsing::ByteCursor;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, PacketLength, Tag};

/// Represents a packet header (RFC 4880, section 4.2).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketHeader {
    version: PacketHeaderVersion,
    tag: Tag,
    length: PacketLength,
}

impl PacketHeader {
    /// Parses a header, the cursor is left at the start of the body.
    pub fn from_cursor(cur: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cur.position();
        let header = cur.read_u8("packet header")?;
        if header & 0b1000_0000 == 0 {
            malformed_err!(
                "packet header octet {:#04x} at offset {} does not have bit 7 set",
                header,
                offset
            );
        }

        if header & 0b0100_0000 != 0 {
            let tag = Tag::from(header & 0b0011_1111);
            let length = PacketLength::from_new_format(cur)?;
            Ok(Self {
                version: PacketHeaderVersion::New,
                tag,
                length,
            })
        } else {
            let tag = Tag::from((header >> 2) & 0b0000_1111);
            let length = PacketLength::from_old_format(cur, header & 0b11)?;
            Ok(Self {
                version: PacketHeaderVersion::Old,
                tag,
                length,
            })
        }
    }

    /// Creates a header, rejecting combinations that cannot be encoded.
    pub fn from_parts(
        version: PacketHeaderVersion,
        tag: Tag,
        length: PacketLength,
    ) -> Result<Self> {
        let tag_id = u8::from(tag);
        match version {
            PacketHeaderVersion::Old => {
                if tag_id > 0b1111 {
                    malformed_err!("tag {} does not fit an old format header", tag_id);
                }
                if length.is_partial() {
                    malformed_err!("partial lengths require a new format header");
                }
            }
            PacketHeaderVersion::New => {
                if tag_id > 0b11_1111 {
                    malformed_err!("tag {} does not fit a new format header", tag_id);
                }
                if length == PacketLength::Indeterminate {
                    malformed_err!("indeterminate lengths require an old format header");
                }
            }
        }
        Ok(Self {
            version,
            tag,
            length,
        })
    }

    /// Shorthand for a new format header with a fixed length.
    pub fn new_fixed(tag: Tag, len: u32) -> Self {
        Self {
            version: PacketHeaderVersion::New,
            tag,
            length: PacketLength::Fixed(len),
        }
    }

    pub fn version(&self) -> PacketHeaderVersion {
        self.version
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn packet_length(&self) -> PacketLength {
        self.length
    }
}

impl Serialize for PacketHeader {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let tag = u8::from(self.tag);
        match self.version {
            PacketHeaderVersion::Old => match self.length {
                PacketLength::Fixed(len) => {
                    if len < 256 {
                        writer.write_u8(0b1000_0000 | (tag << 2))?;
                        writer.write_u8(len as u8)?;
                    } else if len < 65536 {
                        writer.write_u8(0b1000_0001 | (tag << 2))?;
                        writer.write_u16::<byteorder::BigEndian>(len as u16)?;
                    } else {
                        writer.write_u8(0b1000_0010 | (tag << 2))?;
                        writer.write_u32::<byteorder::BigEndian>(len)?;
                    }
                }
                PacketLength::Indeterminate => {
                    writer.write_u8(0b1000_0011 | (tag << 2))?;
                }
                PacketLength::Partial(_) => {
                    malformed_err!("partial lengths require a new format header");
                }
            },
            PacketHeaderVersion::New => {
                writer.write_u8(0b1100_0000 | tag)?;
                self.length.to_writer_new(writer)?;
            }
        }
        Ok(())
    }

    fn write_len(&self) -> usize {
        match self.version {
            PacketHeaderVersion::Old => match self.length {
                PacketLength::Fixed(len) if len < 256 => 2,
                PacketLength::Fixed(len) if len < 65536 => 3,
                PacketLength::Fixed(_) => 5,
                _ => 1,
            },
            PacketHeaderVersion::New => 1 + self.length.write_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::errors::ErrorKind;

    fn parse(bytes: &[u8]) -> PacketHeader {
        PacketHeader::from_cursor(&mut ByteCursor::new(bytes)).unwrap()
    }

    #[test]
    fn old_format_secret_key_header() {
        // as produced by gpg for a 1024 bit RSA secret key
        let header = parse(&[0x95, 0x02, 0x06]);
        assert_eq!(header.version(), PacketHeaderVersion::Old);
        assert_eq!(header.tag(), Tag::SecretKey);
        assert_eq!(header.packet_length(), PacketLength::Fixed(518));
    }

    #[test]
    fn old_format_indeterminate() {
        let header = parse(&[0xA3]);
        assert_eq!(header.tag(), Tag::CompressedData);
        assert_eq!(header.packet_length(), PacketLength::Indeterminate);
    }

    #[test]
    fn new_format_seipd_header() {
        let header = parse(&[0xD2, 0x59]);
        assert_eq!(header.version(), PacketHeaderVersion::New);
        assert_eq!(header.tag(), Tag::SymEncryptedProtectedData);
        assert_eq!(header.packet_length(), PacketLength::Fixed(89));

        let header = parse(&[0xD2, 0xEC]);
        assert_eq!(header.packet_length(), PacketLength::Partial(4096));
    }

    #[test]
    fn bit_seven_required() {
        let err = PacketHeader::from_cursor(&mut ByteCursor::new(&[0x15, 0x00])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);
    }

    #[test]
    fn from_parts_validates() {
        assert!(PacketHeader::from_parts(
            PacketHeaderVersion::Old,
            Tag::SymEncryptedProtectedData,
            PacketLength::Fixed(1)
        )
        .is_err());
        assert!(PacketHeader::from_parts(
            PacketHeaderVersion::New,
            Tag::CompressedData,
            PacketLength::Indeterminate
        )
        .is_err());
        assert!(PacketHeader::from_parts(
            PacketHeaderVersion::Old,
            Tag::CompressedData,
            PacketLength::Indeterminate
        )
        .is_ok());
    }

    #[test]
    fn serialize_parses_back() {
        for header in [
            PacketHeader::from_parts(
                PacketHeaderVersion::Old,
                Tag::SecretKey,
                PacketLength::Fixed(518),
            )
            .unwrap(),
            PacketHeader::from_parts(
                PacketHeaderVersion::Old,
                Tag::LiteralData,
                PacketLength::Fixed(70_000),
            )
            .unwrap(),
            PacketHeader::new_fixed(Tag::LiteralData, 9000),
            PacketHeader::from_parts(
                PacketHeaderVersion::New,
                Tag::LiteralData,
                PacketLength::Partial(512),
            )
            .unwrap(),
        ] {
            let bytes = header.to_bytes().unwrap();
            assert_eq!(bytes.len(), header.write_len());
            assert_eq!(parse(&bytes), header);
        }
    }
}
