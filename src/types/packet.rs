use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;
use crate::parsing::ByteCursor;
use crate::ser::Serialize;

/// Represents the packet length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketLength {
    Fixed(u32),
    /// Old format length type 3: the packet extends to the end of the input.
    Indeterminate,
    /// One chunk of a partial body; more chunks follow.
    Partial(u32),
}

impl PacketLength {
    /// Returns how many bytes encoding the given length as fixed encoding would need.
    pub fn fixed_encoding_len(len: u32) -> usize {
        if len < 192 {
            1
        } else if len < 8384 {
            2
        } else {
            1 + 4
        }
    }

    /// Reads a new format (RFC 4880, section 4.2.2) length.
    pub fn from_new_format(cur: &mut ByteCursor<'_>) -> Result<Self> {
        let olen = cur.read_u8("packet length")?;
        let len = match olen {
            // One-Octet Lengths
            0..=191 => PacketLength::Fixed(olen.into()),
            // Two-Octet Lengths
            192..=223 => {
                let a = cur.read_u8("two octet packet length")?;
                let l = ((u32::from(olen) - 192) << 8) + 192 + u32::from(a);
                PacketLength::Fixed(l)
            }
            // Partial Body Lengths
            224..=254 => PacketLength::Partial(1 << (olen & 0x1F)),
            // Five-Octet Lengths
            255 => PacketLength::Fixed(cur.read_be_u32("five octet packet length")?),
        };
        Ok(len)
    }

    /// Reads an old format length, `length_type` being the low two bits of the header octet.
    pub fn from_old_format(cur: &mut ByteCursor<'_>, length_type: u8) -> Result<Self> {
        let len = match length_type & 0b11 {
            0 => PacketLength::Fixed(cur.read_u8("old format packet length")?.into()),
            1 => PacketLength::Fixed(cur.read_be_u16("old format packet length")?.into()),
            2 => PacketLength::Fixed(cur.read_be_u32("old format packet length")?),
            _ => PacketLength::Indeterminate,
        };
        Ok(len)
    }

    /// Returns the length in bytes, if it is specified.
    pub fn maybe_len(&self) -> Option<u32> {
        match self {
            Self::Fixed(len) => Some(*len),
            Self::Indeterminate => None,
            Self::Partial(len) => Some(*len),
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    pub fn to_writer_new<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            PacketLength::Fixed(len) => {
                if *len < 192 {
                    writer.write_u8(*len as u8)?;
                } else if *len < 8384 {
                    writer.write_u8((((len - 192) >> 8) + 192) as u8)?;
                    writer.write_u8(((len - 192) & 0xFF) as u8)?;
                } else {
                    writer.write_u8(255)?;
                    writer.write_u32::<BigEndian>(*len)?;
                }
            }
            PacketLength::Indeterminate => {
                crate::bail!("indeterminate length in a new format packet header");
            }
            PacketLength::Partial(len) => {
                crate::ensure!(
                    len.count_ones() == 1 && *len <= 1 << 30,
                    "partial length {} is not a power of two",
                    len
                );
                let n = len.trailing_zeros();
                writer.write_u8((224 + n) as u8)?;
            }
        }
        Ok(())
    }
}

impl Serialize for PacketLength {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        self.to_writer_new(writer)
    }

    fn write_len(&self) -> usize {
        match self {
            Self::Fixed(len) => Self::fixed_encoding_len(*len),
            Self::Indeterminate => 0,
            Self::Partial(_) => 1,
        }
    }
}

/// Packet tag as defined in RFC 4880, section 4.3.
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Tag {
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey = 1,
    /// Signature Packet
    Signature = 2,
    /// Symmetric-Key Encrypted Session Key Packet
    SymKeyEncryptedSessionKey = 3,
    /// One-Pass Signature Packet
    OnePassSignature = 4,
    /// Secret-Key Packet
    SecretKey = 5,
    /// Public-Key Packet
    PublicKey = 6,
    /// Secret-Subkey Packet
    SecretSubkey = 7,
    /// Compressed Data Packet
    CompressedData = 8,
    /// Symmetrically Encrypted Data Packet
    SymEncryptedData = 9,
    /// Marker Packet
    Marker = 10,
    /// Literal Data Packet
    LiteralData = 11,
    /// Trust Packet
    Trust = 12,
    /// User ID Packet
    UserId = 13,
    /// Public-Subkey Packet
    PublicSubkey = 14,
    /// User Attribute Packet
    UserAttribute = 17,
    /// Sym. Encrypted and Integrity Protected Data Packet
    SymEncryptedProtectedData = 18,
    /// Modification Detection Code Packet
    ModDetectionCode = 19,

    #[num_enum(catch_all)]
    Other(u8),
}

/// The two packet header formats.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketHeaderVersion {
    /// Old format, tags 0..=15.
    Old,
    /// New format, tags 0..=63.
    New,
}
