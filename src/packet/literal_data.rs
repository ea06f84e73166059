use bytes::Bytes;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::errors::Result;
use crate::packet::Packet;
use crate::parsing::ByteCursor;
use crate::types::Tag;

/// Literal Data Packet
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.9>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct LiteralData {
    mode: DataMode,
    #[debug("{:?}", String::from_utf8_lossy(file_name))]
    file_name: Bytes,
    created: u32,
    #[debug("{} bytes", data.len())]
    data: Bytes,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DataMode {
    Binary = b'b',
    Text = b't',
    Utf8 = b'u',
    Mime = b'm',

    #[num_enum(catch_all)]
    Other(u8),
}

impl LiteralData {
    /// Parses a `LiteralData` packet body. The payload stays a view into `body`.
    pub fn from_body(body: Bytes) -> Result<Self> {
        let mut cur = ByteCursor::new(&body);
        let mode = DataMode::from(cur.read_u8("literal data mode")?);
        let name_len = cur.read_u8("literal file name length")?;
        cur.read_take(usize::from(name_len), "literal file name")?;
        let file_name = body.slice(2..cur.position());
        let created = cur.read_be_u32("literal date")?;
        let data = body.slice(cur.position()..);

        Ok(LiteralData {
            mode,
            file_name,
            created,
            data,
        })
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    /// The raw file name, usually but not necessarily UTF-8.
    pub fn file_name(&self) -> &[u8] {
        &self.file_name
    }

    /// Seconds since the epoch, `0` when not set.
    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.mode, DataMode::Binary)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn to_string(&self) -> Option<String> {
        std::str::from_utf8(&self.data).map(str::to_owned).ok()
    }
}

impl Packet for LiteralData {
    fn tag(&self) -> Tag {
        Tag::LiteralData
    }
}
