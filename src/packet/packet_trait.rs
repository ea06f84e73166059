use crate::types::Tag;

/// Common behaviour of all parsed packets.
pub trait Packet {
    fn tag(&self) -> Tag;
}
