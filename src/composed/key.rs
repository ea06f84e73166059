use bytes::Bytes;
use log::{debug, warn};

use crate::armor::{self, BlockType, Headers};
use crate::errors::{Error, Result};
use crate::packet::{PacketParser, SecretKey};
use crate::types::{KeyId, Tag};

/// A transferable secret key: the primary key and its secret subkeys.
///
/// User IDs, signatures and any other packets of the key are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKeyBlock {
    primary: SecretKey,
    subkeys: Vec<SecretKey>,
}

impl SecretKeyBlock {
    /// Parses a single armored `PGP PRIVATE KEY BLOCK`.
    pub fn from_armor_single(input: &[u8]) -> Result<(Self, Headers)> {
        let armored = armor::unarmor(input)?;
        if armored.typ != BlockType::PrivateKey {
            return Err(Error::MalformedArmor {
                context: format!("expected {}, found {}", BlockType::PrivateKey, armored.typ),
            });
        }

        let key = Self::from_bytes(armored.body)?;
        Ok((key, armored.headers))
    }

    /// Parses a binary key. The first secret key packet is the primary key.
    pub fn from_bytes(input: impl Into<Bytes>) -> Result<Self> {
        let mut primary = None;
        let mut subkeys = Vec::new();

        for packet in PacketParser::new(input) {
            let (header, body) = packet?;
            match header.tag() {
                Tag::SecretKey if primary.is_none() => {
                    primary = Some(SecretKey::from_body(body)?);
                }
                Tag::SecretKey => {
                    warn!("ignoring everything after a second primary key");
                    break;
                }
                Tag::SecretSubkey if primary.is_some() => {
                    subkeys.push(SecretKey::subkey_from_body(body)?);
                }
                Tag::SecretSubkey => {
                    crate::malformed_err!("secret subkey before the primary key");
                }
                tag => debug!("skipping {:?} packet in key", tag),
            }
        }

        let Some(primary) = primary else {
            crate::malformed_err!("no secret key packet found");
        };

        Ok(SecretKeyBlock { primary, subkeys })
    }

    pub fn primary(&self) -> &SecretKey {
        &self.primary
    }

    pub fn subkeys(&self) -> &[SecretKey] {
        &self.subkeys
    }

    /// The primary key followed by the subkeys.
    pub fn keys(&self) -> impl Iterator<Item = &SecretKey> {
        std::iter::once(&self.primary).chain(self.subkeys.iter())
    }

    /// Looks up the primary key or a subkey by its key ID.
    pub fn find(&self, key_id: &KeyId) -> Option<&SecretKey> {
        self.keys().find(|key| &key.key_id() == key_id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;
    use crate::errors::ErrorKind;
    use crate::packet::PacketHeader;
    use crate::ser::Serialize;

    // DSA toy keys, unprotected, differing in their creation time
    fn toy_key(tag: Tag, created: u8) -> Vec<u8> {
        let mut body = hex!("04 5f0000 00 11 0005 17 0004 0b 0003 04 0005 12 00 0002 03 0005").to_vec();
        body[4] = created;
        let mut out = PacketHeader::new_fixed(tag, body.len() as u32)
            .to_bytes()
            .unwrap();
        out.extend_from_slice(&body);
        out
    }

    fn user_id() -> Vec<u8> {
        let mut out = vec![0xCD, 0x03];
        out.extend_from_slice(b"toy");
        out
    }

    #[test]
    fn primary_and_subkeys() {
        let mut data = toy_key(Tag::SecretKey, 1);
        data.extend(user_id());
        data.extend(toy_key(Tag::SecretSubkey, 2));
        data.extend(toy_key(Tag::SecretSubkey, 3));

        let block = SecretKeyBlock::from_bytes(data).unwrap();
        assert_eq!(block.subkeys().len(), 2);
        assert!(!block.primary().is_subkey());
        assert_eq!(block.keys().count(), 3);

        for key in block.keys() {
            assert_eq!(block.find(&key.key_id()).unwrap(), key);
        }
        assert!(block.find(&KeyId::from([0xAA; 8])).is_none());
    }

    #[test]
    fn missing_primary() {
        let err = SecretKeyBlock::from_bytes(user_id()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);

        let err = SecretKeyBlock::from_bytes(toy_key(Tag::SecretSubkey, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);
    }

    #[test]
    fn armor_type_is_checked() {
        let mut armored = Vec::new();
        armor::write(&toy_key(Tag::SecretKey, 1), BlockType::Message, None, &mut armored).unwrap();
        let err = SecretKeyBlock::from_armor_single(&armored).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedArmor);

        let mut armored = Vec::new();
        armor::write(&toy_key(Tag::SecretKey, 1), BlockType::PrivateKey, None, &mut armored)
            .unwrap();
        let (block, headers) = SecretKeyBlock::from_armor_single(&armored).unwrap();
        assert!(headers.is_empty());
        assert!(block.subkeys().is_empty());
    }
}
