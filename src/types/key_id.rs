use std::fmt;

use crate::errors::Result;

/// Represents a Key ID.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct KeyId([u8; 8]);

impl AsRef<[u8]> for KeyId {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; 8]> for KeyId {
    fn from(value: [u8; 8]) -> Self {
        KeyId(value)
    }
}

impl KeyId {
    /// The "anonymous recipient" id used in session key packets.
    pub const WILDCARD: KeyId = KeyId([0u8; 8]);

    pub fn from_slice(input: &[u8]) -> Result<KeyId> {
        crate::ensure!(input.len() == 8, "invalid key id length {}", input.len());
        let mut r = [0u8; 8];
        r.copy_from_slice(input);

        Ok(KeyId(r))
    }

    pub fn is_wildcard(&self) -> bool {
        self == &Self::WILDCARD
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", hex::encode(self.as_ref()))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.as_ref()))
    }
}

/// A v4 key fingerprint, the SHA1 hash of the public key packet.
#[derive(Clone, Copy, Eq, PartialEq, Hash, derive_more::Debug)]
#[debug("Fingerprint({})", hex::encode(_0))]
pub struct Fingerprint([u8; 20]);

impl Fingerprint {
    pub fn new(bytes: [u8; 20]) -> Self {
        Fingerprint(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// The low 64 bits of the fingerprint.
    pub fn key_id(&self) -> KeyId {
        let mut id = [0u8; 8];
        id.copy_from_slice(&self.0[12..]);
        KeyId(id)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;

    use super::*;

    #[test]
    fn key_id_from_fingerprint() {
        let fp = Fingerprint::new(hex!("44D1260ED28C030E3C4E273804A5830AD938364C"));
        assert_eq!(fp.to_string(), "44D1260ED28C030E3C4E273804A5830AD938364C");
        assert_eq!(fp.key_id().to_string(), "04A5830AD938364C");
        assert_eq!(
            fp.key_id(),
            KeyId::from_slice(&hex!("04A5830AD938364C")).unwrap()
        );
        assert!(!fp.key_id().is_wildcard());
        assert!(KeyId::from([0u8; 8]).is_wildcard());
        assert!(KeyId::from_slice(&[1, 2, 3]).is_err());
    }
}
