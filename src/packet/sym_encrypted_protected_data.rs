use std::io;

use byteorder::WriteBytesExt;
use bytes::Bytes;
use rand::{CryptoRng, Rng};

use crate::errors::Result;
use crate::packet::Packet;
use crate::parsing::ByteCursor;
use crate::ser::Serialize;
use crate::types::{PlainSessionKey, Tag};

/// Symmetrically Encrypted Integrity Protected Data Packet, version 1
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.13>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct SymEncryptedProtectedData {
    #[debug("{} bytes", data.len())]
    data: Bytes,
}

impl SymEncryptedProtectedData {
    /// Parses a `SymEncryptedProtectedData` packet body.
    pub fn from_body(body: Bytes) -> Result<Self> {
        let mut cur = ByteCursor::new(&body);
        let version = cur.read_u8("seipd version")?;
        if version != 1 {
            crate::malformed_err!("unsupported seipd version {}", version);
        }

        Ok(SymEncryptedProtectedData {
            data: body.slice(1..),
        })
    }

    /// Encrypts `plaintext` (usually serialized packets) under the session key.
    pub fn encrypt_with_rng<R: CryptoRng + Rng>(
        rng: &mut R,
        session_key: &PlainSessionKey,
        plaintext: &[u8],
    ) -> Result<Self> {
        let data = session_key
            .sym_alg()
            .encrypt_protected(rng, session_key.key(), plaintext)?;

        Ok(SymEncryptedProtectedData { data: data.into() })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decrypts and integrity checks the payload, returning the inner packets.
    pub fn decrypt(&self, session_key: &PlainSessionKey) -> Result<Vec<u8>> {
        session_key
            .sym_alg()
            .decrypt_and_verify(session_key.key(), &self.data, true)
    }
}

impl Serialize for SymEncryptedProtectedData {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(1)?;
        writer.write_all(&self.data)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + self.data.len()
    }
}

impl Packet for SymEncryptedProtectedData {
    fn tag(&self) -> Tag {
        Tag::SymEncryptedProtectedData
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use zeroize::Zeroizing;

    use super::*;
    use crate::crypto::sym::SymmetricKeyAlgorithm;
    use crate::errors::ErrorKind;

    #[test]
    fn encrypt_decrypt() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let key = PlainSessionKey::new(
            SymmetricKeyAlgorithm::AES192,
            Zeroizing::new(vec![3u8; 24]),
        )
        .unwrap();

        let packet =
            SymEncryptedProtectedData::encrypt_with_rng(&mut rng, &key, b"inner packets").unwrap();
        let parsed = SymEncryptedProtectedData::from_body(packet.to_bytes().unwrap().into()).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(parsed.decrypt(&key).unwrap(), b"inner packets".to_vec());

        let other = PlainSessionKey::new(
            SymmetricKeyAlgorithm::AES192,
            Zeroizing::new(vec![4u8; 24]),
        )
        .unwrap();
        let err = parsed.decrypt(&other).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::PrefixCheckFailed | ErrorKind::MdcMismatch
        ));
    }

    #[test]
    fn rejects_other_versions() {
        let err = SymEncryptedProtectedData::from_body(Bytes::from_static(&[2, 0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);

        let err = SymEncryptedProtectedData::from_body(Bytes::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShortRead);
    }
}
