use std::io;

use byteorder::WriteBytesExt;
use bytes::Bytes;
use log::debug;
use zeroize::Zeroizing;

use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::packet::Packet;
use crate::parsing::ByteCursor;
use crate::ser::Serialize;
use crate::types::{PlainSessionKey, StringToKey, Tag};

/// Symmetric-Key Encrypted Session Key Packet, version 4
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.3>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct SymKeyEncryptedSessionKey {
    sym_algorithm: SymmetricKeyAlgorithm,
    s2k: StringToKey,
    #[debug("{}", hex::encode(encrypted_key))]
    encrypted_key: Bytes,
}

impl SymKeyEncryptedSessionKey {
    /// Parses a `SymKeyEncryptedSessionKey` packet body.
    pub fn from_body(body: Bytes) -> Result<Self> {
        let mut cur = ByteCursor::new(&body);
        let version = cur.read_u8("skesk version")?;
        if version != 4 {
            crate::malformed_err!("unsupported skesk version {}", version);
        }

        let sym_algorithm = SymmetricKeyAlgorithm::from_id(cur.read_u8("skesk cipher")?)?;
        let s2k = StringToKey::from_cursor(&mut cur)?;
        let encrypted_key = body.slice(cur.position()..);

        Ok(SymKeyEncryptedSessionKey {
            sym_algorithm,
            s2k,
            encrypted_key,
        })
    }

    /// Wraps `session_key` for `password`, the counterpart of [`Self::decrypt`].
    pub fn encrypt(
        password: &[u8],
        session_key: &PlainSessionKey,
        s2k: StringToKey,
        sym_algorithm: SymmetricKeyAlgorithm,
    ) -> Result<Self> {
        let key = s2k.derive_key(password, sym_algorithm.key_size())?;

        let mut data = Vec::with_capacity(1 + session_key.key().len());
        data.push(u8::from(session_key.sym_alg()));
        data.extend_from_slice(session_key.key());

        let iv = vec![0u8; sym_algorithm.block_size()];
        sym_algorithm.encrypt_with_iv_regular(&key, &iv, &mut data)?;

        Ok(SymKeyEncryptedSessionKey {
            sym_algorithm,
            s2k,
            encrypted_key: data.into(),
        })
    }

    pub fn sym_algorithm(&self) -> SymmetricKeyAlgorithm {
        self.sym_algorithm
    }

    pub fn s2k(&self) -> &StringToKey {
        &self.s2k
    }

    /// Is the session key carried in the packet, or is the derived key used directly?
    pub fn has_encrypted_key(&self) -> bool {
        !self.encrypted_key.is_empty()
    }

    /// Derives the key from `password` and recovers the session key.
    pub fn decrypt(&self, password: &[u8]) -> Result<PlainSessionKey> {
        let key = self
            .s2k
            .derive_key(password, self.sym_algorithm.key_size())?;

        if !self.has_encrypted_key() {
            debug!("skesk without encrypted key, using the derived key");
            return PlainSessionKey::new(self.sym_algorithm, key);
        }

        let mut decrypted = Zeroizing::new(self.encrypted_key.to_vec());
        let iv = vec![0u8; self.sym_algorithm.block_size()];
        self.sym_algorithm
            .decrypt_with_iv_regular(&key, &iv, &mut decrypted)?;

        // garbage here nearly always means a wrong password
        let wrong_password = |reason: String| Error::PrefixCheckFailed {
            context: format!("decrypted session key is unusable: {reason}"),
        };
        let sym_alg = SymmetricKeyAlgorithm::from_id(decrypted[0])
            .map_err(|err| wrong_password(err.to_string()))?;
        PlainSessionKey::new(sym_alg, Zeroizing::new(decrypted[1..].to_vec()))
            .map_err(|err| wrong_password(err.to_string()))
    }
}

impl Serialize for SymKeyEncryptedSessionKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(4)?;
        writer.write_u8(self.sym_algorithm.into())?;
        self.s2k.to_writer(writer)?;
        writer.write_all(&self.encrypted_key)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        2 + self.s2k.write_len() + self.encrypted_key.len()
    }
}

impl Packet for SymKeyEncryptedSessionKey {
    fn tag(&self) -> Tag {
        Tag::SymKeyEncryptedSessionKey
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::crypto::hash::HashAlgorithm;
    use crate::errors::ErrorKind;

    #[test]
    fn parse_without_encrypted_key() {
        // AES256, iterated and salted SHA256
        let body = hex!("04 09 03 08 bde8157d10a5b50b 60");
        let skesk = SymKeyEncryptedSessionKey::from_body(Bytes::copy_from_slice(&body)).unwrap();
        assert_eq!(skesk.sym_algorithm(), SymmetricKeyAlgorithm::AES256);
        assert_eq!(skesk.s2k().hash_alg(), HashAlgorithm::Sha256);
        assert_eq!(skesk.s2k().count(), Some(65536));
        assert!(!skesk.has_encrypted_key());
        assert_eq!(skesk.to_bytes().unwrap(), body.to_vec());

        let session_key = skesk.decrypt(b"pw").unwrap();
        assert_eq!(session_key.sym_alg(), SymmetricKeyAlgorithm::AES256);
        assert_eq!(
            session_key.key(),
            &skesk.s2k().derive_key(b"pw", 32).unwrap()[..]
        );
    }

    #[test]
    fn wrapped_session_key() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let session_key = PlainSessionKey::new(
            SymmetricKeyAlgorithm::Twofish,
            Zeroizing::new(vec![0x42; 32]),
        )
        .unwrap();
        let s2k = StringToKey::new_iterated(&mut rng, HashAlgorithm::Sha256, 0x10);

        let skesk = SymKeyEncryptedSessionKey::encrypt(
            b"hunter2",
            &session_key,
            s2k,
            SymmetricKeyAlgorithm::AES128,
        )
        .unwrap();
        let parsed =
            SymKeyEncryptedSessionKey::from_body(skesk.to_bytes().unwrap().into()).unwrap();
        assert_eq!(parsed, skesk);
        assert!(parsed.has_encrypted_key());
        assert_eq!(parsed.decrypt(b"hunter2").unwrap(), session_key);
    }

    #[test]
    fn rejects_bad_versions_and_ciphers() {
        let err = SymKeyEncryptedSessionKey::from_body(Bytes::from_static(&[5, 9, 0, 2]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);

        let err = SymKeyEncryptedSessionKey::from_body(Bytes::from_static(&[4, 1, 0, 2]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);

        let err = SymKeyEncryptedSessionKey::from_body(Bytes::from_static(&[4, 9, 3, 8, 1]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShortRead);
    }
}
