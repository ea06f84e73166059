use bytes::Bytes;
use log::{debug, warn};

use crate::armor::{self, BlockType, Headers};
use crate::composed::SecretKeyBlock;
use crate::config::DecryptOptions;
use crate::errors::{Error, Result};
use crate::packet::{
    CompressedData, LiteralData, PacketParser, PublicKeyEncryptedSessionKey, SecretKey,
    SymEncryptedProtectedData, SymKeyEncryptedSessionKey,
};
use crate::types::{PlainSessionKey, SecretKeyRepr, Tag};

/// How deep compressed packets may be nested inside each other.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Encrypted Session Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Esk {
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    SymKeyEncryptedSessionKey(SymKeyEncryptedSessionKey),
}

/// An OpenPGP message, reduced to what is needed to get at its content.
///
/// Signatures, one-pass signatures and marker packets are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Literal(LiteralData),
    Compressed(CompressedData),
    Encrypted {
        esk: Vec<Esk>,
        edata: SymEncryptedProtectedData,
    },
}

impl Message {
    /// Parses a single armored `PGP MESSAGE`.
    pub fn from_armor_single(input: &[u8]) -> Result<(Self, Headers)> {
        let armored = armor::unarmor(input)?;
        if !matches!(
            armored.typ,
            BlockType::Message | BlockType::MultiPartMessage(..)
        ) {
            return Err(Error::MalformedArmor {
                context: format!("expected {}, found {}", BlockType::Message, armored.typ),
            });
        }

        let msg = Self::from_bytes(armored.body)?;
        Ok((msg, armored.headers))
    }

    /// Parses a binary message.
    pub fn from_bytes(input: impl Into<Bytes>) -> Result<Self> {
        let mut esk = Vec::new();
        let mut message = None;

        for packet in PacketParser::new(input) {
            let (header, body) = packet?;
            let tag = header.tag();

            if message.is_some() {
                match tag {
                    Tag::Signature => {}
                    _ => warn!("ignoring {:?} packet after the message content", tag),
                }
                continue;
            }

            match tag {
                Tag::PublicKeyEncryptedSessionKey => {
                    let pkesk = PublicKeyEncryptedSessionKey::from_body(body)?;
                    esk.push(Esk::PublicKeyEncryptedSessionKey(pkesk));
                }
                Tag::SymKeyEncryptedSessionKey => {
                    let skesk = SymKeyEncryptedSessionKey::from_body(body)?;
                    esk.push(Esk::SymKeyEncryptedSessionKey(skesk));
                }
                Tag::SymEncryptedProtectedData => {
                    let edata = SymEncryptedProtectedData::from_body(body)?;
                    message = Some(Message::Encrypted {
                        esk: std::mem::take(&mut esk),
                        edata,
                    });
                }
                Tag::SymEncryptedData => {
                    crate::malformed_err!("refusing encrypted data without integrity protection");
                }
                Tag::CompressedData => {
                    message = Some(Message::Compressed(CompressedData::from_body(body)?));
                }
                Tag::LiteralData => {
                    message = Some(Message::Literal(LiteralData::from_body(body)?));
                }
                Tag::Marker | Tag::OnePassSignature | Tag::Signature => {
                    debug!("skipping {:?} packet", tag);
                }
                _ => crate::malformed_err!("unexpected {:?} packet in message", tag),
            }
        }

        if !esk.is_empty() {
            crate::malformed_err!("session key packets without encrypted data");
        }
        message.ok_or_else(|| Error::MalformedPacket {
            context: "message has no content packet".to_string(),
        })
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Message::Encrypted { .. })
    }

    /// Decrypts with the secret keys matching the session key packets.
    ///
    /// Every public key session key packet addressed to one of the keys (or
    /// to anyone) is tried in order until one yields a working session key.
    pub fn decrypt_with_key(
        &self,
        keys: &[SecretKeyBlock],
        passphrase: &[u8],
        options: &DecryptOptions,
    ) -> Result<LiteralData> {
        let Message::Encrypted { esk, edata } = self else {
            return self.unwrap_literal(options, 0);
        };

        let mut last_err = None;
        for pkesk in esk.iter().filter_map(|esk| match esk {
            Esk::PublicKeyEncryptedSessionKey(pkesk) => Some(pkesk),
            Esk::SymKeyEncryptedSessionKey(_) => None,
        }) {
            let candidates = keys
                .iter()
                .flat_map(|block| block.keys())
                .filter(|key| pkesk.id().is_wildcard() || &key.key_id() == pkesk.id());

            for key in candidates {
                debug!("trying key {} for {:?}", key.key_id(), pkesk.id());
                let res = unlock(key, passphrase, options)
                    .and_then(|repr| pkesk.decrypt(&repr))
                    .and_then(|session_key| decrypt_edata(edata, &session_key, options));
                match res {
                    Ok(lit) => return Ok(lit),
                    Err(err) => {
                        debug!("key {} failed: {}", key.key_id(), err);
                        last_err = Some(err);
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::MalformedPacket {
            context: "no session key packet matches the given keys".to_string(),
        }))
    }

    /// Decrypts with a password, trying every symmetric session key packet.
    pub fn decrypt_with_password(
        &self,
        password: &[u8],
        options: &DecryptOptions,
    ) -> Result<LiteralData> {
        let Message::Encrypted { esk, edata } = self else {
            return self.unwrap_literal(options, 0);
        };

        let mut last_err = None;
        for skesk in esk.iter().filter_map(|esk| match esk {
            Esk::SymKeyEncryptedSessionKey(skesk) => Some(skesk),
            Esk::PublicKeyEncryptedSessionKey(_) => None,
        }) {
            if let Some(count) = skesk.s2k().count() {
                crate::ensure!(
                    count <= options.max_s2k_count,
                    "s2k count {} exceeds the limit of {}",
                    count,
                    options.max_s2k_count
                );
            }

            let res = skesk
                .decrypt(password)
                .and_then(|session_key| decrypt_edata(edata, &session_key, options));
            match res {
                Ok(lit) => return Ok(lit),
                Err(err) => {
                    debug!("skesk failed: {}", err);
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::MalformedPacket {
            context: "message has no password session key packet".to_string(),
        }))
    }

    /// Inflates compressed layers until the literal packet is reached.
    fn unwrap_literal(&self, options: &DecryptOptions, depth: usize) -> Result<LiteralData> {
        match self {
            Message::Literal(lit) => Ok(lit.clone()),
            Message::Compressed(compressed) => {
                if depth >= MAX_NESTING_DEPTH {
                    crate::malformed_err!("more than {} nested compressed packets", MAX_NESTING_DEPTH);
                }
                let inner = compressed.decompress_bounded(options.max_decompressed_size)?;
                Message::from_bytes(inner)?.unwrap_literal(options, depth + 1)
            }
            Message::Encrypted { .. } => {
                crate::malformed_err!("encrypted data nested inside a message")
            }
        }
    }
}

fn unlock(
    key: &SecretKey,
    passphrase: &[u8],
    options: &DecryptOptions,
) -> Result<SecretKeyRepr> {
    if !key.is_encrypted() && !options.allow_unprotected_keys {
        return Err(Error::InvalidKeyMaterial {
            context: format!("key {} is not passphrase protected", key.key_id()),
        });
    }
    key.unlock(passphrase)
}

fn decrypt_edata(
    edata: &SymEncryptedProtectedData,
    session_key: &PlainSessionKey,
    options: &DecryptOptions,
) -> Result<LiteralData> {
    let decrypted = edata.decrypt(session_key)?;
    Message::from_bytes(decrypted)?.unwrap_literal(options, 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use zeroize::Zeroizing;

    use super::*;
    use crate::config::DecryptOptionsBuilder;
    use crate::crypto::hash::HashAlgorithm;
    use crate::crypto::sym::SymmetricKeyAlgorithm;
    use crate::errors::ErrorKind;
    use crate::packet::PacketHeader;
    use crate::ser::Serialize;
    use crate::types::StringToKey;

    fn packet(tag: Tag, body: &[u8]) -> Vec<u8> {
        let mut out = PacketHeader::new_fixed(tag, body.len() as u32)
            .to_bytes()
            .unwrap();
        out.extend_from_slice(body);
        out
    }

    fn literal(data: &[u8]) -> Vec<u8> {
        let mut body = vec![b'b', 4];
        body.extend_from_slice(b"a.gz");
        body.extend_from_slice(&[0, 0, 0, 0]);
        body.extend_from_slice(data);
        packet(Tag::LiteralData, &body)
    }

    fn zlib(inner: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(vec![2u8], Compression::default());
        enc.write_all(inner).unwrap();
        packet(Tag::CompressedData, &enc.finish().unwrap())
    }

    fn password_message(rng: &mut ChaCha8Rng, password: &[u8], inner: &[u8]) -> Vec<u8> {
        let session_key = PlainSessionKey::new(
            SymmetricKeyAlgorithm::AES256,
            Zeroizing::new(vec![9u8; 32]),
        )
        .unwrap();
        let s2k = StringToKey::new_iterated(&mut *rng, HashAlgorithm::Sha256, 0x10);
        let skesk =
            SymKeyEncryptedSessionKey::encrypt(password, &session_key, s2k, SymmetricKeyAlgorithm::AES128)
                .unwrap();
        let edata = SymEncryptedProtectedData::encrypt_with_rng(rng, &session_key, inner).unwrap();

        let mut out = packet(Tag::Marker, b"PGP");
        out.extend(packet(Tag::SymKeyEncryptedSessionKey, &skesk.to_bytes().unwrap()));
        out.extend(packet(Tag::SymEncryptedProtectedData, &edata.to_bytes().unwrap()));
        out
    }

    #[test]
    fn plain_literal() {
        let msg = Message::from_bytes(literal(b"hello")).unwrap();
        assert!(!msg.is_encrypted());
        let lit = msg.decrypt_with_password(b"", &DecryptOptions::default()).unwrap();
        assert_eq!(lit.data(), b"hello");
        assert_eq!(lit.file_name(), b"a.gz");
    }

    #[test]
    fn password_compressed() {
        let _ = pretty_env_logger::try_init();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let data = password_message(&mut rng, b"pw", &zlib(&literal(b"ACGT")));

        let msg = Message::from_bytes(data).unwrap();
        assert!(msg.is_encrypted());
        let options = DecryptOptions::default();
        assert_eq!(msg.decrypt_with_password(b"pw", &options).unwrap().data(), b"ACGT");

        let err = msg.decrypt_with_password(b"wrong", &options).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::PrefixCheckFailed | ErrorKind::MdcMismatch
        ));

        let err = msg.decrypt_with_key(&[], b"pw", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);
    }

    #[test]
    fn limits() {
        let mut rng = ChaCha8Rng::seed_from_u64(43);
        let data = password_message(&mut rng, b"pw", &zlib(&literal(&[0u8; 4096])));
        let msg = Message::from_bytes(data).unwrap();

        let small = DecryptOptionsBuilder::default()
            .max_decompressed_size(1024)
            .build()
            .unwrap();
        let err = msg.decrypt_with_password(b"pw", &small).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);

        let cheap = DecryptOptionsBuilder::default()
            .max_s2k_count(1024)
            .build()
            .unwrap();
        let err = msg.decrypt_with_password(b"pw", &cheap).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn nesting_is_bounded() {
        let mut inner = literal(b"deep");
        for _ in 0..MAX_NESTING_DEPTH {
            inner = zlib(&inner);
        }
        let options = DecryptOptions::default();
        let msg = Message::from_bytes(inner.clone()).unwrap();
        assert_eq!(msg.decrypt_with_password(b"", &options).unwrap().data(), b"deep");

        let msg = Message::from_bytes(zlib(&inner)).unwrap();
        let err = msg.decrypt_with_password(b"", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);
    }

    #[test]
    fn rejects_unprotected_data_and_dangling_esk() {
        let err = Message::from_bytes(packet(Tag::SymEncryptedData, &[0u8; 20])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);

        let mut rng = ChaCha8Rng::seed_from_u64(44);
        let data = password_message(&mut rng, b"pw", &literal(b"x"));
        // marker, skesk, without the data packet
        let mut cur = crate::packet::PacketParser::new(data.clone());
        cur.next();
        cur.next();
        let err = Message::from_bytes(data[..cur.position()].to_vec()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);

        let err = Message::from_bytes(packet(Tag::Marker, b"PGP")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPacket);
    }

    #[test]
    fn armored_message() {
        let mut armored = Vec::new();
        armor::write(&literal(b"hi"), BlockType::Message, None, &mut armored).unwrap();
        let (msg, _) = Message::from_armor_single(&armored).unwrap();
        assert_eq!(msg, Message::from_bytes(literal(b"hi")).unwrap());

        let mut armored = Vec::new();
        armor::write(&literal(b"hi"), BlockType::Signature, None, &mut armored).unwrap();
        let err = Message::from_armor_single(&armored).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedArmor);
    }
}
