use std::io;

use byteorder::WriteBytesExt;
use bytes::Bytes;
use log::debug;
use zeroize::Zeroizing;

use crate::crypto::checksum;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::packet::Packet;
use crate::parsing::ByteCursor;
use crate::ser::Serialize;
use crate::types::{KeyId, Mpi, PlainSessionKey, SecretKeyRepr, Tag};

/// Public-Key Encrypted Session Key Packet, version 3
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.1>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEncryptedSessionKey {
    id: KeyId,
    algorithm: PublicKeyAlgorithm,
    mpis: Vec<Mpi>,
}

impl PublicKeyEncryptedSessionKey {
    /// Parses a `PublicKeyEncryptedSessionKey` packet body.
    pub fn from_body(body: Bytes) -> Result<Self> {
        let mut cur = ByteCursor::new(&body);
        let version = cur.read_u8("pkesk version")?;
        if version != 3 {
            crate::malformed_err!("unsupported pkesk version {}", version);
        }

        let id = KeyId::from(cur.read_array::<8>("pkesk key id")?);
        let algorithm = PublicKeyAlgorithm::from_id(cur.read_u8("pkesk algorithm")?)?;
        let mpis = (0..algorithm.session_key_mpi_count()?)
            .map(|_| Mpi::from_cursor(&mut cur))
            .collect::<Result<Vec<_>>>()?;

        if cur.has_remaining() {
            debug!("pkesk: ignoring {} trailing bytes", cur.remaining());
        }

        Ok(PublicKeyEncryptedSessionKey {
            id,
            algorithm,
            mpis,
        })
    }

    /// The recipient, [`KeyId::WILDCARD`] for anonymous recipients.
    pub fn id(&self) -> &KeyId {
        &self.id
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    pub fn mpis(&self) -> &[Mpi] {
        &self.mpis
    }

    /// Recovers the session key with an unlocked secret key.
    ///
    /// The decrypted value is `cipher id || key || sum16(key)`.
    pub fn decrypt(&self, key: &SecretKeyRepr) -> Result<PlainSessionKey> {
        let decrypted = match key {
            SecretKeyRepr::Rsa(rsa_key) if self.algorithm.is_rsa() => rsa_key.decrypt(&self.mpis)?,
            _ => crate::unsupported_err!(
                "decrypting a {:?} session key with a {:?} key",
                self.algorithm,
                key.algorithm()
            ),
        };

        if decrypted.len() < 1 + checksum::SIMPLE_LEN {
            crate::malformed_err!("decrypted session key is only {} bytes", decrypted.len());
        }

        let sym_alg = SymmetricKeyAlgorithm::from_id(decrypted[0])?;
        let (session_key, sum) = decrypted[1..].split_at(decrypted.len() - 1 - checksum::SIMPLE_LEN);
        checksum::simple(sum, session_key)?;

        debug!("pkesk: recovered {:?} session key", sym_alg);
        PlainSessionKey::new(sym_alg, Zeroizing::new(session_key.to_vec())).map_err(|err| {
            Error::MalformedPacket {
                context: err.to_string(),
            }
        })
    }
}

impl Serialize for PublicKeyEncryptedSessionKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(3)?;
        writer.write_all(self.id.as_ref())?;
        writer.write_u8(self.algorithm.into())?;
        self.mpis.to_writer(writer)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 8 + 1 + self.mpis.write_len()
    }
}

impl Packet for PublicKeyEncryptedSessionKey {
    fn tag(&self) -> Tag {
        Tag::PublicKeyEncryptedSessionKey
    }
}
