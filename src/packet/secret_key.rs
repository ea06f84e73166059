use bytes::Bytes;
use log::debug;
use num_bigint::BigUint;
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::crypto::checksum;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::Result;
use crate::packet::Packet;
use crate::parsing::ByteCursor;
use crate::types::{read_mpi_slice, Fingerprint, KeyId, Mpi, SecretKeyRepr, StringToKey, Tag};

/// How the secret part of a key packet is stored.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub enum SecretParams {
    /// Usage `0`: MPIs and a two octet checksum in the clear.
    Plain(#[debug("..")] Bytes),
    Encrypted(EncryptedSecretParams),
}

/// Secret MPIs and their checksum, encrypted with a passphrase derived key.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecretParams {
    s2k_usage: u8,
    sym_alg: SymmetricKeyAlgorithm,
    s2k: StringToKey,
    #[debug("{}", hex::encode(iv))]
    iv: Bytes,
    #[debug("{} bytes", data.len())]
    data: Bytes,
}

impl EncryptedSecretParams {
    pub fn s2k_usage(&self) -> u8 {
        self.s2k_usage
    }

    pub fn sym_alg(&self) -> SymmetricKeyAlgorithm {
        self.sym_alg
    }

    pub fn s2k(&self) -> &StringToKey {
        &self.s2k
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Decrypts the secret area and strips its checksum.
    fn decrypt(&self, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.s2k.derive_key(passphrase, self.sym_alg.key_size())?;

        let mut plaintext = Zeroizing::new(self.data.to_vec());
        self.sym_alg
            .decrypt_with_iv_regular(&key, &self.iv, &mut plaintext)?;

        let material = checksum::validate(&plaintext, self.s2k_usage)?;
        Ok(Zeroizing::new(material.to_vec()))
    }
}

/// Secret-Key or Secret-Subkey Packet, version 4
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.5.3>
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct SecretKey {
    tag: Tag,
    created: u32,
    algorithm: PublicKeyAlgorithm,
    public_params: Vec<Mpi>,
    #[debug(skip)]
    public_raw: Bytes,
    secret_params: SecretParams,
    fingerprint: Fingerprint,
}

impl SecretKey {
    /// Parses the body of a Secret-Key packet (tag 5).
    pub fn from_body(body: Bytes) -> Result<Self> {
        Self::from_body_with_tag(Tag::SecretKey, body)
    }

    /// Parses the body of a Secret-Subkey packet (tag 7).
    pub fn subkey_from_body(body: Bytes) -> Result<Self> {
        Self::from_body_with_tag(Tag::SecretSubkey, body)
    }

    fn from_body_with_tag(tag: Tag, body: Bytes) -> Result<Self> {
        let mut cur = ByteCursor::new(&body);
        let version = cur.read_u8("key version")?;
        if version != 4 {
            crate::malformed_err!("unsupported key version {}", version);
        }

        let created = cur.read_be_u32("key creation time")?;
        let algorithm = PublicKeyAlgorithm::from_id(cur.read_u8("key algorithm")?)?;
        let public_params = (0..algorithm.public_mpi_count())
            .map(|_| Mpi::from_cursor(&mut cur))
            .collect::<Result<Vec<_>>>()?;
        let public_raw = body.slice(..cur.position());

        let s2k_usage = cur.read_u8("s2k usage")?;
        let secret_params = match s2k_usage {
            0 => SecretParams::Plain(body.slice(cur.position()..)),
            _ => {
                let (sym_alg, s2k) = match s2k_usage {
                    254 | 255 => {
                        let sym_alg = SymmetricKeyAlgorithm::from_id(cur.read_u8("key cipher")?)?;
                        (sym_alg, StringToKey::from_cursor(&mut cur)?)
                    }
                    // legacy: the usage octet is the cipher, the key is the MD5 of the passphrase
                    id => (
                        SymmetricKeyAlgorithm::from_id(id)?,
                        StringToKey::Simple {
                            hash_alg: HashAlgorithm::Md5,
                        },
                    ),
                };
                let iv_start = cur.position();
                cur.read_take(sym_alg.block_size(), "key iv")?;
                let iv = body.slice(iv_start..cur.position());

                SecretParams::Encrypted(EncryptedSecretParams {
                    s2k_usage,
                    sym_alg,
                    s2k,
                    iv,
                    data: body.slice(cur.position()..),
                })
            }
        };

        let fingerprint = v4_fingerprint(&public_raw)?;
        debug!("parsed {:?} {} ({:?})", tag, fingerprint, algorithm);

        Ok(SecretKey {
            tag,
            created,
            algorithm,
            public_params,
            public_raw,
            secret_params,
            fingerprint,
        })
    }

    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    pub fn public_params(&self) -> &[Mpi] {
        &self.public_params
    }

    pub fn secret_params(&self) -> &SecretParams {
        &self.secret_params
    }

    pub fn is_subkey(&self) -> bool {
        self.tag == Tag::SecretSubkey
    }

    /// Whether a passphrase is needed to unlock the key.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.secret_params, SecretParams::Encrypted(_))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn key_id(&self) -> KeyId {
        self.fingerprint.key_id()
    }

    /// Decrypts the secret MPIs and builds the key object.
    ///
    /// A wrong passphrase is reported as a checksum mismatch. The passphrase
    /// is ignored for unprotected keys.
    pub fn unlock(&self, passphrase: &[u8]) -> Result<SecretKeyRepr> {
        let material = match &self.secret_params {
            SecretParams::Plain(data) => {
                Zeroizing::new(checksum::validate(data, 0)?.to_vec())
            }
            SecretParams::Encrypted(params) => params.decrypt(passphrase)?,
        };

        let mut cur = ByteCursor::new(&material);
        let mut secret = Zeroizing::new(Vec::with_capacity(self.algorithm.secret_mpi_count()));
        for _ in 0..self.algorithm.secret_mpi_count() {
            secret.push(BigUint::from_bytes_be(read_mpi_slice(&mut cur)?));
        }
        if cur.has_remaining() {
            debug!("ignoring {} bytes after the secret mpis", cur.remaining());
        }

        let public: Vec<BigUint> = self.public_params.iter().map(Mpi::to_biguint).collect();
        let numbers = match (self.algorithm, &public[..], &secret[..]) {
            (
                PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign,
                [n, e],
                [d, p, q, _u],
            ) => vec![n.clone(), e.clone(), d.clone(), p.clone(), q.clone()],
            (PublicKeyAlgorithm::DSA, [p, q, g, y], [x]) => {
                vec![y.clone(), g.clone(), p.clone(), q.clone(), x.clone()]
            }
            _ => public.iter().chain(secret.iter()).cloned().collect(),
        };
        let numbers = Zeroizing::new(numbers);

        SecretKeyRepr::materialize(self.algorithm, &numbers)
    }
}

/// SHA1 over `0x99 || len16 || public key packet body`.
fn v4_fingerprint(public_raw: &[u8]) -> Result<Fingerprint> {
    let len = u16::try_from(public_raw.len())
        .map_err(|_| crate::format_err!("public key of {} bytes is too large", public_raw.len()))?;

    let mut hasher = Sha1::new();
    hasher.update([0x99]);
    hasher.update(len.to_be_bytes());
    hasher.update(public_raw);

    let mut fp = [0u8; 20];
    fp.copy_from_slice(&hasher.finalize());

    Ok(Fingerprint::new(fp))
}

impl Packet for SecretKey {
    fn tag(&self) -> Tag {
        self.tag
    }
}
