use std::io;

use digest::DynDigest;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::{Error, Result};
use crate::parsing::ByteCursor;
use crate::ser::Serialize;

const EXPBIAS: u32 = 6;

/// Bytes fed to the hasher per update call when iterating.
const ITERATION_BLOCK: usize = 4096;

/// Available String-To-Key types
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, TryFromPrimitive, IntoPrimitive)]
pub enum StringToKeyType {
    Simple = 0,
    Salted = 1,
    IteratedAndSalted = 3,
}

impl StringToKeyType {
    pub fn from_id(id: u8) -> Result<Self> {
        Self::try_from(id).map_err(|_| Error::UnsupportedAlgorithm {
            context: format!("string to key type {id}"),
        })
    }

    /// Has the given s2k type a salt?
    pub fn has_salt(self) -> bool {
        matches!(
            self,
            StringToKeyType::Salted | StringToKeyType::IteratedAndSalted
        )
    }
}

/// Converts a coded count into the count.
/// Ref: <https://tools.ietf.org/html/rfc4880#section-3.7.1.3>
pub fn coded_count(c: u8) -> usize {
    ((16u32 + u32::from(c & 15)) << (u32::from(c >> 4) + EXPBIAS)) as usize
}

/// A parsed String-To-Key specifier.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub enum StringToKey {
    Simple {
        hash_alg: HashAlgorithm,
    },
    Salted {
        hash_alg: HashAlgorithm,
        #[debug("{}", hex::encode(salt))]
        salt: [u8; 8],
    },
    IteratedAndSalted {
        hash_alg: HashAlgorithm,
        #[debug("{}", hex::encode(salt))]
        salt: [u8; 8],
        count: u8,
    },
}

impl StringToKey {
    pub fn new_iterated<R: CryptoRng + Rng>(mut rng: R, hash_alg: HashAlgorithm, count: u8) -> Self {
        let mut salt = [0u8; 8];
        rng.fill(&mut salt[..]);

        StringToKey::IteratedAndSalted {
            hash_alg,
            salt,
            count,
        }
    }

    pub fn from_cursor(cur: &mut ByteCursor<'_>) -> Result<Self> {
        let typ = StringToKeyType::from_id(cur.read_u8("s2k type")?)?;
        let hash_alg = HashAlgorithm::from_id(cur.read_u8("s2k hash algorithm")?)?;

        let s2k = match typ {
            StringToKeyType::Simple => StringToKey::Simple { hash_alg },
            StringToKeyType::Salted => StringToKey::Salted {
                hash_alg,
                salt: cur.read_array::<8>("s2k salt")?,
            },
            StringToKeyType::IteratedAndSalted => StringToKey::IteratedAndSalted {
                hash_alg,
                salt: cur.read_array::<8>("s2k salt")?,
                count: cur.read_u8("s2k count")?,
            },
        };

        Ok(s2k)
    }

    pub fn typ(&self) -> StringToKeyType {
        match self {
            Self::Simple { .. } => StringToKeyType::Simple,
            Self::Salted { .. } => StringToKeyType::Salted,
            Self::IteratedAndSalted { .. } => StringToKeyType::IteratedAndSalted,
        }
    }

    pub fn hash_alg(&self) -> HashAlgorithm {
        match self {
            Self::Simple { hash_alg }
            | Self::Salted { hash_alg, .. }
            | Self::IteratedAndSalted { hash_alg, .. } => *hash_alg,
        }
    }

    pub fn salt(&self) -> Option<&[u8; 8]> {
        match self {
            Self::Simple { .. } => None,
            Self::Salted { salt, .. } | Self::IteratedAndSalted { salt, .. } => Some(salt),
        }
    }

    /// The decoded byte count for iterated specifiers.
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::IteratedAndSalted { count, .. } => Some(coded_count(*count)),
            _ => None,
        }
    }

    /// Derives a `key_size` byte key from `passphrase`.
    pub fn derive_key(&self, passphrase: &[u8], key_size: usize) -> Result<Zeroizing<Vec<u8>>> {
        derive_key(
            passphrase,
            key_size,
            self.typ(),
            self.hash_alg(),
            self.salt().map(|s| &s[..]),
            self.count().unwrap_or(0),
        )
    }
}

impl Serialize for StringToKey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[u8::from(self.typ()), u8::from(self.hash_alg())])?;

        if let Some(salt) = self.salt() {
            writer.write_all(salt)?;
        }

        if let Self::IteratedAndSalted { count, .. } = self {
            writer.write_all(&[*count])?;
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            // 1 octet type, 1 octet hash algorithm.
            Self::Simple { .. } => 2,
            // plus 8 octets salt value.
            Self::Salted { .. } => 10,
            // plus 1 octet count.
            Self::IteratedAndSalted { .. } => 11,
        }
    }
}

/// String-To-Key methods are used to convert a given passphrase into a key.
/// Ref: <https://tools.ietf.org/html/rfc4880#section-3.7>
///
/// `count` is only used by [`StringToKeyType::IteratedAndSalted`] and is
/// raised to the length of salt and passphrase if it is smaller.
pub fn derive_key(
    passphrase: &[u8],
    key_size: usize,
    typ: StringToKeyType,
    hash_alg: HashAlgorithm,
    salt: Option<&[u8]>,
    count: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    crate::ensure!(key_size > 0, "s2k: key size must not be zero");

    let mut seed = Zeroizing::new(Vec::with_capacity(8 + passphrase.len()));
    if typ.has_salt() {
        let salt = salt.ok_or_else(|| crate::format_err!("s2k: missing salt for {:?}", typ))?;
        seed.extend_from_slice(salt);
    }
    seed.extend_from_slice(passphrase);

    let target = match typ {
        StringToKeyType::IteratedAndSalted => count.max(seed.len()),
        StringToKeyType::Simple | StringToKeyType::Salted => seed.len(),
    };

    let hash_size = hash_alg.digest_size();
    let num_contexts = key_size.div_ceil(hash_size);

    let block = if seed.is_empty() {
        Zeroizing::new(Vec::new())
    } else {
        Zeroizing::new(seed.repeat((ITERATION_BLOCK / seed.len()).max(1)))
    };

    let mut zeros = Vec::with_capacity(num_contexts);
    let mut ret = Zeroizing::new(vec![0u8; key_size]);

    for data in ret.chunks_mut(hash_size) {
        let mut hasher = hash_alg.new_hasher();
        hasher.update(&zeros[..]);
        absorb(&mut *hasher, &block, target);

        let digest = Zeroizing::new(hasher.finalize().into_vec());
        let l = data.len();
        data.copy_from_slice(&digest[..l]);
        zeros.push(0);
    }

    Ok(ret)
}

/// Feeds the first `target` bytes of the endlessly repeated seed. `block` is
/// the seed repeated a whole number of times.
fn absorb(hasher: &mut dyn DynDigest, block: &[u8], target: usize) {
    if block.is_empty() {
        return;
    }
    let mut remaining = target;
    while remaining >= block.len() {
        hasher.update(block);
        remaining -= block.len();
    }
    hasher.update(&block[..remaining]);
}
