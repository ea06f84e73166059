use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};

/// A decrypted session key, ready to decrypt the data packet.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct PlainSessionKey {
    sym_alg: SymmetricKeyAlgorithm,
    #[debug("..")]
    key: Zeroizing<Vec<u8>>,
}

impl ZeroizeOnDrop for PlainSessionKey {}

impl PlainSessionKey {
    /// Pairs a key with its cipher, the key length has to match.
    pub fn new(sym_alg: SymmetricKeyAlgorithm, key: Zeroizing<Vec<u8>>) -> Result<Self> {
        if key.len() != sym_alg.key_size() {
            return Err(Error::InvalidKeyMaterial {
                context: format!(
                    "{:?} session key must be {} bytes, got {}",
                    sym_alg,
                    sym_alg.key_size(),
                    key.len()
                ),
            });
        }

        Ok(Self { sym_alg, key })
    }

    pub fn sym_alg(&self) -> SymmetricKeyAlgorithm {
        self.sym_alg
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}
