use log::debug;
use num_bigint::traits::ModInverse;
use num_bigint::BigUint;
use num_traits::One;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{Error, Result};
use crate::types::Mpi;

/// Chinese remainder parameters of an RSA key.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct CrtParams {
    /// `d mod (p - 1)`
    #[debug("..")]
    pub dmp1: BigUint,
    /// `d mod (q - 1)`
    #[debug("..")]
    pub dmq1: BigUint,
    /// `q^-1 mod p`
    #[debug("..")]
    pub iqmp: BigUint,
}

impl Zeroize for CrtParams {
    fn zeroize(&mut self) {
        self.dmp1.zeroize();
        self.dmq1.zeroize();
        self.iqmp.zeroize();
    }
}

impl CrtParams {
    pub fn new(d: &BigUint, p: &BigUint, q: &BigUint) -> Result<Self> {
        let one = BigUint::one();
        if p <= &one || q <= &one {
            return Err(Error::InvalidKeyMaterial {
                context: "rsa primes must be greater than one".to_string(),
            });
        }

        let dmp1 = d % (p - &one);
        let dmq1 = d % (q - &one);
        let iqmp = q
            .clone()
            .mod_inverse(p)
            .and_then(|v| v.to_biguint())
            .ok_or_else(|| Error::InvalidKeyMaterial {
                context: "rsa q has no inverse modulo p".to_string(),
            })?;

        Ok(Self { dmp1, dmq1, iqmp })
    }
}

/// Secret key for RSA, decrypting with PKCS#1 v1.5 padding.
#[derive(Clone, derive_more::Debug)]
pub struct RsaSecretKey {
    #[debug("..")]
    key: RsaPrivateKey,
    #[debug("..")]
    crt: CrtParams,
}

impl Drop for RsaSecretKey {
    fn drop(&mut self) {
        // RsaPrivateKey wipes itself
        self.crt.zeroize();
    }
}

impl ZeroizeOnDrop for RsaSecretKey {}

impl RsaSecretKey {
    /// Builds the key from the public `n`, `e` and the secret `d`, `p`, `q`.
    pub fn from_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
    ) -> Result<Self> {
        let crt = CrtParams::new(&d, &p, &q)?;

        let key = RsaPrivateKey::from_components(n, e, d, vec![p, q]).map_err(|err| {
            Error::InvalidKeyMaterial {
                context: format!("rsa: {err}"),
            }
        })?;
        key.validate().map_err(|err| Error::InvalidKeyMaterial {
            context: format!("rsa: {err}"),
        })?;

        Ok(Self { key, crt })
    }

    pub fn n(&self) -> &BigUint {
        self.key.n()
    }

    pub fn e(&self) -> &BigUint {
        self.key.e()
    }

    pub fn d(&self) -> &BigUint {
        self.key.d()
    }

    pub fn p(&self) -> &BigUint {
        &self.key.primes()[0]
    }

    pub fn q(&self) -> &BigUint {
        &self.key.primes()[1]
    }

    pub fn crt(&self) -> &CrtParams {
        &self.crt
    }

    /// Size of the modulus in bytes.
    pub fn size(&self) -> usize {
        self.key.size()
    }

    /// RSA decryption using PKCS1v15 padding.
    ///
    /// The ciphertext is the single MPI of a session key packet. A padding
    /// failure means the packet was not encrypted to this key.
    pub fn decrypt(&self, mpis: &[Mpi]) -> Result<Zeroizing<Vec<u8>>> {
        // rsa consist of exactly one mpi
        let [mpi] = mpis else {
            crate::malformed_err!("rsa ciphertext needs 1 mpi, got {}", mpis.len());
        };

        let size = self.size();
        if mpi.len() > size {
            crate::malformed_err!("rsa ciphertext of {} bytes for a {} byte key", mpi.len(), size);
        }

        // MPIs drop leading zeros, the primitive wants the full width
        let mut padded = vec![0u8; size];
        padded[size - mpi.len()..].copy_from_slice(mpi.as_bytes());

        debug!("RSA decrypt, {} byte modulus", size);
        let m = self
            .key
            .decrypt(Pkcs1v15Encrypt, &padded)
            .map_err(|err| Error::PrefixCheckFailed {
                context: format!("rsa pkcs#1 v1.5: {err}"),
            })?;

        Ok(Zeroizing::new(m))
    }
}
