use num_bigint::BigUint;

use crate::crypto::dsa::DsaSecretKey;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::rsa::RsaSecretKey;
use crate::errors::{Error, Result};

/// The version of the secret key that is actually exposed to users to do crypto operations.
#[derive(Clone, derive_more::Debug)]
pub enum SecretKeyRepr {
    #[debug("SecretKeyRepr(RSA)")]
    Rsa(RsaSecretKey),
    #[debug("SecretKeyRepr(DSA)")]
    Dsa(DsaSecretKey),
}

impl SecretKeyRepr {
    /// Builds a key object from the numbers of a key packet.
    ///
    /// RSA expects `(n, e, d, p, q)`, DSA `(y, g, p, q, x)`.
    pub fn materialize(alg: PublicKeyAlgorithm, numbers: &[BigUint]) -> Result<Self> {
        match alg {
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign => {
                let [n, e, d, p, q] = expect_numbers::<5>(alg, numbers)?;
                let key = RsaSecretKey::from_components(
                    n.clone(),
                    e.clone(),
                    d.clone(),
                    p.clone(),
                    q.clone(),
                )?;
                Ok(SecretKeyRepr::Rsa(key))
            }
            PublicKeyAlgorithm::DSA => {
                let [y, g, p, q, x] = expect_numbers::<5>(alg, numbers)?;
                let key = DsaSecretKey::from_components(
                    p.clone(),
                    q.clone(),
                    g.clone(),
                    y.clone(),
                    x.clone(),
                )?;
                Ok(SecretKeyRepr::Dsa(key))
            }
            PublicKeyAlgorithm::ElgamalEncrypt | PublicKeyAlgorithm::Elgamal => {
                crate::unsupported_err!("{:?} secret keys", alg)
            }
        }
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        match self {
            SecretKeyRepr::Rsa(_) => PublicKeyAlgorithm::RSA,
            SecretKeyRepr::Dsa(_) => PublicKeyAlgorithm::DSA,
        }
    }
}

fn expect_numbers<const N: usize>(
    alg: PublicKeyAlgorithm,
    numbers: &[BigUint],
) -> Result<&[BigUint; N]> {
    numbers.try_into().map_err(|_| Error::InvalidKeyMaterial {
        context: format!("{alg:?} needs {N} numbers, got {}", numbers.len()),
    })
}
