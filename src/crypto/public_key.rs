use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::errors::{Error, Result};

/// Public key algorithms this engine can read.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.1>
#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt and Sign)
    RSA = 1,
    /// DEPRECATED: RSA (Encrypt-Only)
    RSAEncrypt = 2,
    /// DEPRECATED: RSA (Sign-Only)
    RSASign = 3,
    /// Elgamal (Encrypt-Only)
    ElgamalEncrypt = 16,
    /// DSA (Digital Signature Algorithm)
    DSA = 17,
    /// DEPRECATED: Elgamal (Encrypt and Sign)
    Elgamal = 20,
}

impl PublicKeyAlgorithm {
    /// Resolves an OpenPGP public key algorithm id. Elliptic curve and
    /// private algorithms are rejected.
    pub fn from_id(id: u8) -> Result<Self> {
        Self::try_from(id).map_err(|_| Error::UnsupportedAlgorithm {
            context: format!("public key algorithm {id}"),
        })
    }

    pub fn is_rsa(self) -> bool {
        matches!(
            self,
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign
        )
    }

    pub fn is_elgamal(self) -> bool {
        matches!(
            self,
            PublicKeyAlgorithm::ElgamalEncrypt | PublicKeyAlgorithm::Elgamal
        )
    }

    /// Number of MPIs in the public part of a key.
    pub fn public_mpi_count(self) -> usize {
        match self {
            // n, e
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign => 2,
            // p, q, g, y
            PublicKeyAlgorithm::DSA => 4,
            // p, g, y
            PublicKeyAlgorithm::ElgamalEncrypt | PublicKeyAlgorithm::Elgamal => 3,
        }
    }

    /// Number of MPIs in the secret part of a key.
    pub fn secret_mpi_count(self) -> usize {
        match self {
            // d, p, q, u
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt | PublicKeyAlgorithm::RSASign => 4,
            // x
            PublicKeyAlgorithm::DSA => 1,
            // x
            PublicKeyAlgorithm::ElgamalEncrypt | PublicKeyAlgorithm::Elgamal => 1,
        }
    }

    /// Number of MPIs in an encrypted session key.
    pub fn session_key_mpi_count(self) -> Result<usize> {
        match self {
            PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSAEncrypt => Ok(1),
            PublicKeyAlgorithm::ElgamalEncrypt | PublicKeyAlgorithm::Elgamal => Ok(2),
            PublicKeyAlgorithm::RSASign | PublicKeyAlgorithm::DSA => {
                crate::unsupported_err!("{:?} cannot encrypt session keys", self)
            }
        }
    }
}
