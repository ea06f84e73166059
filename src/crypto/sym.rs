use aes::{Aes128, Aes192, Aes256};
use blowfish::Blowfish;
use cast5::Cast5;
use cfb_mode::{
    cipher::{AsyncStreamCipher, KeyIvInit},
    Decryptor, Encryptor,
};
use des::TdesEde3;
use log::debug;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::{CryptoRng, Rng};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use twofish::Twofish;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// MDC is 1 byte packet tag, 1 byte length prefix and 20 bytes SHA1 hash.
pub const MDC_LEN: usize = 22;

const MDC_HEADER: [u8; 2] = [0xD3, 0x14];

/// Available symmetric key algorithms.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.2>
#[derive(Debug, PartialEq, Eq, Copy, Clone, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SymmetricKeyAlgorithm {
    /// Triple-DES
    TripleDES = 2,
    /// CAST5
    CAST5 = 3,
    /// Blowfish
    Blowfish = 4,
    // 5 & 6 are reserved for DES/SK
    /// AES with 128-bit key
    AES128 = 7,
    /// AES with 192-bit key
    AES192 = 8,
    /// AES with 256-bit key
    AES256 = 9,
    /// Twofish with 256-bit key
    Twofish = 10,
}

impl zeroize::DefaultIsZeroes for SymmetricKeyAlgorithm {}

#[allow(clippy::derivable_impls)]
impl Default for SymmetricKeyAlgorithm {
    fn default() -> Self {
        Self::AES128
    }
}

impl SymmetricKeyAlgorithm {
    /// Resolves an OpenPGP cipher id. Plaintext (0), IDEA (1) and Camellia are rejected.
    pub fn from_id(id: u8) -> Result<Self> {
        Self::try_from(id).map_err(|_| Error::UnsupportedAlgorithm {
            context: format!("symmetric key algorithm {id}"),
        })
    }

    /// The size of a single block in bytes.
    pub fn block_size(self) -> usize {
        match self {
            SymmetricKeyAlgorithm::TripleDES => 8,
            SymmetricKeyAlgorithm::CAST5 => 8,
            SymmetricKeyAlgorithm::Blowfish => 8,
            SymmetricKeyAlgorithm::AES128 => 16,
            SymmetricKeyAlgorithm::AES192 => 16,
            SymmetricKeyAlgorithm::AES256 => 16,
            SymmetricKeyAlgorithm::Twofish => 16,
        }
    }

    /// The size of the key in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            SymmetricKeyAlgorithm::TripleDES => 24,
            SymmetricKeyAlgorithm::CAST5 => 16,
            SymmetricKeyAlgorithm::Blowfish => 16,
            SymmetricKeyAlgorithm::AES128 => 16,
            SymmetricKeyAlgorithm::AES192 => 24,
            SymmetricKeyAlgorithm::AES256 => 32,
            SymmetricKeyAlgorithm::Twofish => 32,
        }
    }

    /// Decrypts an integrity protected payload (RFC 4880, section 5.13).
    ///
    /// The IV is all zeroes and there is no resynchronisation. The random
    /// prefix must repeat its last two bytes, and with `check_mdc` the
    /// trailing modification detection code must match. Returns the payload
    /// without prefix and MDC.
    pub fn decrypt_and_verify(
        self,
        key: &[u8],
        ciphertext: &[u8],
        check_mdc: bool,
    ) -> Result<Vec<u8>> {
        let bs = self.block_size();
        let prefix_len = bs + 2;
        let needed = prefix_len + if check_mdc { MDC_LEN } else { 0 };
        if ciphertext.len() < needed {
            return Err(Error::ShortRead {
                context: "encrypted data prefix",
                offset: 0,
                needed,
                remaining: ciphertext.len(),
            });
        }

        debug!(
            "decrypting {} bytes with {:?}, mdc: {}",
            ciphertext.len(),
            self,
            check_mdc
        );

        let iv_vec = vec![0u8; bs];
        let mut cleartext = Zeroizing::new(ciphertext.to_vec());
        self.decrypt_with_iv_regular(key, &iv_vec, &mut cleartext)?;

        // quick check
        if !bool::from(cleartext[bs - 2..bs].ct_eq(&cleartext[bs..prefix_len])) {
            return Err(Error::PrefixCheckFailed {
                context: format!("{self:?} prefix does not repeat its last two octets"),
            });
        }

        if !check_mdc {
            return Ok(cleartext[prefix_len..].to_vec());
        }

        let mdc_start = cleartext.len() - MDC_LEN;
        let mut expected = [0u8; MDC_LEN];
        expected[..2].copy_from_slice(&MDC_HEADER);
        expected[2..].copy_from_slice(&Sha1::digest(&cleartext[..mdc_start + 2]));
        if !bool::from(cleartext[mdc_start..].ct_eq(&expected[..])) {
            return Err(Error::MdcMismatch {
                context: format!(
                    "over {} bytes of {:?} protected data",
                    mdc_start + 2,
                    self
                ),
            });
        }

        Ok(cleartext[prefix_len..mdc_start].to_vec())
    }

    /// Decrypt the data using CFB mode, without padding. Overwrites the input.
    /// This is regular CFB, not OpenPGP CFB.
    pub fn decrypt_with_iv_regular(
        self,
        key: &[u8],
        iv_vec: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<()> {
        match self {
            SymmetricKeyAlgorithm::TripleDES => {
                Decryptor::<TdesEde3>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
            SymmetricKeyAlgorithm::CAST5 => {
                Decryptor::<Cast5>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
            SymmetricKeyAlgorithm::Blowfish => {
                Decryptor::<Blowfish>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
            SymmetricKeyAlgorithm::AES128 => {
                Decryptor::<Aes128>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
            SymmetricKeyAlgorithm::AES192 => {
                Decryptor::<Aes192>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
            SymmetricKeyAlgorithm::AES256 => {
                Decryptor::<Aes256>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
            SymmetricKeyAlgorithm::Twofish => {
                Decryptor::<Twofish>::new_from_slices(key, iv_vec)?.decrypt(ciphertext);
            }
        }

        Ok(())
    }

    /// Encrypt the data using CFB mode, without padding. Overwrites the input.
    pub fn encrypt_with_iv_regular(
        self,
        key: &[u8],
        iv_vec: &[u8],
        plaintext: &mut [u8],
    ) -> Result<()> {
        match self {
            SymmetricKeyAlgorithm::TripleDES => {
                Encryptor::<TdesEde3>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
            SymmetricKeyAlgorithm::CAST5 => {
                Encryptor::<Cast5>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
            SymmetricKeyAlgorithm::Blowfish => {
                Encryptor::<Blowfish>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
            SymmetricKeyAlgorithm::AES128 => {
                Encryptor::<Aes128>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
            SymmetricKeyAlgorithm::AES192 => {
                Encryptor::<Aes192>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
            SymmetricKeyAlgorithm::AES256 => {
                Encryptor::<Aes256>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
            SymmetricKeyAlgorithm::Twofish => {
                Encryptor::<Twofish>::new_from_slices(key, iv_vec)?.encrypt(plaintext);
            }
        }
        Ok(())
    }

    /// Builds the inverse of [`Self::decrypt_and_verify`]: random prefix,
    /// quick check, payload and MDC, encrypted with an all zero IV.
    pub fn encrypt_protected<R: CryptoRng + Rng>(
        self,
        mut rng: R,
        key: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        debug!("protected encrypt");

        let bs = self.block_size();

        let prefix_len = bs + 2;
        let plaintext_len = plaintext.len();

        let mut ciphertext = vec![0u8; prefix_len + plaintext_len + MDC_LEN];

        // prefix
        rng.fill_bytes(&mut ciphertext[..bs]);

        // add quick check
        ciphertext[bs] = ciphertext[bs - 2];
        ciphertext[bs + 1] = ciphertext[bs - 1];

        // plaintext
        ciphertext[prefix_len..(prefix_len + plaintext_len)].copy_from_slice(plaintext);
        // mdc header
        ciphertext[prefix_len + plaintext_len..prefix_len + plaintext_len + 2]
            .copy_from_slice(&MDC_HEADER);
        // mdc body
        let checksum = Sha1::digest(&ciphertext[..(prefix_len + plaintext_len + 2)]);
        ciphertext[(prefix_len + plaintext_len + 2)..].copy_from_slice(&checksum);

        // IV is all zeroes
        let iv_vec = vec![0u8; bs];

        self.encrypt_with_iv_regular(key, &iv_vec, &mut ciphertext)?;

        Ok(ciphertext)
    }
}
