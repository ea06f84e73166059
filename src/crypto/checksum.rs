use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::errors::{Error, Result};

/// Length of the SHA1 checksum used with S2K usage 254.
pub const SHA1_LEN: usize = 20;

/// Length of the two octet sum checksum.
pub const SIMPLE_LEN: usize = 2;

/// Two octet checksum: sum of all octets mod 65536.
#[inline]
pub fn calculate_simple(data: &[u8]) -> u16 {
    data.iter()
        .fold(0u16, |acc, v| acc.wrapping_add(u16::from(*v)))
}

/// Checks a big endian two octet sum over `data`.
#[inline]
pub fn simple(actual: &[u8], data: &[u8]) -> Result<()> {
    let expected = calculate_simple(data).to_be_bytes();
    if !bool::from(actual.ct_eq(&expected[..])) {
        return Err(Error::ChecksumMismatch {
            context: format!("invalid two octet checksum over {} bytes", data.len()),
        });
    }

    Ok(())
}

/// SHA1 checksum, first 20 octets.
#[inline]
pub fn sha1(hash: &[u8], data: &[u8]) -> Result<()> {
    if !bool::from(hash.ct_eq(&Sha1::digest(data)[..])) {
        return Err(Error::ChecksumMismatch {
            context: format!("invalid SHA1 checksum over {} bytes", data.len()),
        });
    }

    Ok(())
}

/// Verifies the checksum trailing decrypted secret key material and returns
/// the material without it.
///
/// Usage `254` carries a SHA1 hash, every other usage value (`0`, `255` and
/// the legacy cipher ids) a two octet sum.
pub fn validate(decrypted: &[u8], s2k_usage: u8) -> Result<&[u8]> {
    let checksum_len = if s2k_usage == 254 {
        SHA1_LEN
    } else {
        SIMPLE_LEN
    };

    if decrypted.len() < checksum_len {
        return Err(Error::ShortRead {
            context: "secret key checksum",
            offset: 0,
            needed: checksum_len,
            remaining: decrypted.len(),
        });
    }

    let (data, checksum) = decrypted.split_at(decrypted.len() - checksum_len);
    if s2k_usage == 254 {
        sha1(checksum, data)?;
    } else {
        simple(checksum, data)?;
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use proptest::prelude::*;

    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn simple_sum_wraps() {
        assert_eq!(calculate_simple(&[]), 0);
        assert_eq!(calculate_simple(&[0xFF; 257]), (0xFFu32 * 257 % 65536) as u16);
        assert_eq!(calculate_simple(&[0xFF; 300]), (0xFFu32 * 300 % 65536) as u16);
    }

    #[test]
    fn validate_sha1() {
        let data = b"secret mpis".to_vec();
        let mut material = data.clone();
        material.extend_from_slice(&Sha1::digest(&data));
        assert_eq!(validate(&material, 254).unwrap(), &data[..]);

        // a two octet sum does not validate as usage 254
        let mut material = data.clone();
        material.extend_from_slice(&calculate_simple(&data).to_be_bytes());
        assert_eq!(
            validate(&material, 254).unwrap_err().kind(),
            ErrorKind::ShortRead
        );
        assert_eq!(validate(&material, 255).unwrap(), &data[..]);
    }

    #[test]
    fn validate_too_short() {
        assert_eq!(validate(&[1], 0).unwrap_err().kind(), ErrorKind::ShortRead);
        assert_eq!(validate(&[0, 0], 0).unwrap(), &[] as &[u8]);
        assert_eq!(
            validate(&[0u8; 19], 254).unwrap_err().kind(),
            ErrorKind::ShortRead
        );
    }

    #[test]
    fn legacy_usage_uses_sum() {
        let mut material = vec![1u8, 2, 3];
        material.extend_from_slice(&6u16.to_be_bytes());
        // usage 7 means AES128 with a simple MD5 S2K and a two octet sum
        assert_eq!(validate(&material, 7).unwrap(), &[1u8, 2, 3][..]);
    }

    proptest! {
        #[test]
        fn sum_accepts_and_rejects_flips(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            which in 0usize..2,
            bit in 0u8..8,
        ) {
            let mut material = data.clone();
            material.extend_from_slice(&calculate_simple(&data).to_be_bytes());
            prop_assert_eq!(validate(&material, 0).unwrap(), &data[..]);

            let idx = material.len() - 2 + which;
            material[idx] ^= 1 << bit;
            prop_assert_eq!(
                validate(&material, 0).unwrap_err().kind(),
                ErrorKind::ChecksumMismatch
            );
        }

        #[test]
        fn sha1_rejects_flips(
            data in proptest::collection::vec(any::<u8>(), 0..128),
            pos: prop::sample::Index,
        ) {
            let mut material = data.clone();
            material.extend_from_slice(&Sha1::digest(&data));
            let idx = pos.index(material.len());
            material[idx] ^= 0x01;
            prop_assert_eq!(
                validate(&material, 254).unwrap_err().kind(),
                ErrorKind::ChecksumMismatch
            );
        }
    }
}
