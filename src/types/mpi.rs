use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;
use num_bigint::BigUint;

use crate::errors::{Error, Result};
use crate::parsing::ByteCursor;
use crate::ser::Serialize;

/// Number of bits we accept when reading or writing MPIs.
/// The value is the same as gnupgs.
pub const MAX_EXTERN_MPI_BITS: u16 = 16384;

/// Represents an owned MPI value, leading zeros stripped.
///
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-3.2>
#[derive(Default, Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Mpi(#[debug("{}", hex::encode(_0))] Bytes);

impl Mpi {
    /// Parses a length-prefixed MPI.
    pub fn from_cursor(cur: &mut ByteCursor<'_>) -> Result<Self> {
        let raw = read_mpi_slice(cur)?;
        Ok(Mpi(Bytes::copy_from_slice(raw)))
    }

    /// Represent the data in `raw` as an Mpi.
    /// Note that `raw` is not expected to be length-prefixed!
    ///
    /// Strips leading zeros.
    pub fn from_slice(raw: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(strip_leading_zeros(raw)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

/// Reads a length-prefixed MPI and returns its magnitude without leading zeros.
///
/// The slice borrows from the cursor, so secret values never leave their buffer.
pub fn read_mpi_slice<'a>(cur: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    let offset = cur.position();
    let len_bits = cur.read_be_u16("mpi bit length")?;

    if len_bits > MAX_EXTERN_MPI_BITS {
        return Err(Error::MalformedPacket {
            context: format!(
                "mpi at offset {offset} has {len_bits} bits, more than {MAX_EXTERN_MPI_BITS}"
            ),
        });
    }

    let len_bytes = (usize::from(len_bits) + 7) >> 3;
    let n = cur.read_take(len_bytes, "mpi")?;

    Ok(strip_leading_zeros(n))
}

/// Returns the bit length of a given slice.
#[inline]
fn bit_size(val: &[u8]) -> usize {
    if val.is_empty() {
        0
    } else {
        (val.len() * 8) - val[0].leading_zeros() as usize
    }
}

#[inline]
fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .position(|b| b != &0)
        .map_or(&[], |offset| &bytes[offset..])
}

impl AsRef<[u8]> for Mpi {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Serialize for Mpi {
    fn to_writer<W: io::Write>(&self, w: &mut W) -> Result<()> {
        let bytes = &self.0;
        let size = bit_size(bytes);
        w.write_u16::<BigEndian>(size as u16)?;
        w.write_all(bytes)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        2 + self.0.len()
    }
}

impl From<&BigUint> for Mpi {
    fn from(other: &BigUint) -> Self {
        Mpi::from_slice(&other.to_bytes_be())
    }
}
