use std::ops::Deref;

use dsa::{Components, SigningKey, VerifyingKey};
use num_bigint::BigUint;

use crate::errors::{Error, Result};

/// Secret key for DSA.
#[derive(Clone, PartialEq, derive_more::Debug)]
pub struct DsaSecretKey {
    #[debug("..")]
    key: SigningKey,
}

impl Deref for DsaSecretKey {
    type Target = SigningKey;
    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

impl Eq for DsaSecretKey {}

fn invalid(err: impl std::fmt::Display) -> Error {
    Error::InvalidKeyMaterial {
        context: format!("dsa: {err}"),
    }
}

impl DsaSecretKey {
    /// Builds the signing key from the domain parameters, `y` and the secret `x`.
    pub fn from_components(
        p: BigUint,
        q: BigUint,
        g: BigUint,
        y: BigUint,
        x: BigUint,
    ) -> Result<Self> {
        let one = BigUint::from(1u8);
        if p <= one || q <= one || g <= one {
            return Err(invalid("p, q and g must be greater than one"));
        }
        if g.modpow(&x, &p) != y {
            return Err(invalid("y does not match g^x mod p"));
        }

        let components = Components::from_components(p, q, g).map_err(invalid)?;
        let verifying_key = VerifyingKey::from_components(components, y).map_err(invalid)?;
        let key = SigningKey::from_components(verifying_key, x).map_err(invalid)?;

        Ok(Self { key })
    }

    pub fn p(&self) -> &BigUint {
        self.key.verifying_key().components().p()
    }

    pub fn q(&self) -> &BigUint {
        self.key.verifying_key().components().q()
    }

    pub fn g(&self) -> &BigUint {
        self.key.verifying_key().components().g()
    }

    pub fn y(&self) -> &BigUint {
        self.key.verifying_key().y()
    }

    pub fn x(&self) -> &BigUint {
        self.key.x()
    }
}
