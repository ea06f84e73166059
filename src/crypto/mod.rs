//! # Cryptography module

pub mod checksum;
pub mod dsa;
pub mod hash;
pub mod public_key;
pub mod rsa;
pub mod sym;
