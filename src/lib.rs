//! # lega-pgp
//!
//! Decoding and decryption of OpenPGP (RFC 4880) data as it arrives in an
//! archive submission: ASCII armor, packet framing, passphrase protected
//! secret keys and integrity protected encrypted messages.
//!
//! ## Unlocking a key and decrypting a message
//!
//! ```no_run
//! use lega_pgp::composed::{Message, SecretKeyBlock};
//! use lega_pgp::config::DecryptOptions;
//!
//! # fn main() -> lega_pgp::errors::Result<()> {
//! let key_file = std::fs::read("key.asc")?;
//! let (key, _headers) = SecretKeyBlock::from_armor_single(&key_file)?;
//!
//! let msg_file = std::fs::read("submission.asc")?;
//! let (msg, _headers) = Message::from_armor_single(&msg_file)?;
//!
//! let literal = msg.decrypt_with_key(&[key], b"passphrase", &DecryptOptions::default())?;
//! println!("{} bytes of {:?}", literal.data().len(), literal.file_name());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::unwrap_used, rust_2018_idioms)]

#[macro_use]
pub mod errors;

pub mod armor;
pub mod composed;
pub mod config;
pub mod crc24;
pub mod crypto;
pub mod packet;
pub mod parsing;
pub mod ser;
pub mod types;

pub use self::composed::{Esk, Message, SecretKeyBlock};
pub use self::config::{DecryptOptions, DecryptOptionsBuilder};
pub use self::errors::{Error, ErrorKind, Result};
