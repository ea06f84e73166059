//! # Packet module
//!
//! Parsing of the packets needed to unlock keys and decrypt messages.
//! [`PacketParser`] splits a buffer into headers and bodies, the packet types
//! parse those bodies.

mod compressed_data;
mod header;
mod literal_data;
mod many;
mod packet_trait;
mod public_key_encrypted_session_key;
mod secret_key;
mod sym_encrypted_protected_data;
mod sym_key_encrypted_session_key;

pub use self::compressed_data::*;
pub use self::header::*;
pub use self::literal_data::*;
pub use self::many::*;
pub use self::packet_trait::*;
pub use self::public_key_encrypted_session_key::*;
pub use self::secret_key::*;
pub use self::sym_encrypted_protected_data::*;
pub use self::sym_key_encrypted_session_key::*;
