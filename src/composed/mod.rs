//! Keys and messages assembled from their packets.

pub mod key;
pub mod message;

pub use self::key::SecretKeyBlock;
pub use self::message::{Esk, Message};
