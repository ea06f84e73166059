mod key_id;
mod mpi;
mod packet;
mod s2k;
mod secret_key_repr;
mod session_key;

pub use key_id::*;
pub use mpi::*;
pub use packet::*;
pub use s2k::*;
pub use secret_key_repr::*;
pub use session_key::*;
