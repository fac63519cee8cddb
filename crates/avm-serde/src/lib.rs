pub mod action;
pub mod error;
pub mod io;
pub mod state;

pub use error::StateError;
pub use io::{decode_exact, encode_to_vec, StateDecode, StateEncode};
