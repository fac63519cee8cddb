pub mod action;
pub mod hash;
pub mod merkle;

pub use action::{action_digest, receipt_digest, transaction_id};
pub use hash::{sha3_256, sha3_256_tagged};
pub use merkle::merkle_root;
