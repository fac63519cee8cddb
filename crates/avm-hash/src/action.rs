use crate::hash::sha3_256_tagged;
use avm_serde::{encode_to_vec, StateEncode};
use avm_types::{Action, ActionReceipt, Hash32, Transaction};

/// Digest of an action as executed:
/// H("AVM:ACTION" || account || name || authorization || data)
pub fn action_digest(act: &Action) -> Hash32 {
    sha3_256_tagged("AVM:ACTION", &encode_to_vec(act))
}

/// Digest of an action receipt; these are the leaves of the action merkle root.
pub fn receipt_digest(receipt: &ActionReceipt) -> Hash32 {
    let mut out = Vec::new();
    receipt.encode_state(&mut out);
    sha3_256_tagged("AVM:RECEIPT", &out)
}

/// Transaction id: H("AVM:TX" || encoded transaction)
pub fn transaction_id(trx: &Transaction) -> Hash32 {
    sha3_256_tagged("AVM:TX", &encode_to_vec(trx))
}
