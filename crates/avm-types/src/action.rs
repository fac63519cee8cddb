//! Actions, transactions and action receipts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::authority::PermissionLevel;
use crate::name::Name;
use crate::primitives::{Hash32, TimePointSec};

/// A single contract invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The contract that defines the action.
    pub account: Name,
    pub name: Name,
    pub authorization: Vec<PermissionLevel>,
    pub data: Vec<u8>,
}

impl Action {
    pub fn new(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> Self {
        Action {
            account,
            name,
            authorization,
            data,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub expiration: TimePointSec,
    pub delay_sec: u32,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
}

impl Transaction {
    pub fn new(actions: Vec<Action>) -> Self {
        Transaction {
            actions,
            ..Default::default()
        }
    }

    /// Context-free actions first, then regular actions.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.context_free_actions.iter().chain(self.actions.iter())
    }
}

/// Proof that `receiver` executed an action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionReceipt {
    pub receiver: Name,
    pub act_digest: Hash32,
    pub global_sequence: u64,
    pub recv_sequence: u64,
    /// Per authorizing actor, that actor's auth sequence after this action.
    pub auth_sequence: BTreeMap<Name, u64>,
    pub code_sequence: u32,
    pub abi_sequence: u32,
}
