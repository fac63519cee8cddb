//! Execution traces.

use avm_types::{Action, ActionReceipt, Hash32, Name, TimePointSec};

/// One scheduled or executed action.
///
/// Ordinals are 1-based positions in [`TransactionTrace::action_traces`];
/// `0` means "no such action" (top-level actions have no creator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionTrace {
    pub action_ordinal: u32,
    pub creator_action_ordinal: u32,
    pub closest_unnotified_ancestor_action_ordinal: u32,
    pub receiver: Name,
    pub act: Action,
    pub context_free: bool,
    /// Set once the action has executed.
    pub receipt: Option<ActionReceipt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionTrace {
    pub id: Hash32,
    pub block_time: TimePointSec,
    pub action_traces: Vec<ActionTrace>,
    /// Merkle root over the digests of every executed action receipt.
    pub action_mroot: Hash32,
}

impl TransactionTrace {
    /// Traces that produced a receipt, in execution order.
    pub fn executed(&self) -> impl Iterator<Item = &ActionTrace> {
        let mut executed: Vec<&ActionTrace> = self
            .action_traces
            .iter()
            .filter(|t| t.receipt.is_some())
            .collect();
        executed.sort_by_key(|t| t.receipt.as_ref().map_or(0, |r| r.global_sequence));
        executed.into_iter()
    }
}
