//! Per-transaction execution state.

use avm_db::Session;
use avm_hash::merkle_root;
use avm_store::UndoStore;
use avm_types::{Action, Hash32, Name, TimePointSec};

use crate::apply_context::ApplyContext;
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::handler::HandlerRegistry;
use crate::trace::{ActionTrace, TransactionTrace};

pub struct TransactionContext {
    id: Hash32,
    block_time: TimePointSec,
    action_traces: Vec<ActionTrace>,
    executed_action_receipt_digests: Vec<Hash32>,
    /// Number of receiver executions so far, notifications included.
    action_id: u64,
}

impl TransactionContext {
    pub fn new(id: Hash32, block_time: TimePointSec) -> Self {
        TransactionContext {
            id,
            block_time,
            action_traces: Vec::new(),
            executed_action_receipt_digests: Vec::new(),
            action_id: 0,
        }
    }

    pub fn id(&self) -> Hash32 {
        self.id
    }

    pub fn block_time(&self) -> TimePointSec {
        self.block_time
    }

    pub fn action_id(&self) -> u64 {
        self.action_id
    }

    pub(crate) fn increment_action_id(&mut self) {
        self.action_id += 1;
    }

    /// Append a trace for `act` delivered to `receiver` and return its ordinal.
    pub fn schedule_action(
        &mut self,
        act: Action,
        receiver: Name,
        context_free: bool,
        creator_action_ordinal: u32,
        closest_unnotified_ancestor_action_ordinal: u32,
    ) -> u32 {
        let action_ordinal = self.action_traces.len() as u32 + 1;
        self.action_traces.push(ActionTrace {
            action_ordinal,
            creator_action_ordinal,
            closest_unnotified_ancestor_action_ordinal,
            receiver,
            act,
            context_free,
            receipt: None,
        });
        action_ordinal
    }

    /// Schedule the action of trace `copy_of` again, for another receiver.
    pub fn schedule_copy(
        &mut self,
        copy_of: u32,
        receiver: Name,
        context_free: bool,
        creator_action_ordinal: u32,
        closest_unnotified_ancestor_action_ordinal: u32,
    ) -> u32 {
        let act = self.trace(copy_of).act.clone();
        self.schedule_action(
            act,
            receiver,
            context_free,
            creator_action_ordinal,
            closest_unnotified_ancestor_action_ordinal,
        )
    }

    /// Panics if `action_ordinal` was never scheduled.
    pub fn trace(&self, action_ordinal: u32) -> &ActionTrace {
        match ordinal_index(action_ordinal).and_then(|i| self.action_traces.get(i)) {
            Some(trace) => trace,
            None => panic!("invariant violation: action ordinal {action_ordinal} out of range"),
        }
    }

    pub(crate) fn trace_mut(&mut self, action_ordinal: u32) -> &mut ActionTrace {
        match ordinal_index(action_ordinal).and_then(|i| self.action_traces.get_mut(i)) {
            Some(trace) => trace,
            None => panic!("invariant violation: action ordinal {action_ordinal} out of range"),
        }
    }

    pub fn action_traces(&self) -> &[ActionTrace] {
        &self.action_traces
    }

    pub(crate) fn record_receipt_digest(&mut self, digest: Hash32) {
        self.executed_action_receipt_digests.push(digest);
    }

    pub fn executed_action_receipt_digests(&self) -> &[Hash32] {
        &self.executed_action_receipt_digests
    }

    pub fn action_mroot(&self) -> Hash32 {
        merkle_root(&self.executed_action_receipt_digests)
    }

    pub fn into_trace(self) -> TransactionTrace {
        let action_mroot = self.action_mroot();
        TransactionTrace {
            id: self.id,
            block_time: self.block_time,
            action_traces: self.action_traces,
            action_mroot,
        }
    }
}

fn ordinal_index(action_ordinal: u32) -> Option<usize> {
    (action_ordinal as usize).checked_sub(1)
}

/// Execute the scheduled action `action_ordinal` with its notifications and
/// inline actions.
pub fn execute_action<S: UndoStore>(
    session: &mut Session<'_, S>,
    trx: &mut TransactionContext,
    registry: &HandlerRegistry<S>,
    config: &ChainConfig,
    action_ordinal: u32,
    recursion_depth: u16,
) -> Result<(), ChainError> {
    let mut ctx = ApplyContext::new(session, trx, registry, config, action_ordinal, recursion_depth);
    ctx.exec()
}
