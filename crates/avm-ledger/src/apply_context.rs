//! Execution of one action: its receiver, the accounts it notifies and the
//! inline actions they send.
//!
//! Order is strictly depth-first: the primary receiver runs first, then every
//! notified receiver in the order it was first required, then context-free
//! inline actions, then regular inline actions, each of which recursively
//! runs its own notifications and inline actions before the next one starts.

use std::collections::BTreeMap;

use avm_auth::AuthorizationManager;
use avm_db::{IndexSet, PrimaryTable, SecondaryKey, SecondaryTable, Session};
use avm_hash::{action_digest, receipt_digest};
use avm_serde::encode_to_vec;
use avm_store::UndoStore;
use avm_types::{
    Action, ActionReceipt, Float128, Name, PermissionLevel, TimePointSec, CODE_PERMISSION, U256,
};
use tracing::{debug, trace};

use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::handler::{HandlerKey, HandlerRegistry};
use crate::transaction_context::{execute_action, TransactionContext};

pub struct ApplyContext<'a, 's, S: UndoStore> {
    session: &'a mut Session<'s, S>,
    trx: &'a mut TransactionContext,
    registry: &'a HandlerRegistry<S>,
    config: &'a ChainConfig,

    act: Action,
    receiver: Name,
    action_ordinal: u32,
    first_receiver_action_ordinal: u32,
    recursion_depth: u16,
    context_free: bool,
    privileged: bool,

    used_authorizations: Vec<bool>,
    notified: Vec<(Name, u32)>,
    inline_actions: Vec<u32>,
    cfa_inline_actions: Vec<u32>,
    indices: IndexSet,
}

impl<'a, 's, S: UndoStore> ApplyContext<'a, 's, S> {
    pub fn new(
        session: &'a mut Session<'s, S>,
        trx: &'a mut TransactionContext,
        registry: &'a HandlerRegistry<S>,
        config: &'a ChainConfig,
        action_ordinal: u32,
        recursion_depth: u16,
    ) -> Self {
        let trace = trx.trace(action_ordinal);
        let act = trace.act.clone();
        let receiver = trace.receiver;
        let context_free = trace.context_free;
        let used_authorizations = vec![false; act.authorization.len()];
        ApplyContext {
            session,
            trx,
            registry,
            config,
            act,
            receiver,
            action_ordinal,
            first_receiver_action_ordinal: action_ordinal,
            recursion_depth,
            context_free,
            privileged: false,
            used_authorizations,
            notified: Vec::new(),
            inline_actions: Vec::new(),
            cfa_inline_actions: Vec::new(),
            indices: IndexSet::new(),
        }
    }

    // ========================================================================
    // Execution
    // ========================================================================

    pub fn exec(&mut self) -> Result<(), ChainError> {
        self.notified.push((self.receiver, self.action_ordinal));
        self.exec_one()?;
        self.trx.increment_action_id();

        // receivers may append further notifications while this loop runs
        let mut i = 1;
        while i < self.notified.len() {
            let (receiver, action_ordinal) = self.notified[i];
            self.receiver = receiver;
            self.action_ordinal = action_ordinal;
            self.exec_one()?;
            self.trx.increment_action_id();
            i += 1;
        }

        if self.cfa_inline_actions.is_empty() && self.inline_actions.is_empty() {
            return Ok(());
        }
        if self.recursion_depth >= self.config.max_inline_action_depth {
            return Err(ChainError::InlineActionRecursionDepthExceeded {
                limit: self.config.max_inline_action_depth,
            });
        }
        let cfa_inline_actions = std::mem::take(&mut self.cfa_inline_actions);
        let inline_actions = std::mem::take(&mut self.inline_actions);
        for ordinal in cfa_inline_actions.into_iter().chain(inline_actions) {
            execute_action(
                &mut *self.session,
                &mut *self.trx,
                self.registry,
                self.config,
                ordinal,
                self.recursion_depth + 1,
            )?;
        }
        Ok(())
    }

    fn exec_one(&mut self) -> Result<(), ChainError> {
        let receiver_account = self
            .session
            .find_account(self.receiver)?
            .ok_or(ChainError::UnknownAccount(self.receiver))?;
        self.privileged = receiver_account.privileged;
        debug!(
            receiver = %self.receiver,
            contract = %self.act.account,
            action = %self.act.name,
            ordinal = self.action_ordinal,
            depth = self.recursion_depth,
            "apply"
        );

        if !self.context_free {
            let key = HandlerKey::new(self.receiver, self.act.account, self.act.name);
            let registry = self.registry;
            match registry.find(&key) {
                Some(handler) => handler.apply(self)?,
                None if receiver_account.has_code() => {
                    return Err(ChainError::ContractExecutionUnsupported {
                        receiver: self.receiver,
                        contract: self.act.account,
                        action: self.act.name,
                    });
                }
                None => {}
            }
        }

        let receipt = self.build_receipt()?;
        let digest = receipt_digest(&receipt);
        trace!(
            receiver = %receipt.receiver,
            global_sequence = receipt.global_sequence,
            recv_sequence = receipt.recv_sequence,
            "action receipt"
        );
        self.trx.trace_mut(self.action_ordinal).receipt = Some(receipt);
        self.trx.record_receipt_digest(digest);
        Ok(())
    }

    /// Advances the persisted sequence counters: the global sequence and the
    /// receiver's `recv_sequence` once, each authorizing actor's
    /// `auth_sequence` once however often it is declared.
    fn build_receipt(&mut self) -> Result<ActionReceipt, ChainError> {
        let act_digest = action_digest(&self.act);
        let global_sequence = self.session.next_global_sequence()?;

        let receiver_account = self.session.get_account(self.receiver)?;
        let receiver_account = self
            .session
            .modify(&receiver_account, |a| a.recv_sequence += 1)?;

        let contract_account = if self.act.account == self.receiver {
            receiver_account.clone()
        } else {
            self.session.get_account(self.act.account)?
        };

        let mut auth_sequence = BTreeMap::new();
        for auth in &self.act.authorization {
            if auth_sequence.contains_key(&auth.actor) {
                continue;
            }
            let actor = self.session.get_account(auth.actor)?;
            let actor = self.session.modify(&actor, |a| a.auth_sequence += 1)?;
            auth_sequence.insert(auth.actor, actor.auth_sequence);
        }

        Ok(ActionReceipt {
            receiver: self.receiver,
            act_digest,
            global_sequence,
            recv_sequence: receiver_account.recv_sequence,
            auth_sequence,
            code_sequence: contract_account.code_sequence,
            abi_sequence: contract_account.abi_sequence,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn act(&self) -> &Action {
        &self.act
    }

    pub fn receiver(&self) -> Name {
        self.receiver
    }

    pub fn action_ordinal(&self) -> u32 {
        self.action_ordinal
    }

    pub fn recursion_depth(&self) -> u16 {
        self.recursion_depth
    }

    pub fn is_context_free(&self) -> bool {
        self.context_free
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn config(&self) -> &ChainConfig {
        self.config
    }

    pub fn block_time(&self) -> TimePointSec {
        self.trx.block_time()
    }

    pub fn session(&mut self) -> &mut Session<'s, S> {
        &mut *self.session
    }

    pub fn authorization_manager(&mut self) -> AuthorizationManager<'_, 's, S> {
        AuthorizationManager::new(&mut *self.session, &self.config.authorization)
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Require that `account` declared any permission on this action.
    pub fn require_auth(&mut self, account: Name) -> Result<(), ChainError> {
        for (i, auth) in self.act.authorization.iter().enumerate() {
            if auth.actor == account {
                self.used_authorizations[i] = true;
                return Ok(());
            }
        }
        Err(ChainError::MissingAuth(account))
    }

    /// Require that `account@permission` is declared on this action.
    pub fn require_auth2(&mut self, account: Name, permission: Name) -> Result<(), ChainError> {
        for (i, auth) in self.act.authorization.iter().enumerate() {
            if auth.actor == account && auth.permission == permission {
                self.used_authorizations[i] = true;
                return Ok(());
            }
        }
        Err(ChainError::MissingPermission(PermissionLevel::new(
            account, permission,
        )))
    }

    pub fn has_auth(&self, account: Name) -> bool {
        self.act.authorization.iter().any(|auth| auth.actor == account)
    }

    /// Declared authorizations that a `require_auth` call has consumed.
    pub fn used_authorizations(&self) -> &[bool] {
        &self.used_authorizations
    }

    pub fn is_account(&mut self, name: Name) -> Result<bool, ChainError> {
        Ok(self.session.is_account(name)?)
    }

    // ========================================================================
    // Notifications and inline actions
    // ========================================================================

    /// Also deliver this action to `recipient`, once.
    pub fn require_recipient(&mut self, recipient: Name) {
        if self.has_recipient(recipient) {
            return;
        }
        let ordinal = self.trx.schedule_copy(
            self.action_ordinal,
            recipient,
            false,
            self.action_ordinal,
            self.first_receiver_action_ordinal,
        );
        self.notified.push((recipient, ordinal));
    }

    pub fn has_recipient(&self, code: Name) -> bool {
        self.notified.iter().any(|(receiver, _)| *receiver == code)
    }

    /// Schedule `act` to run after this action and its notifications.
    ///
    /// Unless the receiver is privileged, every declared authorization must
    /// be satisfiable by `receiver@eosio.code`.
    pub fn send_inline(&mut self, act: Action) -> Result<(), ChainError> {
        self.check_inline_size(&act)?;
        self.require_code_account(act.account)?;
        for auth in &act.authorization {
            if !self.session.is_account(auth.actor)? {
                return Err(ChainError::validate(format!(
                    "inline action's authorizing actor {} does not exist",
                    auth.actor
                )));
            }
            if self
                .session
                .find_permission_by_owner(auth.actor, auth.permission)?
                .is_none()
            {
                return Err(ChainError::validate(format!(
                    "inline action's authorizations include a non-existent permission: {auth}"
                )));
            }
        }
        if !self.privileged {
            let provided = [PermissionLevel::new(self.receiver, CODE_PERMISSION)];
            self.authorization_manager().check_authorization(
                std::slice::from_ref(&act),
                &[],
                &provided,
                0,
            )?;
        }
        let receiver = act.account;
        let ordinal = self.trx.schedule_action(
            act,
            receiver,
            false,
            self.action_ordinal,
            self.first_receiver_action_ordinal,
        );
        self.inline_actions.push(ordinal);
        Ok(())
    }

    /// Schedule a context-free `act`, which may not carry authorizations.
    pub fn send_context_free_inline(&mut self, act: Action) -> Result<(), ChainError> {
        self.check_inline_size(&act)?;
        self.require_code_account(act.account)?;
        if !act.authorization.is_empty() {
            return Err(ChainError::validate(
                "context-free actions cannot have authorizations",
            ));
        }
        let receiver = act.account;
        let ordinal = self.trx.schedule_action(
            act,
            receiver,
            true,
            self.action_ordinal,
            self.first_receiver_action_ordinal,
        );
        self.cfa_inline_actions.push(ordinal);
        Ok(())
    }

    fn check_inline_size(&self, act: &Action) -> Result<(), ChainError> {
        let size = encode_to_vec(act).len();
        let limit = self.config.max_inline_action_size;
        if size >= limit as usize {
            return Err(ChainError::InlineActionTooBig { size, limit });
        }
        Ok(())
    }

    fn require_code_account(&mut self, account: Name) -> Result<(), ChainError> {
        if self.session.is_account(account)? {
            return Ok(());
        }
        Err(ChainError::validate(format!(
            "inline action's code account {account} does not exist"
        )))
    }

    // ========================================================================
    // Contract tables
    // ========================================================================

    /// The `db_*_i64` family for the current receiver.
    pub fn db_i64(&mut self) -> PrimaryTable<'_, 's, S> {
        self.indices.primary(&mut *self.session, self.receiver)
    }

    /// The secondary index family of key kind `K` for the current receiver.
    pub fn db_secondary<K: SecondaryKey>(&mut self) -> SecondaryTable<'_, 's, S, K> {
        self.indices.secondary::<S, K>(&mut *self.session, self.receiver)
    }

    pub fn db_idx64(&mut self) -> SecondaryTable<'_, 's, S, u64> {
        self.db_secondary()
    }

    pub fn db_idx128(&mut self) -> SecondaryTable<'_, 's, S, u128> {
        self.db_secondary()
    }

    pub fn db_idx256(&mut self) -> SecondaryTable<'_, 's, S, U256> {
        self.db_secondary()
    }

    pub fn db_idx_double(&mut self) -> SecondaryTable<'_, 's, S, f64> {
        self.db_secondary()
    }

    pub fn db_idx_long_double(&mut self) -> SecondaryTable<'_, 's, S, Float128> {
        self.db_secondary()
    }
}
