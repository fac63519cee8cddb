//! Transaction execution over an undo-capable store.

use avm_auth::AuthorizationManager;
use avm_db::{DbError, Session};
use avm_hash::transaction_id;
use avm_ledger::{
    execute_action, ApplyHandler, ChainConfig, ChainError, HandlerRegistry, TransactionContext,
    TransactionTrace,
};
use avm_store::UndoStore;
use avm_system::register_system_handlers;
use avm_types::{
    AccountObject, Authority, Name, PublicKey, TimePointSec, Transaction, ACTIVE_PERMISSION,
    OWNER_PERMISSION, SYSTEM_ACCOUNT,
};
use tracing::{debug, info};

use crate::genesis::GenesisConfig;

pub struct Controller<S: UndoStore> {
    config: ChainConfig,
    store: S,
    handlers: HandlerRegistry<S>,
}

impl<S: UndoStore> Controller<S> {
    /// Build a controller with the system handlers registered.
    pub fn new(store: S, config: ChainConfig) -> Result<Self, ChainError> {
        config.validate()?;
        let mut handlers = HandlerRegistry::new();
        register_system_handlers(&mut handlers);
        Ok(Controller {
            config,
            store,
            handlers,
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Add or replace a native handler.
    pub fn register_handler(
        &mut self,
        receiver: Name,
        contract: Name,
        action: Name,
        handler: impl ApplyHandler<S> + 'static,
    ) {
        self.handlers.register(receiver, contract, action, handler);
    }

    /// Create the privileged system account controlled by the genesis key.
    pub fn initialize_genesis(&mut self, genesis: &GenesisConfig) -> Result<(), ChainError> {
        let mut session = Session::new(&mut self.store, &self.config.session);
        if session.is_account(SYSTEM_ACCOUNT)? {
            return Err(ChainError::validate("genesis state is already initialized"));
        }
        let now = genesis.initial_timestamp;
        session.create(|a: &mut AccountObject| {
            a.name = SYSTEM_ACCOUNT;
            a.creation_date = now;
            a.privileged = true;
        })?;

        let authority = Authority::from_key(genesis.initial_key.clone());
        let mut manager = AuthorizationManager::new(&mut session, &self.config.authorization);
        let owner =
            manager.create_permission(SYSTEM_ACCOUNT, OWNER_PERMISSION, 0, authority.clone(), now)?;
        manager.create_permission(SYSTEM_ACCOUNT, ACTIVE_PERMISSION, owner.id, authority, now)?;

        session.initialize_resources(SYSTEM_ACCOUNT)?;
        session.commit()?;
        info!(timestamp = %now, "genesis state initialized");
        Ok(())
    }

    /// Authorize and execute `trx` at `block_time`.
    ///
    /// `keys` are the public keys recovered from the transaction's
    /// signatures. On any error every state change of the transaction is
    /// rolled back.
    pub fn push_transaction(
        &mut self,
        trx: &Transaction,
        keys: &[PublicKey],
        block_time: TimePointSec,
    ) -> Result<TransactionTrace, ChainError> {
        if trx.delay_sec > 0 {
            return Err(ChainError::DeferredTransactionsUnsupported);
        }
        if trx.actions.is_empty() {
            return Err(ChainError::NoActions);
        }
        if trx.expiration < block_time {
            return Err(ChainError::Expired {
                expiration: trx.expiration,
                block_time,
            });
        }
        if trx
            .context_free_actions
            .iter()
            .any(|act| !act.authorization.is_empty())
        {
            return Err(ChainError::validate(
                "context-free actions cannot have authorizations",
            ));
        }

        let id = transaction_id(trx);
        let mut session = Session::new(&mut self.store, &self.config.session);
        AuthorizationManager::new(&mut session, &self.config.authorization).check_authorization(
            &trx.actions,
            keys,
            &[],
            trx.delay_sec,
        )?;

        let mut context = TransactionContext::new(id, block_time);
        let scheduled: Vec<u32> = trx
            .context_free_actions
            .iter()
            .map(|act| (act, true))
            .chain(trx.actions.iter().map(|act| (act, false)))
            .map(|(act, context_free)| {
                context.schedule_action(act.clone(), act.account, context_free, 0, 0)
            })
            .collect();
        for ordinal in scheduled {
            execute_action(
                &mut session,
                &mut context,
                &self.handlers,
                &self.config,
                ordinal,
                0,
            )?;
        }

        session.commit()?;
        let trace = context.into_trace();
        debug!(
            id = %hex::encode(trace.id),
            actions = trace.action_traces.len(),
            "transaction executed"
        );
        Ok(trace)
    }

    /// Run `read` against the current state; anything it writes is discarded.
    pub fn read_state<T>(
        &mut self,
        read: impl FnOnce(&mut Session<'_, S>) -> Result<T, DbError>,
    ) -> Result<T, ChainError> {
        let mut session = Session::new(&mut self.store, &self.config.session);
        let value = read(&mut session)?;
        session.discard()?;
        Ok(value)
    }
}
