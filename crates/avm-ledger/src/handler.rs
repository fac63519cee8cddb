//! Native apply handlers.

use std::collections::HashMap;

use avm_store::UndoStore;
use avm_types::Name;

use crate::apply_context::ApplyContext;
use crate::error::ChainError;

/// Dispatch key of a native handler.
///
/// `receiver` is the account executing the action, `contract` the account
/// that defines it. They differ when a notification is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerKey {
    pub receiver: Name,
    pub contract: Name,
    pub action: Name,
}

impl HandlerKey {
    pub const fn new(receiver: Name, contract: Name, action: Name) -> Self {
        HandlerKey {
            receiver,
            contract,
            action,
        }
    }
}

/// An action implemented natively rather than by contract code.
pub trait ApplyHandler<S: UndoStore> {
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError>;
}

impl<S, F> ApplyHandler<S> for F
where
    S: UndoStore,
    F: Fn(&mut ApplyContext<'_, '_, S>) -> Result<(), ChainError>,
{
    fn apply(&self, ctx: &mut ApplyContext<'_, '_, S>) -> Result<(), ChainError> {
        self(ctx)
    }
}

/// Dispatch table built once when the controller is constructed.
pub struct HandlerRegistry<S: UndoStore> {
    handlers: HashMap<HandlerKey, Box<dyn ApplyHandler<S>>>,
}

impl<S: UndoStore> Default for HandlerRegistry<S> {
    fn default() -> Self {
        HandlerRegistry {
            handlers: HashMap::new(),
        }
    }
}

impl<S: UndoStore> HandlerRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`, replacing any handler already under the same key.
    pub fn register(
        &mut self,
        receiver: Name,
        contract: Name,
        action: Name,
        handler: impl ApplyHandler<S> + 'static,
    ) {
        self.handlers
            .insert(HandlerKey::new(receiver, contract, action), Box::new(handler));
    }

    pub fn find(&self, key: &HandlerKey) -> Option<&dyn ApplyHandler<S>> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
