//! Action execution layer for the avm execution core.
//!
//! - [`ApplyContext`]: executes one action for its receiver, then its
//!   notifications, then the inline actions they scheduled
//! - [`TransactionContext`]: action traces, ordinals and receipt digests of
//!   one transaction
//! - [`ApplyHandler`] / [`HandlerRegistry`]: native handlers keyed by
//!   `(receiver, contract, action)`
//! - [`ChainConfig`]: execution limits and layer configuration

pub mod apply_context;
pub mod config;
pub mod error;
pub mod handler;
pub mod trace;
pub mod transaction_context;

pub use apply_context::ApplyContext;
pub use config::ChainConfig;
pub use error::ChainError;
pub use handler::{ApplyHandler, HandlerKey, HandlerRegistry};
pub use trace::{ActionTrace, TransactionTrace};
pub use transaction_context::{execute_action, TransactionContext};
