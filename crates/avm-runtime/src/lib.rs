//! Top-level driver of the avm execution core.
//!
//! [`Controller`] owns the store, the chain configuration and the native
//! handler registry. It installs the system account at genesis and applies
//! transactions one at a time, each inside its own undo session.

pub mod controller;
pub mod genesis;

pub use controller::Controller;
pub use genesis::GenesisConfig;
