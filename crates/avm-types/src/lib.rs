//! Core chain types for the avm execution core: names, authorities, state
//! objects, actions and native action payloads.

pub mod action;
pub mod authority;
pub mod name;
pub mod native;
pub mod primitives;
pub mod state_account;
pub mod state_table;

pub use action::*;
pub use authority::*;
pub use name::*;
pub use native::*;
pub use primitives::*;
pub use state_account::*;
pub use state_table::*;
