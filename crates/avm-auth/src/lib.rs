//! Authorization for the avm execution core.
//!
//! - [`AuthorityChecker`]: decides whether provided keys, permissions and
//!   delay satisfy a weighted threshold authority, tracking which keys were used
//! - [`AuthorizationManager`]: the permission tree, permission links and the
//!   declared-authorization checks run before a transaction executes

pub mod checker;
pub mod config;
pub mod error;
pub mod manager;

pub use checker::{AuthorityChecker, PermissionCache, PermissionCacheStatus};
pub use config::AuthorizationConfig;
pub use error::AuthError;
pub use manager::AuthorizationManager;
