use avm_store::UndoStore;
use avm_types::{AccountObject, GlobalPropertyObject, Name};

use crate::error::DbError;
use crate::keys::{self, ObjectType};
use crate::session::Session;

/// Id of the singleton global property row.
pub const GLOBAL_PROPERTY_ID: u64 = 1;

impl<S: UndoStore> Session<'_, S> {
    pub fn find_account(&mut self, name: Name) -> Result<Option<AccountObject>, DbError> {
        self.find_by_index(&keys::account_by_name(name))
    }

    pub fn get_account(&mut self, name: Name) -> Result<AccountObject, DbError> {
        self.find_account(name)?.ok_or(DbError::RowNotFound {
            object_type: ObjectType::Account,
            id: name.as_u64(),
        })
    }

    pub fn is_account(&mut self, name: Name) -> Result<bool, DbError> {
        Ok(self.find_account(name)?.is_some())
    }

    /// The global property row, created on first access.
    pub fn global_properties(&mut self) -> Result<GlobalPropertyObject, DbError> {
        match self.find::<GlobalPropertyObject>(GLOBAL_PROPERTY_ID)? {
            Some(gpo) => Ok(gpo),
            None => self.create(|_: &mut GlobalPropertyObject| {}),
        }
    }

    /// Advance and return the chain-wide action sequence.
    pub fn next_global_sequence(&mut self) -> Result<u64, DbError> {
        let gpo = self.global_properties()?;
        let gpo = self.modify(&gpo, |g| g.global_action_sequence += 1)?;
        Ok(gpo.global_action_sequence)
    }
}
