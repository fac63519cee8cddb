use avm_store::UndoStore;
use avm_types::{Name, TableObject};

use crate::error::DbError;
use crate::keys;
use crate::session::Session;

impl<S: UndoStore> Session<'_, S> {
    pub fn find_table(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
    ) -> Result<Option<TableObject>, DbError> {
        self.find_by_index(&keys::table_by_code_scope_table(code, scope, table))
    }

    pub fn find_or_create_table(
        &mut self,
        code: Name,
        scope: Name,
        table: Name,
        payer: Name,
    ) -> Result<TableObject, DbError> {
        if let Some(existing) = self.find_table(code, scope, table)? {
            return Ok(existing);
        }
        self.create(|t: &mut TableObject| {
            t.code = code;
            t.scope = scope;
            t.table = table;
            t.payer = payer;
        })
    }

    pub fn remove_table(&mut self, table: &TableObject) -> Result<(), DbError> {
        self.remove(table)
    }
}
