use avm_store::UndoStore;
use avm_types::{Name, ResourceLimitsObject, ResourceUsageObject};

use crate::error::DbError;
use crate::keys::{self, ObjectType};
use crate::session::Session;

impl<S: UndoStore> Session<'_, S> {
    /// Create unlimited limits and zero usage for a new account.
    pub fn initialize_resources(&mut self, owner: Name) -> Result<(), DbError> {
        self.create(|r: &mut ResourceLimitsObject| {
            r.owner = owner;
        })?;
        self.create(|r: &mut ResourceUsageObject| {
            r.owner = owner;
        })?;
        Ok(())
    }

    pub fn resource_limits(&mut self, owner: Name) -> Result<ResourceLimitsObject, DbError> {
        self.find_by_index(&keys::resource_by_owner(ObjectType::ResourceLimits, owner))?
            .ok_or(DbError::RowNotFound {
                object_type: ObjectType::ResourceLimits,
                id: owner.as_u64(),
            })
    }

    pub fn set_resource_limits(
        &mut self,
        owner: Name,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    ) -> Result<ResourceLimitsObject, DbError> {
        let limits = self.resource_limits(owner)?;
        self.modify(&limits, |l| {
            l.ram_bytes = ram_bytes;
            l.net_weight = net_weight;
            l.cpu_weight = cpu_weight;
        })
    }

    pub fn resource_usage(&mut self, owner: Name) -> Result<ResourceUsageObject, DbError> {
        self.find_by_index(&keys::resource_by_owner(ObjectType::ResourceUsage, owner))?
            .ok_or(DbError::RowNotFound {
                object_type: ObjectType::ResourceUsage,
                id: owner.as_u64(),
            })
    }

    /// Add RAM usage for `owner`; a negative delta releases usage.
    pub fn add_ram_usage(&mut self, owner: Name, delta: i64) -> Result<ResourceUsageObject, DbError> {
        let usage = self.resource_usage(owner)?;
        self.modify(&usage, |u| {
            u.ram_usage = u.ram_usage.saturating_add_signed(delta);
        })
    }
}
