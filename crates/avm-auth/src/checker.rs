//! Weighted threshold authority evaluation.
//!
//! An authority is satisfied when the weights of its satisfied entries reach
//! its threshold. Key entries are satisfied by a matching provided key,
//! permission-level entries by recursively satisfying that permission's own
//! authority, and wait entries by a provided delay of at least `wait_sec`.

use std::collections::{BTreeMap, BTreeSet};

use avm_types::{
    Authority, KeyWeight, Name, PermissionLevel, PermissionLevelWeight, PublicKey, WaitWeight,
};
use tracing::trace;

use crate::error::AuthError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionCacheStatus {
    BeingEvaluated,
    Satisfied,
    Unsatisfied,
}

/// Evaluation state per permission level, shared across one authorization
/// check so every permission is resolved at most once.
pub type PermissionCache = BTreeMap<PermissionLevel, PermissionCacheStatus>;

/// One entry of an authority, in the order entries are visited.
#[derive(Clone, Copy, Debug)]
enum MetaPermission<'a> {
    Key(&'a KeyWeight),
    Account(&'a PermissionLevelWeight),
    Wait(&'a WaitWeight),
}

impl MetaPermission<'_> {
    fn weight(&self) -> u16 {
        match self {
            MetaPermission::Key(k) => k.weight,
            MetaPermission::Account(a) => a.weight,
            MetaPermission::Wait(w) => w.weight,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            MetaPermission::Key(_) => 0,
            MetaPermission::Account(_) => 1,
            MetaPermission::Wait(_) => 2,
        }
    }
}

/// All entries of `authority`, by ascending weight; equal weights put keys
/// before accounts before waits and otherwise keep declaration order.
fn visit_order(authority: &Authority) -> Vec<MetaPermission<'_>> {
    let mut entries: Vec<MetaPermission<'_>> = authority
        .keys
        .iter()
        .map(MetaPermission::Key)
        .chain(authority.accounts.iter().map(MetaPermission::Account))
        .chain(authority.waits.iter().map(MetaPermission::Wait))
        .collect();
    entries.sort_by_key(|e| (e.weight(), e.kind_rank()));
    entries
}

/// Checks authorities against one set of provided keys, permissions and delay.
///
/// `permission_to_authority` resolves a permission level to its authority;
/// `Ok(None)` means the permission does not exist and simply contributes no
/// weight, while `Err` aborts the check.
pub struct AuthorityChecker<F> {
    permission_to_authority: F,
    recursion_depth_limit: u16,
    provided_keys: Vec<PublicKey>,
    provided_permissions: BTreeSet<PermissionLevel>,
    provided_delay_sec: u32,
    used_keys: Vec<bool>,
}

impl<F> AuthorityChecker<F>
where
    F: FnMut(&PermissionLevel) -> Result<Option<Authority>, AuthError>,
{
    pub fn new(
        permission_to_authority: F,
        recursion_depth_limit: u16,
        provided_keys: impl IntoIterator<Item = PublicKey>,
        provided_permissions: impl IntoIterator<Item = PermissionLevel>,
        provided_delay_sec: u32,
    ) -> Self {
        let provided_keys: Vec<PublicKey> = provided_keys
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let used_keys = vec![false; provided_keys.len()];
        AuthorityChecker {
            permission_to_authority,
            recursion_depth_limit,
            provided_keys,
            provided_permissions: provided_permissions.into_iter().collect(),
            provided_delay_sec,
            used_keys,
        }
    }

    /// A fresh cache with every provided permission already satisfied.
    pub fn new_cache(&self) -> PermissionCache {
        self.provided_permissions
            .iter()
            .map(|level| (*level, PermissionCacheStatus::Satisfied))
            .collect()
    }

    /// Whether the authority of `level` is satisfied.
    pub fn satisfied_level(&mut self, level: &PermissionLevel) -> Result<bool, AuthError> {
        let mut cache = self.new_cache();
        self.satisfied_level_cached(level, &mut cache)
    }

    /// [`satisfied_level`](Self::satisfied_level) sharing `cache` with other
    /// checks.
    pub fn satisfied_level_cached(
        &mut self,
        level: &PermissionLevel,
        cache: &mut PermissionCache,
    ) -> Result<bool, AuthError> {
        let entry = PermissionLevelWeight {
            permission: *level,
            weight: 1,
        };
        Ok(self.visit_permission(&entry, cache, 0)? > 0)
    }

    pub fn satisfied_authority(&mut self, authority: &Authority) -> Result<bool, AuthError> {
        let mut cache = self.new_cache();
        self.satisfied(authority, &mut cache, 0)
    }

    pub fn all_keys_used(&self) -> bool {
        self.used_keys.iter().all(|used| *used)
    }

    pub fn used_keys(&self) -> Vec<PublicKey> {
        self.partition_keys(true)
    }

    pub fn unused_keys(&self) -> Vec<PublicKey> {
        self.partition_keys(false)
    }

    fn partition_keys(&self, used: bool) -> Vec<PublicKey> {
        self.provided_keys
            .iter()
            .zip(&self.used_keys)
            .filter(|(_, u)| **u == used)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn satisfied(
        &mut self,
        authority: &Authority,
        cache: &mut PermissionCache,
        depth: u16,
    ) -> Result<bool, AuthError> {
        // keys touched by an unsatisfied authority are not really used
        let saved_used_keys = self.used_keys.clone();
        let threshold = u64::from(authority.threshold);
        let mut total_weight: u64 = 0;
        for entry in visit_order(authority) {
            let weight = match entry {
                MetaPermission::Key(k) => self.visit_key(k),
                MetaPermission::Account(a) => self.visit_permission(a, cache, depth)?,
                MetaPermission::Wait(w) => self.visit_wait(w),
            };
            total_weight += u64::from(weight);
            if total_weight >= threshold {
                return Ok(true);
            }
        }
        self.used_keys = saved_used_keys;
        Ok(false)
    }

    fn visit_key(&mut self, entry: &KeyWeight) -> u16 {
        match self.provided_keys.binary_search(&entry.key) {
            Ok(index) => {
                self.used_keys[index] = true;
                entry.weight
            }
            Err(_) => 0,
        }
    }

    fn visit_wait(&self, entry: &WaitWeight) -> u16 {
        if self.provided_delay_sec >= entry.wait_sec {
            entry.weight
        } else {
            0
        }
    }

    fn visit_permission(
        &mut self,
        entry: &PermissionLevelWeight,
        cache: &mut PermissionCache,
        depth: u16,
    ) -> Result<u16, AuthError> {
        let level = entry.permission;
        match status_in_cache(cache, &level) {
            Some(PermissionCacheStatus::Satisfied) => return Ok(entry.weight),
            Some(_) => return Ok(0),
            None => {}
        }
        if depth >= self.recursion_depth_limit {
            trace!(%level, depth, "authority depth limit reached");
            return Ok(0);
        }
        let Some(authority) = (self.permission_to_authority)(&level)? else {
            return Ok(0);
        };
        if authority.threshold == 0 {
            return Ok(0);
        }
        cache.insert(level, PermissionCacheStatus::BeingEvaluated);
        let satisfied = self.satisfied(&authority, cache, depth + 1)?;
        let status = if satisfied {
            PermissionCacheStatus::Satisfied
        } else {
            PermissionCacheStatus::Unsatisfied
        };
        cache.insert(level, status);
        Ok(if satisfied { entry.weight } else { 0 })
    }
}

/// Status of `level`, falling back to a wildcard entry `actor@` that stands
/// for every permission of the actor.
fn status_in_cache(
    cache: &PermissionCache,
    level: &PermissionLevel,
) -> Option<PermissionCacheStatus> {
    cache
        .get(level)
        .or_else(|| cache.get(&PermissionLevel::new(level.actor, Name::EMPTY)))
        .copied()
}
