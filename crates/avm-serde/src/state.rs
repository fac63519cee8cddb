use crate::error::StateError;
use crate::io::{
    get_array, get_bool, get_i64, get_u128, get_u16, get_u32, get_u64, get_u8, get_var_bytes,
    get_vec, put_bool, put_bytes, put_i64, put_u128, put_u16, put_u32, put_u64, put_u8,
    put_var_bytes, put_vec, StateDecode, StateEncode,
};
use avm_types::{
    AccountObject, Authority, Float128, GlobalPropertyObject, KeyValueObject, KeyWeight, Name,
    PermissionLevel, PermissionLevelWeight, PermissionLinkObject, PermissionObject, PublicKey,
    ResourceLimitsObject, ResourceUsageObject, SecondaryObject, TableObject, TimePointSec,
    WaitWeight, U256,
};

// ============================================================================
// Scalars
// ============================================================================

impl StateEncode for u64 {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, *self);
    }
}

impl StateDecode for u64 {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        get_u64(input)
    }
}

impl StateEncode for u128 {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u128(out, *self);
    }
}

impl StateDecode for u128 {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        get_u128(input)
    }
}

impl StateEncode for f64 {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.to_bits());
    }
}

impl StateDecode for f64 {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(f64::from_bits(get_u64(input)?))
    }
}

impl StateEncode for U256 {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_bytes(out, &self.0);
    }
}

impl StateDecode for U256 {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(U256(get_array::<32>(input)?))
    }
}

impl StateEncode for Float128 {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u128(out, self.to_bits());
    }
}

impl StateDecode for Float128 {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(Float128::from_bits(get_u128(input)?))
    }
}

impl StateEncode for Name {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.as_u64());
    }
}

impl StateDecode for Name {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(Name::new(get_u64(input)?))
    }
}

impl StateEncode for TimePointSec {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u32(out, self.secs());
    }
}

impl StateDecode for TimePointSec {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(TimePointSec::new(get_u32(input)?))
    }
}

// ============================================================================
// Authority
// ============================================================================

impl StateEncode for PublicKey {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u8(out, self.suite_id);
        put_var_bytes(out, &self.bytes);
    }
}

impl StateDecode for PublicKey {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        let suite_id = get_u8(input)?;
        let bytes = get_var_bytes(input)?;
        Ok(PublicKey { suite_id, bytes })
    }
}

impl StateEncode for PermissionLevel {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.actor.encode_state(out);
        self.permission.encode_state(out);
    }
}

impl StateDecode for PermissionLevel {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        let actor = Name::decode_state(input)?;
        let permission = Name::decode_state(input)?;
        Ok(PermissionLevel { actor, permission })
    }
}

impl StateEncode for KeyWeight {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.key.encode_state(out);
        put_u16(out, self.weight);
    }
}

impl StateDecode for KeyWeight {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        let key = PublicKey::decode_state(input)?;
        let weight = get_u16(input)?;
        Ok(KeyWeight { key, weight })
    }
}

impl StateEncode for PermissionLevelWeight {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.permission.encode_state(out);
        put_u16(out, self.weight);
    }
}

impl StateDecode for PermissionLevelWeight {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        let permission = PermissionLevel::decode_state(input)?;
        let weight = get_u16(input)?;
        Ok(PermissionLevelWeight { permission, weight })
    }
}

impl StateEncode for WaitWeight {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u32(out, self.wait_sec);
        put_u16(out, self.weight);
    }
}

impl StateDecode for WaitWeight {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        let wait_sec = get_u32(input)?;
        let weight = get_u16(input)?;
        Ok(WaitWeight { wait_sec, weight })
    }
}

impl StateEncode for Authority {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u32(out, self.threshold);
        put_vec(out, &self.keys);
        put_vec(out, &self.accounts);
        put_vec(out, &self.waits);
    }
}

impl StateDecode for Authority {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        let threshold = get_u32(input)?;
        let keys = get_vec(input)?;
        let accounts = get_vec(input)?;
        let waits = get_vec(input)?;
        Ok(Authority {
            threshold,
            keys,
            accounts,
            waits,
        })
    }
}

// ============================================================================
// Table objects
// ============================================================================

impl StateEncode for TableObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        self.code.encode_state(out);
        self.scope.encode_state(out);
        self.table.encode_state(out);
        self.payer.encode_state(out);
        put_u32(out, self.count);
    }
}

impl StateDecode for TableObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(TableObject {
            id: get_u64(input)?,
            code: Name::decode_state(input)?,
            scope: Name::decode_state(input)?,
            table: Name::decode_state(input)?,
            payer: Name::decode_state(input)?,
            count: get_u32(input)?,
        })
    }
}

impl StateEncode for KeyValueObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        put_u64(out, self.t_id);
        put_u64(out, self.primary_key);
        self.payer.encode_state(out);
        put_var_bytes(out, &self.value);
    }
}

impl StateDecode for KeyValueObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(KeyValueObject {
            id: get_u64(input)?,
            t_id: get_u64(input)?,
            primary_key: get_u64(input)?,
            payer: Name::decode_state(input)?,
            value: get_var_bytes(input)?,
        })
    }
}

impl<K: StateEncode> StateEncode for SecondaryObject<K> {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        put_u64(out, self.t_id);
        put_u64(out, self.primary_key);
        self.payer.encode_state(out);
        self.secondary_key.encode_state(out);
    }
}

impl<K: StateDecode> StateDecode for SecondaryObject<K> {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(SecondaryObject {
            id: get_u64(input)?,
            t_id: get_u64(input)?,
            primary_key: get_u64(input)?,
            payer: Name::decode_state(input)?,
            secondary_key: K::decode_state(input)?,
        })
    }
}

// ============================================================================
// Accounts & permissions
// ============================================================================

impl StateEncode for AccountObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        self.name.encode_state(out);
        self.creation_date.encode_state(out);
        put_bool(out, self.privileged);
        put_u64(out, self.recv_sequence);
        put_u64(out, self.auth_sequence);
        put_u32(out, self.code_sequence);
        put_u32(out, self.abi_sequence);
        put_bytes(out, &self.code_hash);
        put_var_bytes(out, &self.abi);
    }
}

impl StateDecode for AccountObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(AccountObject {
            id: get_u64(input)?,
            name: Name::decode_state(input)?,
            creation_date: TimePointSec::decode_state(input)?,
            privileged: get_bool(input)?,
            recv_sequence: get_u64(input)?,
            auth_sequence: get_u64(input)?,
            code_sequence: get_u32(input)?,
            abi_sequence: get_u32(input)?,
            code_hash: get_array::<32>(input)?,
            abi: get_var_bytes(input)?,
        })
    }
}

impl StateEncode for PermissionObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        put_u64(out, self.parent);
        self.owner.encode_state(out);
        self.name.encode_state(out);
        self.last_updated.encode_state(out);
        self.auth.encode_state(out);
    }
}

impl StateDecode for PermissionObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(PermissionObject {
            id: get_u64(input)?,
            parent: get_u64(input)?,
            owner: Name::decode_state(input)?,
            name: Name::decode_state(input)?,
            last_updated: TimePointSec::decode_state(input)?,
            auth: Authority::decode_state(input)?,
        })
    }
}

impl StateEncode for PermissionLinkObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        self.account.encode_state(out);
        self.code.encode_state(out);
        self.message_type.encode_state(out);
        self.required_permission.encode_state(out);
    }
}

impl StateDecode for PermissionLinkObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(PermissionLinkObject {
            id: get_u64(input)?,
            account: Name::decode_state(input)?,
            code: Name::decode_state(input)?,
            message_type: Name::decode_state(input)?,
            required_permission: Name::decode_state(input)?,
        })
    }
}

// ============================================================================
// Resources & globals
// ============================================================================

impl StateEncode for ResourceLimitsObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        self.owner.encode_state(out);
        put_i64(out, self.ram_bytes);
        put_i64(out, self.net_weight);
        put_i64(out, self.cpu_weight);
    }
}

impl StateDecode for ResourceLimitsObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(ResourceLimitsObject {
            id: get_u64(input)?,
            owner: Name::decode_state(input)?,
            ram_bytes: get_i64(input)?,
            net_weight: get_i64(input)?,
            cpu_weight: get_i64(input)?,
        })
    }
}

impl StateEncode for ResourceUsageObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        self.owner.encode_state(out);
        put_u64(out, self.ram_usage);
        put_u64(out, self.net_usage);
        put_u64(out, self.cpu_usage);
    }
}

impl StateDecode for ResourceUsageObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(ResourceUsageObject {
            id: get_u64(input)?,
            owner: Name::decode_state(input)?,
            ram_usage: get_u64(input)?,
            net_usage: get_u64(input)?,
            cpu_usage: get_u64(input)?,
        })
    }
}

impl StateEncode for GlobalPropertyObject {
    fn encode_state(&self, out: &mut Vec<u8>) {
        put_u64(out, self.id);
        put_u64(out, self.global_action_sequence);
    }
}

impl StateDecode for GlobalPropertyObject {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(GlobalPropertyObject {
            id: get_u64(input)?,
            global_action_sequence: get_u64(input)?,
        })
    }
}
