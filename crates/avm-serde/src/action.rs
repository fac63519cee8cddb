use crate::error::StateError;
use crate::io::{
    get_u32, get_u8, get_var_bytes, get_vec, len_to_u32, put_bytes, put_u32, put_u64,
    put_u8, put_var_bytes, put_vec, StateDecode, StateEncode,
};
use avm_types::{
    Action, ActionReceipt, Authority, DeleteAuth, LinkAuth, Name, NewAccount, PermissionLevel,
    SetAbi, SetCode, TimePointSec, Transaction, UnlinkAuth, UpdateAuth,
};

impl StateEncode for Action {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        self.name.encode_state(out);
        put_vec(out, &self.authorization);
        put_var_bytes(out, &self.data);
    }
}

impl StateDecode for Action {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(Action {
            account: Name::decode_state(input)?,
            name: Name::decode_state(input)?,
            authorization: get_vec::<PermissionLevel>(input)?,
            data: get_var_bytes(input)?,
        })
    }
}

impl StateEncode for Transaction {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.expiration.encode_state(out);
        put_u32(out, self.delay_sec);
        put_vec(out, &self.context_free_actions);
        put_vec(out, &self.actions);
    }
}

impl StateDecode for Transaction {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(Transaction {
            expiration: TimePointSec::decode_state(input)?,
            delay_sec: get_u32(input)?,
            context_free_actions: get_vec(input)?,
            actions: get_vec(input)?,
        })
    }
}

/// Receipts are only ever hashed, never decoded.
impl StateEncode for ActionReceipt {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.receiver.encode_state(out);
        put_bytes(out, &self.act_digest);
        put_u64(out, self.global_sequence);
        put_u64(out, self.recv_sequence);
        put_u32(out, len_to_u32(self.auth_sequence.len()));
        for (actor, seq) in &self.auth_sequence {
            actor.encode_state(out);
            put_u64(out, *seq);
        }
        put_u32(out, self.code_sequence);
        put_u32(out, self.abi_sequence);
    }
}

// ============================================================================
// Native action payloads
// ============================================================================

impl StateEncode for NewAccount {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.creator.encode_state(out);
        self.name.encode_state(out);
        self.owner.encode_state(out);
        self.active.encode_state(out);
    }
}

impl StateDecode for NewAccount {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(NewAccount {
            creator: Name::decode_state(input)?,
            name: Name::decode_state(input)?,
            owner: Authority::decode_state(input)?,
            active: Authority::decode_state(input)?,
        })
    }
}

impl StateEncode for UpdateAuth {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        self.permission.encode_state(out);
        self.parent.encode_state(out);
        self.auth.encode_state(out);
    }
}

impl StateDecode for UpdateAuth {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(UpdateAuth {
            account: Name::decode_state(input)?,
            permission: Name::decode_state(input)?,
            parent: Name::decode_state(input)?,
            auth: Authority::decode_state(input)?,
        })
    }
}

impl StateEncode for DeleteAuth {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        self.permission.encode_state(out);
    }
}

impl StateDecode for DeleteAuth {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(DeleteAuth {
            account: Name::decode_state(input)?,
            permission: Name::decode_state(input)?,
        })
    }
}

impl StateEncode for LinkAuth {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        self.code.encode_state(out);
        self.message_type.encode_state(out);
        self.requirement.encode_state(out);
    }
}

impl StateDecode for LinkAuth {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(LinkAuth {
            account: Name::decode_state(input)?,
            code: Name::decode_state(input)?,
            message_type: Name::decode_state(input)?,
            requirement: Name::decode_state(input)?,
        })
    }
}

impl StateEncode for UnlinkAuth {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        self.code.encode_state(out);
        self.message_type.encode_state(out);
    }
}

impl StateDecode for UnlinkAuth {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(UnlinkAuth {
            account: Name::decode_state(input)?,
            code: Name::decode_state(input)?,
            message_type: Name::decode_state(input)?,
        })
    }
}

impl StateEncode for SetCode {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        put_u8(out, self.vm_type);
        put_u8(out, self.vm_version);
        put_var_bytes(out, &self.code);
    }
}

impl StateDecode for SetCode {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(SetCode {
            account: Name::decode_state(input)?,
            vm_type: get_u8(input)?,
            vm_version: get_u8(input)?,
            code: get_var_bytes(input)?,
        })
    }
}

impl StateEncode for SetAbi {
    fn encode_state(&self, out: &mut Vec<u8>) {
        self.account.encode_state(out);
        put_var_bytes(out, &self.abi);
    }
}

impl StateDecode for SetAbi {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError> {
        Ok(SetAbi {
            account: Name::decode_state(input)?,
            abi: get_var_bytes(input)?,
        })
    }
}

