//! Payloads of the native actions implemented by the system account.

use crate::authority::Authority;
use crate::name::Name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub creator: Name,
    pub name: Name,
    pub owner: Authority,
    pub active: Authority,
}

impl NewAccount {
    pub const ACTION: Name = Name::from_static("newaccount");
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateAuth {
    pub account: Name,
    pub permission: Name,
    /// Empty only when updating `owner`.
    pub parent: Name,
    pub auth: Authority,
}

impl UpdateAuth {
    pub const ACTION: Name = Name::from_static("updateauth");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeleteAuth {
    pub account: Name,
    pub permission: Name,
}

impl DeleteAuth {
    pub const ACTION: Name = Name::from_static("deleteauth");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkAuth {
    pub account: Name,
    pub code: Name,
    /// Empty links every action of `code`.
    pub message_type: Name,
    pub requirement: Name,
}

impl LinkAuth {
    pub const ACTION: Name = Name::from_static("linkauth");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlinkAuth {
    pub account: Name,
    pub code: Name,
    pub message_type: Name,
}

impl UnlinkAuth {
    pub const ACTION: Name = Name::from_static("unlinkauth");
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetCode {
    pub account: Name,
    pub vm_type: u8,
    pub vm_version: u8,
    pub code: Vec<u8>,
}

impl SetCode {
    pub const ACTION: Name = Name::from_static("setcode");
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetAbi {
    pub account: Name,
    pub abi: Vec<u8>,
}

impl SetAbi {
    pub const ACTION: Name = Name::from_static("setabi");
}

/// Actions of the system account that can never be linked to a custom permission.
pub const UNLINKABLE_ACTIONS: [Name; 4] = [
    UpdateAuth::ACTION,
    DeleteAuth::ACTION,
    LinkAuth::ACTION,
    UnlinkAuth::ACTION,
];
