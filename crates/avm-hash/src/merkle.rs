use crate::hash::sha3_256_tagged;
use avm_types::Hash32;

/// Binary merkle root over `leaves`.
///
/// An odd node at any level is paired with itself. The root of no leaves is
/// all zeroes and the root of one leaf is the leaf itself.
pub fn merkle_root(leaves: &[Hash32]) -> Hash32 {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Hash32> = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut body = [0u8; 64];
                body[..32].copy_from_slice(&pair[0]);
                body[32..].copy_from_slice(&pair[1]);
                sha3_256_tagged("AVM:MERKLE", &body)
            })
            .collect();
    }
    level[0]
}
