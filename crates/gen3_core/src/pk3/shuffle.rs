//! Sub-block permutation keyed by `pid % 24`.

use serde::{Deserialize, Serialize};

pub const BLOCK_SIZE: usize = 12;
pub const BLOCK_COUNT: usize = 4;
pub const DATA_SIZE: usize = BLOCK_SIZE * BLOCK_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubBlock {
    Growth = 0,
    Attacks = 1,
    Condition = 2,
    Misc = 3,
}

use SubBlock::{Attacks as A, Condition as E, Growth as G, Misc as M};

/// On-disk sub-block order for each shuffle index; entry `[i][pos]` names
/// the sub-block stored at position `pos`.
pub const ORDERS: [[SubBlock; BLOCK_COUNT]; 24] = [
    [G, A, E, M],
    [G, A, M, E],
    [G, E, A, M],
    [G, E, M, A],
    [G, M, A, E],
    [G, M, E, A],
    [A, G, E, M],
    [A, G, M, E],
    [A, E, G, M],
    [A, E, M, G],
    [A, M, G, E],
    [A, M, E, G],
    [E, G, A, M],
    [E, G, M, A],
    [E, A, G, M],
    [E, A, M, G],
    [E, M, G, A],
    [E, M, A, G],
    [M, G, A, E],
    [M, G, E, A],
    [M, A, G, E],
    [M, A, E, G],
    [M, E, G, A],
    [M, E, A, G],
];

pub fn shuffle_index(pid: u32) -> usize {
    (pid % 24) as usize
}

pub fn order_for(pid: u32) -> &'static [SubBlock; BLOCK_COUNT] {
    &ORDERS[shuffle_index(pid)]
}

/// On-disk order to canonical Growth/Attacks/Condition/Misc order.
pub fn unshuffle(data: &[u8; DATA_SIZE], pid: u32) -> [u8; DATA_SIZE] {
    let mut out = [0u8; DATA_SIZE];
    for (pos, &block) in order_for(pid).iter().enumerate() {
        let dst = block as usize * BLOCK_SIZE;
        let src = pos * BLOCK_SIZE;
        out[dst..dst + BLOCK_SIZE].copy_from_slice(&data[src..src + BLOCK_SIZE]);
    }
    out
}

/// Canonical order to on-disk order; inverse of [`unshuffle`].
pub fn shuffle(data: &[u8; DATA_SIZE], pid: u32) -> [u8; DATA_SIZE] {
    let mut out = [0u8; DATA_SIZE];
    for (pos, &block) in order_for(pid).iter().enumerate() {
        let src = block as usize * BLOCK_SIZE;
        let dst = pos * BLOCK_SIZE;
        out[dst..dst + BLOCK_SIZE].copy_from_slice(&data[src..src + BLOCK_SIZE]);
    }
    out
}
