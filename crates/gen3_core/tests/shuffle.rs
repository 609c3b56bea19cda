use gen3_core::pk3::shuffle::{
    BLOCK_SIZE, DATA_SIZE, ORDERS, SubBlock, order_for, shuffle, shuffle_index, unshuffle,
};
use quickcheck_macros::quickcheck;

/// Block `b` filled with the byte `b + 1`.
fn canonical() -> [u8; DATA_SIZE] {
    let mut data = [0u8; DATA_SIZE];
    for (i, byte) in data.iter_mut().enumerate() {
        *byte = (i / BLOCK_SIZE) as u8 + 1;
    }
    data
}

#[test]
fn every_shuffle_index_places_blocks_per_order_table() {
    let data = canonical();
    for pid in 0u32..24 {
        let on_disk = shuffle(&data, pid);
        for (pos, block) in ORDERS[pid as usize].iter().enumerate() {
            let chunk = &on_disk[pos * BLOCK_SIZE..(pos + 1) * BLOCK_SIZE];
            assert!(
                chunk.iter().all(|&b| b == *block as u8 + 1),
                "pid {pid} position {pos} should hold {block:?}"
            );
        }
        assert_eq!(unshuffle(&on_disk, pid), data, "pid {pid}");
    }
}

#[test]
fn index_is_pid_modulo_24() {
    assert_eq!(shuffle_index(0), 0);
    assert_eq!(shuffle_index(23), 23);
    assert_eq!(shuffle_index(24), 0);
    assert_eq!(shuffle_index(u32::MAX), (u32::MAX % 24) as usize);
    assert_eq!(order_for(29), &ORDERS[5]);
}

#[test]
fn known_orders() {
    use SubBlock::{Attacks as A, Condition as E, Growth as G, Misc as M};
    assert_eq!(ORDERS[0], [G, A, E, M]);
    assert_eq!(ORDERS[5], [G, M, E, A]);
    assert_eq!(ORDERS[6], [A, G, E, M]);
    assert_eq!(ORDERS[23], [M, E, A, G]);
}

#[quickcheck]
fn unshuffle_inverts_shuffle(pid: u32, seed: Vec<u8>) -> bool {
    let mut data = [0u8; DATA_SIZE];
    for (dst, src) in data.iter_mut().zip(seed.iter()) {
        *dst = *src;
    }
    unshuffle(&shuffle(&data, pid), pid) == data && shuffle(&unshuffle(&data, pid), pid) == data
}
