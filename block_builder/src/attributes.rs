use alloy::{
    primitives::{Address, B256},
    rpc::types::engine::PayloadAttributes,
};
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fresh build parameters with random randao, fee recipient and beacon root.
pub fn create_random_payload_attributes<R: RngCore>(
    rng: &mut R,
    timestamp: u64,
) -> PayloadAttributes {
    PayloadAttributes {
        timestamp,
        prev_randao: random_hash(rng),
        suggested_fee_recipient: random_address(rng),
        withdrawals: Some(vec![]),
        parent_beacon_block_root: Some(random_hash(rng)),
    }
}

pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn random_hash<R: RngCore>(rng: &mut R) -> B256 {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    B256::from(bytes)
}

fn random_address<R: RngCore>(rng: &mut R) -> Address {
    let mut bytes = [0u8; 20];
    rng.fill_bytes(&mut bytes);
    Address::from(bytes)
}
