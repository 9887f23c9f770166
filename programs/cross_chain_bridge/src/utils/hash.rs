use anchor_lang::solana_program::keccak;

/// Integrity hash stored alongside a failed inbound payload.
/// keccak256 over the raw bytes, matching the hash EVM peers compute.
pub fn payload_hash(payload: &[u8]) -> [u8; 32] {
    keccak::hash(payload).to_bytes()
}

/// Whether `payload` is byte-for-byte the payload that produced `stored`.
pub fn matches_stored_hash(stored: &[u8; 32], payload: &[u8]) -> bool {
    payload_hash(payload) == *stored
}
