use blake3::Hasher;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for vector-index point ids and stub-embedding seeds. With 64 bits the
/// birthday bound sits around 4 billion items, far above any job-taxonomy corpus,
/// and a collision would surface as an upsert overwriting a corpus entry rather
/// than as a wrong price.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Hashes an ordered list of fields with a separator so `["ab", "c"]` and `["a", "bc"]` differ.
#[inline]
pub fn hash_fields(fields: &[&str]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    for field in fields {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
        hasher.update(b"|");
    }
    *hasher.finalize().as_bytes()
}

/// Stable point id for a reference job code.
#[inline]
pub fn reference_point_id(code: &str) -> u64 {
    hash_to_u64(code.as_bytes())
}

/// Hex-encoded BLAKE3 digest of arbitrary bytes (audit fingerprints).
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
