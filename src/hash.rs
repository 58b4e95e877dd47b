const DJB2_SEED: u64 = 5381;

/// DJB2 over the station name bytes: `h = h * 33 + b`, seeded at 5381.
///
/// Not collision free. The table keeps the name next to the key and
/// compares both on lookup.
#[inline(always)]
pub fn djb2(bytes: &[u8]) -> u64 {
    let mut hash = DJB2_SEED;
    for b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(*b as u64);
    }
    hash
}
