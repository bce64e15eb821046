// src/util.rs — Shared utility functions

/// Draw a uniformly distributed value in `[lo, hi]` (inclusive).
///
/// Uses the `getrandom` crate for OS-provided randomness. Falls back to the
/// midpoint of the range if the OS RNG is unavailable, so a sleep duration is
/// always produced.
pub fn random_in_range(lo: u64, hi: u64) -> u64 {
    if hi <= lo {
        return lo;
    }
    let span = hi - lo + 1;
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => lo + u64::from_le_bytes(buf) % span,
        Err(_) => lo + span / 2,
    }
}
