//! Constant-time byte comparison used for signature checks.

/// Compares two byte slices without short-circuiting on the first mismatch.
///
/// The amount of work depends only on `max(a.len(), b.len())`. Missing bytes on the shorter side
/// are treated as zero and the length difference is folded into the result, so slices of
/// different length never compare equal.
///
/// ```
/// use cookie_session_storage::timing_safe_eq;
///
/// assert!(timing_safe_eq(b"abcd", b"abcd"));
/// assert!(!timing_safe_eq(b"abcd", b"abce"));
/// assert!(!timing_safe_eq(b"abcd", b"abc"));
/// ```
#[must_use]
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    accumulate(a, b).0 == 0
}

/// Returns the accumulated difference and the number of positions inspected.
#[inline(never)]
fn accumulate(a: &[u8], b: &[u8]) -> (usize, usize) {
    let mut acc = a.len() ^ b.len();
    let max_len = a.len().max(b.len());

    let mut inspected = 0;
    for i in 0..max_len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        acc |= usize::from(x ^ y);
        inspected += 1;
    }

    (std::hint::black_box(acc), inspected)
}
