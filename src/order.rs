use core::cmp::Ordering;

/// Compare two encoded dictionary keys by the canonical CCF ordering rule.
///
/// Canonical ordering is:
/// 1) shorter encoded byte string sorts first, then
/// 2) lexicographic byte comparison.
///
/// The rule is defined over the full encoded form of each key, including
/// any inline-type wrapper a key in an abstract-typed position carries.
#[inline]
#[must_use]
pub fn cmp_encoded_keys(a: &[u8], b: &[u8]) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

/// Returns `true` iff `prev < curr` under canonical key ordering.
#[inline]
#[must_use]
pub fn is_strictly_increasing(prev: &[u8], curr: &[u8]) -> bool {
    cmp_encoded_keys(prev, curr) == Ordering::Less
}
