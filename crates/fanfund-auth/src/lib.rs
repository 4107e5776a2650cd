pub mod password;
pub mod token;

/// Compares two byte slices in constant time with respect to their contents.
/// The length check short-circuits, which is fine: lengths here are fixed by
/// the hash/signature format, not derived from secret data.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_slices_match() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn different_contents_do_not_match() {
        assert!(!constant_time_eq(b"secret", b"seCret"));
        assert!(!constant_time_eq(b"aaaa", b"aaab"));
    }

    #[test]
    fn different_lengths_do_not_match() {
        assert!(!constant_time_eq(b"secret", b"secre"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
