//! Locality-biased wrapping search

/// Find the first index in `0..len` accepted by `matches`, scanning forward
/// from `hint` and wrapping around to the start.
///
/// When successive lookups land at or just after the previous hit this
/// returns after a couple of probes. A stale or out-of-range hint only costs
/// one full pass.
pub fn find_from_hint(
    len: usize,
    hint: usize,
    mut matches: impl FnMut(usize) -> bool,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let start = hint % len;
    (start..len).chain(0..start).find(|&index| matches(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(find_from_hint(0, 3, |_| true), None);
    }

    #[test]
    fn test_starts_at_hint() {
        let mut probes = Vec::new();
        let found = find_from_hint(10, 4, |i| {
            probes.push(i);
            i == 5
        });
        assert_eq!(found, Some(5));
        assert_eq!(probes, vec![4, 5]);
    }

    #[test]
    fn test_wraps() {
        let mut probes = Vec::new();
        let found = find_from_hint(5, 3, |i| {
            probes.push(i);
            i == 1
        });
        assert_eq!(found, Some(1));
        assert_eq!(probes, vec![3, 4, 0, 1]);
    }

    #[test]
    fn test_stale_hint() {
        assert_eq!(find_from_hint(4, 17, |i| i == 0), Some(0));
    }

    #[test]
    fn test_no_match_visits_all() {
        let mut count = 0;
        assert_eq!(
            find_from_hint(6, 2, |_| {
                count += 1;
                false
            }),
            None
        );
        assert_eq!(count, 6);
    }
}
