//! Release identifier comparison.
//!
//! Identifiers are dotted numbers (`12.1`), optionally ranged (`≤37`), or the
//! literal `preview`, which sorts after every numbered release.
use std::cmp::Ordering;

pub const RANGE_PREFIX: char = '≤';
pub const PREVIEW: &str = "preview";

pub fn is_ranged(version: &str) -> bool {
    version.starts_with(RANGE_PREFIX)
}

pub fn strip_range(version: &str) -> &str {
    version.trim_start_matches(RANGE_PREFIX)
}

/// Compares two release identifiers, ignoring a range marker.
///
/// Missing trailing segments count as zero, so `12` equals `12.0`.
/// Non-numeric segments fall back to string comparison.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = strip_range(a);
    let b = strip_range(b);

    match (a == PREVIEW, b == PREVIEW) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => {
                let ordering = compare_segment(l.unwrap_or("0"), r.unwrap_or("0"));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Earliest of the given identifiers, skipping `preview`.
pub fn earliest<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .map(strip_range)
        .filter(|v| *v != PREVIEW)
        .min_by(|a, b| compare_versions(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(compare_versions("9", "10"), Ordering::Less);
        assert_eq!(compare_versions("12.1", "12"), Ordering::Greater);
        assert_eq!(compare_versions("12.0", "12"), Ordering::Equal);
        assert_eq!(compare_versions("≤37", "37"), Ordering::Equal);
    }

    #[test]
    fn test_preview_sorts_last() {
        assert_eq!(compare_versions("preview", "120"), Ordering::Greater);
        assert_eq!(compare_versions("1", "preview"), Ordering::Less);
    }

    #[test]
    fn test_earliest_skips_preview() {
        assert_eq!(earliest(["56", "≤40", "preview"]), Some("40"));
        assert_eq!(earliest(["preview"]), None);
        assert_eq!(earliest(Vec::<&str>::new()), None);
    }
}
