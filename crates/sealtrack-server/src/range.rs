// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Range expansion for the assignment staging flow.
//
// This is a pure input-staging helper; the lifecycle engine only ever
// receives flat lists of individual seal numbers.  Expansion rule: both
// endpoints must share an identical non-numeric prefix and carry numeric
// suffixes of equal width; the suffix increments by one per step, start
// must not exceed end, and the expansion is capped to bound request size.

use sealtrack_core::SealtrackError;
use sealtrack_core::error::Result;

/// Expand `start..=end` into individual seal numbers.
pub fn expand_range(start: &str, end: &str, max: u32) -> Result<Vec<String>> {
    let (start_prefix, start_value, start_width) = split(start).ok_or_else(|| {
        SealtrackError::Validation(format!("range start {start:?} must end in digits"))
    })?;
    let (end_prefix, end_value, end_width) = split(end).ok_or_else(|| {
        SealtrackError::Validation(format!("range end {end:?} must end in digits"))
    })?;

    if start_prefix != end_prefix {
        return Err(SealtrackError::Validation(format!(
            "range endpoints have different prefixes: {start_prefix:?} vs {end_prefix:?}"
        )));
    }
    if start_width != end_width {
        return Err(SealtrackError::Validation(
            "range endpoints must have numeric suffixes of equal width".into(),
        ));
    }
    if start_value > end_value {
        return Err(SealtrackError::Validation(format!(
            "range start {start} is after end {end}"
        )));
    }

    let count = end_value - start_value + 1;
    if count > u64::from(max) {
        return Err(SealtrackError::Validation(format!(
            "range expands to {count} seals, more than the limit of {max}"
        )));
    }

    Ok((start_value..=end_value)
        .map(|value| format!("{start_prefix}{value:0start_width$}"))
        .collect())
}

/// Split a seal number into prefix, numeric suffix value, and suffix width.
fn split(number: &str) -> Option<(&str, u64, usize)> {
    let digits_start = number
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    let (prefix, digits) = number.split_at(digits_start);
    let value: u64 = digits.parse().ok()?;
    Some((prefix, value, digits.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_inclusive_range() {
        let numbers = expand_range("F0001", "F0003", 1000).unwrap();
        assert_eq!(numbers, vec!["F0001", "F0002", "F0003"]);
    }

    #[test]
    fn single_element_range() {
        let numbers = expand_range("SL-050", "SL-050", 1000).unwrap();
        assert_eq!(numbers, vec!["SL-050"]);
    }

    #[test]
    fn preserves_zero_padding() {
        let numbers = expand_range("F0009", "F0011", 1000).unwrap();
        assert_eq!(numbers, vec!["F0009", "F0010", "F0011"]);
    }

    #[test]
    fn rejects_mismatched_prefixes() {
        let err = expand_range("F0001", "G0003", 1000).unwrap_err();
        assert!(matches!(err, SealtrackError::Validation(_)));
    }

    #[test]
    fn rejects_mismatched_widths() {
        let err = expand_range("F001", "F0003", 1000).unwrap_err();
        assert!(matches!(err, SealtrackError::Validation(_)));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = expand_range("F0005", "F0001", 1000).unwrap_err();
        assert!(matches!(err, SealtrackError::Validation(_)));
    }

    #[test]
    fn rejects_oversized_range() {
        let err = expand_range("F0001", "F0500", 100).unwrap_err();
        assert!(matches!(err, SealtrackError::Validation(_)));
    }

    #[test]
    fn rejects_non_numeric_endpoints() {
        assert!(expand_range("FRONT", "F0003", 1000).is_err());
        assert!(expand_range("F0001", "END", 1000).is_err());
    }
}
