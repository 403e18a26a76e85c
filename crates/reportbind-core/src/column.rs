//! Column-address codec
//!
//! Spreadsheet columns are addressed with bijective base-26 letters: there is
//! no zero digit, so `1 = A`, `26 = Z`, `27 = AA`, `702 = ZZ`, `703 = AAA`.
//! Ordinals here are 1-based, matching the way chart formulas and table
//! ranges are written.

use crate::error::{Error, Result};

/// Largest ordinal accepted by [`to_ordinal`] (`"MWLQKWU"`, fits in `u32`).
const MAX_ORDINAL: u64 = u32::MAX as u64;

/// Convert a 1-based column ordinal to its letter address.
///
/// # Examples
/// ```
/// use reportbind_core::column::to_letters;
///
/// assert_eq!(to_letters(1).unwrap(), "A");
/// assert_eq!(to_letters(28).unwrap(), "AB");
/// assert!(to_letters(0).is_err());
/// ```
pub fn to_letters(ordinal: u32) -> Result<String> {
    if ordinal == 0 {
        return Err(Error::InvalidArgument(
            "column ordinal must be >= 1".into(),
        ));
    }

    Ok(letters_for_index(ordinal as usize - 1))
}

/// Convert a letter address back to its 1-based ordinal (case-insensitive).
pub fn to_ordinal(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidArgument("empty column letters".into()));
    }

    let mut ordinal: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidArgument(format!(
                "invalid column letter '{}' in '{}'",
                c, letters
            )));
        }
        ordinal = ordinal * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if ordinal > MAX_ORDINAL {
            return Err(Error::InvalidArgument(format!(
                "column '{}' is out of range",
                letters
            )));
        }
    }

    Ok(ordinal as u32)
}

/// Letter address for a zero-based column index.
///
/// Infallible counterpart of [`to_letters`] for loops over `0..fields.len()`.
pub fn letters_for_index(index: usize) -> String {
    let mut result = String::new();
    let mut n = index as u64 + 1;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_largest_ordinal() {
        assert_eq!(to_letters(u32::MAX).unwrap(), "MWLQKWU");
        assert_eq!(to_ordinal("MWLQKWU").unwrap(), u32::MAX);
        assert_eq!(letters_for_index(u32::MAX as usize - 1), "MWLQKWU");
    }

    #[test]
    fn test_to_letters() {
        assert_eq!(to_letters(1).unwrap(), "A");
        assert_eq!(to_letters(2).unwrap(), "B");
        assert_eq!(to_letters(26).unwrap(), "Z");
        assert_eq!(to_letters(27).unwrap(), "AA");
        assert_eq!(to_letters(52).unwrap(), "AZ");
        assert_eq!(to_letters(53).unwrap(), "BA");
        assert_eq!(to_letters(702).unwrap(), "ZZ");
        assert_eq!(to_letters(703).unwrap(), "AAA");
        assert_eq!(to_letters(16384).unwrap(), "XFD");
        assert_eq!(to_letters(18278).unwrap(), "ZZZ");
    }

    #[test]
    fn test_to_letters_rejects_zero() {
        assert!(matches!(to_letters(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_to_ordinal() {
        assert_eq!(to_ordinal("A").unwrap(), 1);
        assert_eq!(to_ordinal("Z").unwrap(), 26);
        assert_eq!(to_ordinal("AA").unwrap(), 27);
        assert_eq!(to_ordinal("ZZZ").unwrap(), 18278);

        // Case insensitive
        assert_eq!(to_ordinal("xfd").unwrap(), 16384);
    }

    #[test]
    fn test_to_ordinal_errors() {
        assert!(to_ordinal("").is_err());
        assert!(to_ordinal("A1").is_err());
        assert!(to_ordinal("$A").is_err());
        assert!(to_ordinal("ZZZZZZZZ").is_err()); // overflow
    }

    #[test]
    fn test_letters_for_index() {
        assert_eq!(letters_for_index(0), "A");
        assert_eq!(letters_for_index(25), "Z");
        assert_eq!(letters_for_index(26), "AA");
    }

    #[test]
    fn test_round_trip_up_to_three_letters() {
        for n in 1..=18278u32 {
            let letters = to_letters(n).unwrap();
            assert_eq!(to_ordinal(&letters).unwrap(), n, "ordinal {}", n);
        }
    }

    proptest! {
        #[test]
        fn prop_index_and_ordinal_agree(index in 0usize..100_000) {
            let via_ordinal = to_letters(index as u32 + 1).unwrap();
            prop_assert_eq!(letters_for_index(index), via_ordinal);
        }
    }
}
