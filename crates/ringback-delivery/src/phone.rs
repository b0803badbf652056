// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization.

/// Shortest plausible subscriber number.
const MIN_DIGITS: usize = 7;
/// E.164 maximum length.
const MAX_DIGITS: usize = 15;

/// Normalize a caller-id string to bare digits.
///
/// Strips formatting characters (spaces, dashes, parentheses, a leading `+`)
/// and returns the digit string, or `None` if the result is not a plausible
/// phone number. A `None` here is a permanent condition: the record can
/// never be delivered.
pub fn normalize(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting() {
        assert_eq!(normalize("+1 (555) 123-4567"), Some("15551234567".to_string()));
        assert_eq!(normalize("555.123.4567"), Some("5551234567".to_string()));
        assert_eq!(normalize("5551234567"), Some("5551234567".to_string()));
    }

    #[test]
    fn rejects_too_short() {
        assert_eq!(normalize("123456"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("ext. 42"), None);
    }

    #[test]
    fn rejects_too_long() {
        assert_eq!(normalize("1234567890123456"), None);
    }

    #[test]
    fn boundary_lengths_accepted() {
        assert_eq!(normalize("1234567"), Some("1234567".to_string()));
        assert_eq!(
            normalize("123456789012345"),
            Some("123456789012345".to_string())
        );
    }
}
