//! Order-number checksum validation.
//!
//! Order numbers are digit strings validated with the Luhn formula. The
//! check is total: any non-digit character (or the empty string) rejects,
//! it never panics.

/// Returns `true` iff `number` is a non-empty digit string with a valid
/// Luhn checksum.
///
/// Digits are processed right to left; every second digit (starting from
/// the second-from-rightmost) is doubled, subtracting 9 when the doubled
/// value exceeds 9. The number is valid when the sum is divisible by 10.
#[must_use]
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }

    let mut sum: u32 = 0;
    let mut double = false;

    for ch in number.chars().rev() {
        let Some(mut digit) = ch.to_digit(10) else {
            return false;
        };
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    sum % 10 == 0
}

/// Computes the Luhn check digit for a digit string, or `None` if the
/// input contains a non-digit.
#[must_use]
pub fn check_digit(payload: &str) -> Option<u32> {
    let mut sum: u32 = 0;
    let mut double = true;

    for ch in payload.chars().rev() {
        let mut digit = ch.to_digit(10)?;
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    Some((10 - sum % 10) % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_valid_numbers() {
        assert!(is_valid("79927398713"));
        assert!(is_valid("4561261212345467"));
        assert!(is_valid("0"));
    }

    #[test]
    fn test_known_invalid_numbers() {
        assert!(!is_valid("79927398710"));
        assert!(!is_valid("79927398711"));
        assert!(!is_valid("1"));
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(!is_valid("abc"));
        assert!(!is_valid("7992739871a"));
        assert!(!is_valid("79927 398713"));
        assert!(!is_valid("-79927398713"));
        assert!(!is_valid("七九九二"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!is_valid(""));
    }

    #[test]
    fn test_single_digit() {
        // A lone zero sums to 0, which is divisible by 10.
        assert!(is_valid("0"));
        assert!(!is_valid("5"));
    }

    proptest! {
        /// Appending the correct check digit to any digit string yields a
        /// valid number.
        #[test]
        fn prop_check_digit_produces_valid_number(payload in "[0-9]{1,18}") {
            let d = check_digit(&payload).unwrap();
            let full = format!("{payload}{d}");
            prop_assert!(is_valid(&full));
        }

        /// Replacing the check digit with any other digit invalidates the
        /// number.
        #[test]
        fn prop_wrong_check_digit_invalid(payload in "[0-9]{1,18}", bump in 1u32..10) {
            let d = check_digit(&payload).unwrap();
            let wrong = (d + bump) % 10;
            let full = format!("{payload}{wrong}");
            prop_assert!(!is_valid(&full));
        }

        /// The validator never panics on arbitrary input.
        #[test]
        fn prop_total_over_any_input(s in ".*") {
            let _ = is_valid(&s);
        }
    }
}
