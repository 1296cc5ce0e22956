/// Prefix shared by every customer card number.
pub const CARD_NUMBER_PREFIX: &str = "GC";

const CARD_DIGITS: usize = 6;

/// Derive the `GC-XXXXXX-C` card number for a customer id.
///
/// Non-digit characters are dropped, the remainder is left-padded with zeros
/// and only the right-most six digits are kept. The check digit is the
/// digit sum of those six digits modulo 10. Distinct ids can collide; the
/// unique index on `card_number` is what guarantees uniqueness.
pub fn generate_consistent_card_number(customer_id: &str) -> String {
    let digits: String = customer_id.chars().filter(char::is_ascii_digit).collect();

    let body = if digits.len() > CARD_DIGITS {
        digits[digits.len() - CARD_DIGITS..].to_string()
    } else {
        format!("{:0>width$}", digits, width = CARD_DIGITS)
    };

    format!("{}-{}-{}", CARD_NUMBER_PREFIX, body, checksum(&body))
}

pub fn card_number_for(user_id: u64) -> String {
    generate_consistent_card_number(&user_id.to_string())
}

/// Check the shape and check digit of a card number.
pub fn is_valid_card_number(card_number: &str) -> bool {
    let mut parts = card_number.split('-');
    let (Some(prefix), Some(body), Some(check), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == CARD_NUMBER_PREFIX
        && body.len() == CARD_DIGITS
        && body.chars().all(|c| c.is_ascii_digit())
        && check.len() == 1
        && check.chars().next().and_then(|c| c.to_digit(10)) == Some(checksum(body))
}

fn checksum(body: &str) -> u32 {
    body.chars().filter_map(|c| c.to_digit(10)).sum::<u32>() % 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_yields_same_card_number() {
        let first = card_number_for(4);
        let second = card_number_for(4);
        assert_eq!(first, second);
        assert_eq!(first, "GC-000004-4");
    }

    #[test]
    fn checksum_is_digit_sum_mod_ten() {
        // 1+2+3+4+5 = 15
        assert_eq!(generate_consistent_card_number("12345"), "GC-012345-5");
        // 9*6 = 54
        assert_eq!(generate_consistent_card_number("999999"), "GC-999999-4");
    }

    #[test]
    fn non_digits_are_stripped() {
        assert_eq!(
            generate_consistent_card_number("cust-12-34"),
            generate_consistent_card_number("1234")
        );
    }

    #[test]
    fn long_ids_keep_rightmost_six_digits() {
        assert_eq!(generate_consistent_card_number("1234567890"), "GC-567890-5");
    }

    #[test]
    fn empty_id_still_produces_a_card_number() {
        assert_eq!(generate_consistent_card_number(""), "GC-000000-0");
        assert_eq!(generate_consistent_card_number("abc"), "GC-000000-0");
    }

    #[test]
    fn generated_numbers_validate() {
        for id in [0_u64, 1, 42, 4711, 999_999, 1_000_001] {
            let number = card_number_for(id);
            assert!(is_valid_card_number(&number), "{} should be valid", number);
        }
    }

    #[test]
    fn rejects_malformed_card_numbers() {
        assert!(!is_valid_card_number("GC-000004-5"));
        assert!(!is_valid_card_number("XX-000004-4"));
        assert!(!is_valid_card_number("GC-00004-4"));
        assert!(!is_valid_card_number("GC-000004-4-1"));
        assert!(!is_valid_card_number("GC-00000a-4"));
        assert!(!is_valid_card_number(""));
    }
}
