//! Luhn (mod 10) checksums for order numbers.

/// Returns true if `digits` is a non-empty string of ASCII digits whose Luhn checksum is valid.
///
/// Starting from the rightmost digit, every second digit is doubled (subtracting 9 when the result exceeds 9), and
/// the number is valid iff the sum of all digits is divisible by 10.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    luhn_sum(digits, false) % 10 == 0
}

/// Calculates the digit that must be appended to `digits` to make the result Luhn-valid. Returns `None` if `digits`
/// contains anything other than ASCII digits.
pub fn luhn_check_digit(digits: &str) -> Option<u8> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // The check digit will be the new rightmost digit, so the doubling starts on the current rightmost digit
    let sum = luhn_sum(digits, true);
    #[allow(clippy::cast_possible_truncation)]
    Some(((10 - sum % 10) % 10) as u8)
}

/// Appends the Luhn check digit to `digits`, e.g. `"7992739871"` becomes `"79927398713"`.
pub fn with_luhn_check_digit(digits: &str) -> Option<String> {
    luhn_check_digit(digits).map(|d| format!("{digits}{d}"))
}

fn luhn_sum(digits: &str, double_first: bool) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            let doubled = (i % 2 == 1) != double_first;
            match (doubled, d * 2) {
                (true, dd) if dd > 9 => dd - 9,
                (true, dd) => dd,
                (false, _) => d,
            }
        })
        .sum()
}
