mod luhn;

pub use luhn::{luhn_check_digit, luhn_valid, with_luhn_check_digit};
