use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("static regex"));

/// Five-character zip code: missing → `00000`, short → left-padded with `0`,
/// long → first five characters.
pub fn clean_zipcode(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or("");
    let padded = format!("{:0>5}", raw);
    padded.chars().take(5).collect()
}

/// A home phone number after cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumber {
    /// Ten digits, no punctuation.
    Valid(String),
    Invalid,
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneNumber::Valid(digits) => f.write_str(digits),
            PhoneNumber::Invalid => f.write_str("Invalid phone number"),
        }
    }
}

/// Strip everything but digits. Ten digits are kept; eleven are kept only
/// when the first is a `1` country code, which is dropped.
pub fn clean_phone_number(raw: Option<&str>) -> PhoneNumber {
    let digits = NON_DIGIT.replace_all(raw.unwrap_or(""), "");
    match digits.len() {
        10 => PhoneNumber::Valid(digits.into_owned()),
        11 if digits.starts_with('1') => PhoneNumber::Valid(digits[1..].to_string()),
        _ => PhoneNumber::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_zipcode() {
        assert_eq!(clean_zipcode(Some("20010")), "20010");
        assert_eq!(clean_zipcode(Some("2010")), "02010");
        assert_eq!(clean_zipcode(Some("7")), "00007");
        assert_eq!(clean_zipcode(Some("123456789")), "12345");
        assert_eq!(clean_zipcode(Some("")), "00000");
        assert_eq!(clean_zipcode(None), "00000");
    }

    #[test]
    fn test_clean_phone_number() {
        assert_eq!(
            clean_phone_number(Some("(941)979-2000")),
            PhoneNumber::Valid("9419792000".into())
        );
        assert_eq!(
            clean_phone_number(Some("1.530.919.3000")),
            PhoneNumber::Valid("5309193000".into())
        );
        assert_eq!(clean_phone_number(Some("9.82E+00")), PhoneNumber::Invalid);
        assert_eq!(clean_phone_number(Some("21530919300")), PhoneNumber::Invalid);
        assert_eq!(clean_phone_number(Some("530919300")), PhoneNumber::Invalid);
        assert_eq!(clean_phone_number(None), PhoneNumber::Invalid);
    }

    #[test]
    fn test_phone_display() {
        assert_eq!(PhoneNumber::Valid("6154385000".into()).to_string(), "6154385000");
        assert_eq!(PhoneNumber::Invalid.to_string(), "Invalid phone number");
    }
}
