//! Text-to-value conversion for bound parameters.

/// Conversion from a raw request value (path segment, query value, header,
/// cookie or message field) into a parameter type.
///
/// Implement it for your own types to bind them directly:
///
/// ```ignore
/// struct Slug(String);
///
/// impl FromParam for Slug {
///     fn from_param(raw: &str) -> Result<Self, String> {
///         if raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
///             Ok(Slug(raw.to_owned()))
///         } else {
///             Err("not a slug".into())
///         }
///     }
/// }
/// ```
pub trait FromParam: Sized {
    fn from_param(raw: &str) -> Result<Self, String>;
}

macro_rules! from_str_param {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl FromParam for $ty {
                fn from_param(raw: &str) -> Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

from_str_param! {
    bool,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    num_bigint::BigInt,
    bigdecimal::BigDecimal,
}

impl FromParam for String {
    fn from_param(raw: &str) -> Result<Self, String> {
        Ok(raw.to_owned())
    }
}

impl FromParam for char {
    fn from_param(raw: &str) -> Result<Self, String> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("expected a single character, got {} characters", raw.chars().count())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Utc};

    #[test]
    fn numbers_trim_whitespace() {
        assert_eq!(i32::from_param(" 42 "), Ok(42));
        assert_eq!(f64::from_param("2.5"), Ok(2.5));
        assert!(u8::from_param("300").is_err());
    }

    #[test]
    fn strings_are_kept_verbatim() {
        assert_eq!(String::from_param(" a b "), Ok(" a b ".to_string()));
    }

    #[test]
    fn char_requires_exactly_one() {
        assert_eq!(char::from_param("x"), Ok('x'));
        assert!(char::from_param("").is_err());
        assert!(char::from_param("xy").is_err());
    }

    #[test]
    fn dates_use_iso_formats() {
        assert_eq!(chrono::NaiveDate::from_param("2024-02-29").unwrap().day(), 29);
        assert!(chrono::NaiveDateTime::from_param("2024-02-29T10:30:00").is_ok());
        assert_eq!(
            chrono::DateTime::<Utc>::from_param("2024-02-29T10:30:00Z").unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn big_numbers() {
        let big = num_bigint::BigInt::from_param("123456789012345678901234567890").unwrap();
        assert_eq!(big.to_string(), "123456789012345678901234567890");
        let dec = bigdecimal::BigDecimal::from_param("3.14159265358979323846").unwrap();
        assert_eq!(dec.to_string(), "3.14159265358979323846");
    }

    #[test]
    fn booleans_are_strict() {
        assert_eq!(bool::from_param("true"), Ok(true));
        assert!(bool::from_param("yes").is_err());
    }
}
