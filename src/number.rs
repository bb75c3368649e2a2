//! Numeric literals.
//!
//! Integers parse to `i64` and fall back to [`BigInt`] when they overflow.
//! Decimals with a fraction or exponent parse to `f64` and fall back to a
//! [`BigDecimal`] whenever `f64` would lose the value entirely (overflow to
//! infinity, or underflow of a non-zero literal to zero).
//!
//! ```rust
//! use kdl_relaxed::number::{parse_number, Number};
//!
//! assert_eq!(parse_number(b"0xff", 16).unwrap(), Number::Integer(255));
//! assert_eq!(parse_number(b"1_000.5", 10).unwrap(), Number::Float(1000.5));
//! assert!(matches!(
//!     parse_number(b"18446744073709551616", 10).unwrap(),
//!     Number::BigInt(_)
//! ));
//! assert!(matches!(parse_number(b"1e-400", 10).unwrap(), Number::BigDecimal(_)));
//! ```

use crate::error::{Error, Result};
use num_bigint::{BigInt, Sign};
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::IntErrorKind;

/// A decimal number `mantissa × 10^exponent` of arbitrary precision.
///
/// Keeps every digit of the source literal, so `1.50e400` and `1.5e400`
/// compare unequal even though they denote the same quantity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    mantissa: BigInt,
    exponent: i64,
}

impl BigDecimal {
    #[must_use]
    pub const fn new(mantissa: BigInt, exponent: i64) -> Self {
        BigDecimal { mantissa, exponent }
    }

    #[must_use]
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    #[must_use]
    pub const fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Parses a base-10 literal such as `-12.5e-3` (no `_` separators).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if `s` is not a decimal literal.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::value(format!("invalid decimal {s:?}"));
        let (coefficient, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&s[..i], s[i + 1..].parse::<i64>().map_err(|_| invalid())?),
            None => (s, 0),
        };
        let (int, frac) = coefficient.split_once('.').unwrap_or((coefficient, ""));
        let digits = format!("{int}{frac}");
        let mantissa = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let scale = i64::try_from(frac.len()).map_err(|_| invalid())?;
        let exponent = exponent.checked_sub(scale).ok_or_else(invalid)?;
        Ok(BigDecimal { mantissa, exponent })
    }

    /// Returns the nearest `f64`, which may be infinite or zero.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let digits = self.mantissa.to_string();
        format!("{digits}e{}", self.exponent).parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for BigDecimal {
    /// Renders in `E` notation when the decimal exponent is outside ±9, in
    /// plain notation with a fractional part otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa.sign() == Sign::Minus {
            f.write_str("-")?;
        }
        let digits = self.mantissa.magnitude().to_string();
        let len = digits.len() as i64;
        let scientific = self.exponent + len - 1;

        if !(-9..=9).contains(&scientific) {
            let (lead, rest) = digits.split_at(1);
            f.write_str(lead)?;
            if !rest.is_empty() {
                write!(f, ".{rest}")?;
            }
            let sign = if scientific < 0 { '-' } else { '+' };
            return write!(f, "E{sign}{}", scientific.unsigned_abs());
        }

        if self.exponent >= 0 {
            write!(f, "{digits}{}.0", "0".repeat(self.exponent as usize))
        } else if -self.exponent < len {
            let (int, frac) = digits.split_at((len + self.exponent) as usize);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat((-self.exponent - len) as usize))
        }
    }
}

/// A numeric value.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::Number;
///
/// let n = Number::Integer(42);
/// assert!(n.is_integer());
/// assert_eq!(n.as_i64(), Some(42));
/// assert_eq!(Number::Float(0.5).as_f64(), 0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
}

impl Number {
    /// Returns `true` for integers of any size.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::BigInt(_))
    }

    /// Returns `true` for decimals of any size.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_) | Number::BigDecimal(_))
    }

    /// Returns the value as `i64` if it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::BigInt(b) => i64::try_from(b).ok(),
            Number::Float(_) | Number::BigDecimal(_) => None,
        }
    }

    /// Returns the nearest `f64`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
            Number::BigInt(b) => b.to_string().parse().unwrap_or(f64::NAN),
            Number::BigDecimal(d) => d.to_f64(),
        }
    }

    /// Appends the literal form of this number in `radix` (2, 8, 10 or 16).
    ///
    /// Non-decimal radixes apply to non-negative integers only and carry
    /// their `0x`, `0o` or `0b` prefix; everything else is written in decimal.
    pub fn append_to(&self, out: &mut String, radix: u32) {
        match self {
            Number::Integer(i) if radix != 10 && *i >= 0 => {
                out.push_str(radix_prefix(radix));
                out.push_str(&BigInt::from(*i).to_str_radix(radix));
            }
            Number::BigInt(b) if radix != 10 && b.sign() != Sign::Minus => {
                out.push_str(radix_prefix(radix));
                out.push_str(&b.to_str_radix(radix));
            }
            Number::Integer(i) => out.push_str(&i.to_string()),
            Number::BigInt(b) => out.push_str(&b.to_string()),
            Number::Float(f) => append_float(out, *f),
            Number::BigDecimal(d) => out.push_str(&d.to_string()),
        }
    }
}

fn radix_prefix(radix: u32) -> &'static str {
    match radix {
        2 => "0b",
        8 => "0o",
        _ => "0x",
    }
}

/// Floats more than nine orders of magnitude from 1 use `E` notation;
/// others are plain and always carry a fractional part.
fn append_float(out: &mut String, f: f64) {
    let magnitude = f.abs().log10();
    if magnitude.is_finite() && magnitude.abs() > 9.0 {
        out.push_str(&format!("{f:E}"));
        return;
    }
    let plain = f.to_string();
    let integral = f.is_finite() && !plain.contains('.');
    out.push_str(&plain);
    if integral {
        out.push_str(".0");
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.append_to(&mut out, 10);
        f.write_str(&out)
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Number::Integer(i) => serializer.serialize_i64(*i),
            Number::Float(f) => serializer.serialize_f64(*f),
            Number::BigInt(b) => serializer.serialize_str(&b.to_string()),
            Number::BigDecimal(d) => serializer.serialize_str(&d.to_string()),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$variant(value.into())
                }
            }
        )*
    };
}

number_from! {
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    f32 => Float,
    f64 => Float,
    BigInt => BigInt,
    BigDecimal => BigDecimal,
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Number::BigInt(value.into()), Number::Integer)
    }
}

/// Parses a numeric literal in `radix`.
///
/// The radix prefix (`0x`, `0o`, `0b`) and `_` separators are stripped.
/// Fractions and exponents are only valid in radix 10.
///
/// # Errors
///
/// Returns [`Error::Value`] when the literal is malformed.
pub fn parse_number(literal: &[u8], radix: u32) -> Result<Number> {
    let text = std::str::from_utf8(literal)
        .map_err(|_| Error::value("numeric literal is not valid UTF-8"))?;
    let invalid = || Error::value(format!("invalid number {text:?}"));

    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };
    let body = if radix == 10 {
        body
    } else {
        body.strip_prefix(radix_prefix(radix)).unwrap_or(body)
    };
    let digits: String = body.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return Err(invalid());
    }
    let signed = format!("{sign}{digits}");

    let exponent = radix == 10 && digits.contains(|c: char| c == 'e' || c == 'E');
    let float = digits.contains('.') || exponent;
    if float {
        if radix != 10 {
            return Err(Error::value(format!(
                "{text:?}: fractional numbers must be decimal"
            )));
        }
        let f: f64 = signed.parse().map_err(|_| invalid())?;
        if f.is_infinite() || (f == 0.0 && nonzero_coefficient(&digits)) {
            return BigDecimal::parse(&signed).map(Number::BigDecimal);
        }
        return Ok(Number::Float(f));
    }

    match i64::from_str_radix(&signed, radix) {
        Ok(i) => Ok(Number::Integer(i)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            BigInt::parse_bytes(signed.as_bytes(), radix)
                .map(Number::BigInt)
                .ok_or_else(invalid)
        }
        Err(_) => Err(invalid()),
    }
}

/// Returns `true` if the coefficient of a decimal literal (the part before
/// any exponent) has a non-zero digit.
fn nonzero_coefficient(digits: &str) -> bool {
    digits
        .split(|c: char| c == 'e' || c == 'E')
        .next()
        .map_or(false, |coefficient| coefficient.bytes().any(|b| matches!(b, b'1'..=b'9')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(n: &Number, radix: u32) -> String {
        let mut out = String::new();
        n.append_to(&mut out, radix);
        out
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_number(b"-1_000", 10).unwrap(), Number::Integer(-1000));
        assert_eq!(parse_number(b"+7", 10).unwrap(), Number::Integer(7));
        assert_eq!(parse_number(b"0o755", 8).unwrap(), Number::Integer(0o755));
        assert_eq!(parse_number(b"0b1010", 2).unwrap(), Number::Integer(10));
        assert_eq!(
            parse_number(b"0xdead_BEEF", 16).unwrap(),
            Number::Integer(0xdead_beef)
        );
    }

    #[test]
    fn test_integer_overflow_is_lossless() {
        let n = parse_number(b"-123456789012345678901234567890", 10).unwrap();
        assert_eq!(n.to_string(), "-123456789012345678901234567890");
        assert!(n.is_integer());
        assert_eq!(n.as_i64(), None);

        let hex = parse_number(b"0xffff_ffff_ffff_ffff_ff", 16).unwrap();
        assert_eq!(render(&hex, 16), "0xffffffffffffffffff");
    }

    #[test]
    fn test_parse_floats() {
        assert_eq!(parse_number(b"2.5e-3", 10).unwrap(), Number::Float(0.0025));
        assert_eq!(parse_number(b"1E3", 10).unwrap(), Number::Float(1000.0));
        assert_eq!(parse_number(b"0.0e10", 10).unwrap(), Number::Float(0.0));
        assert!(parse_number(b"0x1.5", 16).is_err());
        assert!(parse_number(b"1.2.3", 10).is_err());
        assert!(parse_number(b"_", 10).is_err());
    }

    #[test]
    fn test_float_edge_promotes_to_big_decimal() {
        let huge = parse_number(b"1.5e400", 10).unwrap();
        assert_eq!(huge, Number::BigDecimal(BigDecimal::new(15.into(), 399)));
        assert_eq!(huge.to_string(), "1.5E+400");

        let tiny = parse_number(b"-1e-400", 10).unwrap();
        assert_eq!(tiny.to_string(), "-1E-400");
        assert_eq!(tiny.as_f64(), 0.0);

        let plain = format!("0.{}1", "0".repeat(400));
        let tiny = parse_number(plain.as_bytes(), 10).unwrap();
        assert_eq!(tiny, Number::BigDecimal(BigDecimal::new(1.into(), -401)));
        assert_eq!(tiny.to_string(), "1E-401");

        let zero = format!("0.{}", "0".repeat(400));
        assert_eq!(parse_number(zero.as_bytes(), 10).unwrap(), Number::Float(0.0));
    }

    #[test]
    fn test_big_decimal_plain_rendering() {
        assert_eq!(BigDecimal::new(15.into(), -1).to_string(), "1.5");
        assert_eq!(BigDecimal::new(15.into(), 2).to_string(), "1500.0");
        assert_eq!(BigDecimal::new(5.into(), -3).to_string(), "0.005");
        assert_eq!(BigDecimal::parse("12.50").unwrap().to_string(), "12.50");
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(render(&Number::Float(1.0), 10), "1.0");
        assert_eq!(render(&Number::Float(-0.25), 10), "-0.25");
        assert_eq!(render(&Number::Float(1e9), 10), "1000000000.0");
        assert_eq!(render(&Number::Float(1e10), 10), "1E10");
        assert_eq!(render(&Number::Float(1.5e-12), 10), "1.5E-12");
        assert_eq!(render(&Number::Float(0.0), 10), "0.0");
        assert_eq!(render(&Number::Float(2.5), 16), "2.5");
    }

    #[test]
    fn test_radix_rendering() {
        assert_eq!(render(&Number::Integer(255), 16), "0xff");
        assert_eq!(render(&Number::Integer(5), 2), "0b101");
        assert_eq!(render(&Number::Integer(0), 8), "0o0");
    }

    #[test]
    fn test_negative_radix_falls_back_to_decimal() {
        assert_eq!(render(&Number::Integer(-8), 8), "-8");
        assert_eq!(render(&Number::Integer(-255), 16), "-255");
        assert_eq!(render(&Number::Integer(i64::MIN), 2), i64::MIN.to_string());
        let big = parse_number(b"-123456789012345678901234567890", 10).unwrap();
        assert_eq!(render(&big, 16), "-123456789012345678901234567890");
    }

    #[test]
    fn test_from_u64() {
        assert_eq!(Number::from(7u64), Number::Integer(7));
        assert!(matches!(Number::from(u64::MAX), Number::BigInt(_)));
    }
}
