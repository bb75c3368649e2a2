//! Decimals with unit suffixes.
//!
//! With [`Relaxed::MULTIPLIER_SUFFIXES`](crate::Relaxed::MULTIPLIER_SUFFIXES)
//! enabled, numerals may carry a magnitude suffix (`32k`, `1.5Mb`) or spell a
//! duration (`10ms`, `1h30m`). The literal is kept verbatim; consumers pick
//! the interpretation they need with [`SuffixedDecimal::as_number`] or
//! [`SuffixedDecimal::as_duration`].
//!
//! ```rust
//! use kdl_relaxed::{Number, SuffixedDecimal};
//!
//! let size = SuffixedDecimal::parse(b"32k").unwrap();
//! assert_eq!(size.as_number().unwrap(), Number::Integer(32_000));
//!
//! let timeout = SuffixedDecimal::parse(b"1h30m").unwrap();
//! assert!(timeout.is_duration());
//! assert_eq!(timeout.as_duration().unwrap(), chrono::Duration::minutes(90));
//! ```

use crate::error::{Error, Result};
use crate::number::{parse_number, BigDecimal, Number};
use chrono::Duration;
use num_bigint::BigInt;
use std::fmt;

/// A numeral followed by a unit suffix.
///
/// Duration lexemes keep the whole literal in the suffix and leave the
/// number empty, since their digits and units interleave.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct SuffixedDecimal {
    number: String,
    suffix: String,
}

impl SuffixedDecimal {
    /// Splits a suffixed literal into its number and suffix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if the literal does not start with a digit
    /// (after an optional sign) or contains characters other than digits,
    /// `.`, `_` and unit letters.
    pub fn parse(literal: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(literal)
            .map_err(|_| Error::value("suffixed decimal is not valid UTF-8"))?;

        let mut duration = false;
        let mut suffix_at: Option<usize> = None;
        for (i, c) in text.char_indices() {
            match c {
                '0'..='9' | '.' | '_' => {}
                '+' | '-' if i == 0 => {}
                'h' | 's' | 'u' | 'µ' => {
                    suffix_at.get_or_insert(i);
                    duration = true;
                }
                'k' | 'K' | 'm' | 'M' | 'g' | 'G' | 't' | 'T' | 'b' => {
                    if suffix_at.is_some() && c != 'b' {
                        duration = true;
                    }
                    suffix_at.get_or_insert(i);
                }
                _ => {
                    return Err(Error::value(format!(
                        "unexpected character {c:?} in suffixed decimal {text:?}"
                    )));
                }
            }
        }

        let sign_len = usize::from(text.starts_with(|c: char| c == '+' || c == '-'));
        match suffix_at {
            Some(i) if i <= sign_len => Err(Error::value(format!(
                "suffixed decimal {text:?} starts with a unit"
            ))),
            _ if duration => Ok(SuffixedDecimal {
                number: String::new(),
                suffix: text.to_string(),
            }),
            Some(i) => Ok(SuffixedDecimal {
                number: text[..i].to_string(),
                suffix: text[i..].to_string(),
            }),
            None => Ok(SuffixedDecimal {
                number: text.to_string(),
                suffix: String::new(),
            }),
        }
    }

    /// The numeric part; empty for durations.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns `true` if the literal can only be read as a duration.
    #[must_use]
    pub fn is_duration(&self) -> bool {
        self.number.is_empty() && !self.suffix.is_empty()
    }

    /// Resolves a magnitude suffix.
    ///
    /// `k m g t` (either case) multiply by powers of 1000; the same letter
    /// followed by `b` multiplies by powers of 1024. Integral numerals stay
    /// integral, promoting to [`BigInt`] on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] for durations and unknown suffixes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_relaxed::{Number, SuffixedDecimal};
    ///
    /// let mb = SuffixedDecimal::parse(b"1.5mb").unwrap();
    /// assert_eq!(mb.as_number().unwrap(), Number::Float(1.5 * 1024.0 * 1024.0));
    /// assert!(SuffixedDecimal::parse(b"10ms").unwrap().as_number().is_err());
    /// ```
    pub fn as_number(&self) -> Result<Number> {
        if self.is_duration() {
            return Err(Error::value(format!("{self} is a duration")));
        }
        let n = parse_number(self.number.as_bytes(), 10)?;
        if self.suffix.is_empty() {
            return Ok(n);
        }

        let unknown = || Error::value(format!("unknown magnitude suffix {:?}", self.suffix));
        let mut letters = self.suffix.chars();
        let power = match letters.next().map(|c| c.to_ascii_lowercase()) {
            Some('k') => 1,
            Some('m') => 2,
            Some('g') => 3,
            Some('t') => 4,
            _ => return Err(unknown()),
        };
        let unit: i64 = match (letters.next(), letters.next()) {
            (None, _) => 1000,
            (Some('b'), None) => 1024,
            _ => return Err(unknown()),
        };
        Ok(scale(n, unit.pow(power)))
    }

    /// Resolves a duration such as `300ms`, `1.5h` or `-1h30m`.
    ///
    /// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`; each component
    /// may have a fraction, and the whole literal may carry a sign.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] for missing or unknown units and durations
    /// beyond the range of `i64` nanoseconds.
    pub fn as_duration(&self) -> Result<Duration> {
        parse_duration(&self.to_string())
    }
}

impl fmt::Display for SuffixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.suffix)
    }
}

fn scale(n: Number, factor: i64) -> Number {
    match n {
        Number::Integer(i) => i
            .checked_mul(factor)
            .map_or_else(|| Number::BigInt(BigInt::from(i) * factor), Number::Integer),
        Number::Float(f) => Number::Float(f * factor as f64),
        Number::BigInt(b) => Number::BigInt(b * factor),
        Number::BigDecimal(d) => {
            Number::BigDecimal(BigDecimal::new(d.mantissa() * factor, d.exponent()))
        }
    }
}

const NANOS_PER_UNIT: &[(&str, i128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 60 * 60 * 1_000_000_000),
];

fn parse_duration(literal: &str) -> Result<Duration> {
    let invalid = |why: &str| Error::value(format!("invalid duration {literal:?}: {why}"));
    let cleaned: String = literal.chars().filter(|&c| c != '_').collect();
    let (negative, mut rest) = match cleaned.as_bytes().first() {
        Some(b'-') => (true, &cleaned[1..]),
        Some(b'+') => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid("empty"));
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int, after) = rest.split_at(int_len);
        let (frac, after) = match after.strip_prefix('.') {
            Some(f) => f.split_at(f.find(|c: char| !c.is_ascii_digit()).unwrap_or(f.len())),
            None => ("", after),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let per_unit = match NANOS_PER_UNIT.iter().find(|(name, _)| *name == unit) {
            Some((_, nanos)) => *nanos,
            None if unit.is_empty() => return Err(invalid("missing unit")),
            None => return Err(invalid(&format!("unknown unit {unit:?}"))),
        };

        let whole: i128 = if int.is_empty() {
            0
        } else {
            int.parse().map_err(|_| invalid("out of range"))?
        };
        let mut component = whole
            .checked_mul(per_unit)
            .ok_or_else(|| invalid("out of range"))?;
        if !frac.is_empty() {
            let digits = &frac[..frac.len().min(18)];
            let numerator: i128 = digits.parse().map_err(|_| invalid("bad fraction"))?;
            let denominator = 10i128.pow(digits.len() as u32);
            component += numerator * per_unit / denominator;
        }
        total = total
            .checked_add(component)
            .ok_or_else(|| invalid("out of range"))?;
        rest = after;
    }

    if negative {
        total = -total;
    }
    let nanos = i64::try_from(total).map_err(|_| invalid("out of range"))?;
    Ok(Duration::nanoseconds(nanos))
}
