//! Scalar values of arguments, properties and node names.
//!
//! A [`Value`] pairs a [`ValueKind`] with an optional type annotation and a
//! [`ValueFlag`] recording the lexical form the value was read in, so that a
//! parsed document can be written back the way it was written.
//!
//! ## Rendering
//!
//! ```rust
//! use kdl_relaxed::{Format, Number, Value, ValueFlag, ValueKind};
//!
//! let hex = Value::new(ValueKind::Number(Number::Integer(255)))
//!     .with_flag(ValueFlag::Hexadecimal);
//! assert_eq!(hex.to_string(), "0xff");
//! assert_eq!(hex.render(Format::Unformatted), "255");
//!
//! let word = Value::from("word");
//! assert_eq!(word.render(Format::Strict), "word");
//! assert_eq!(word.render(Format::Formatted), "\"word\"");
//!
//! let typed = Value::from(8u8).with_type_annotation("u8");
//! assert_eq!(typed.to_string(), "(u8)8");
//! ```
//!
//! ## Extracting Values
//!
//! ```rust
//! use kdl_relaxed::Value;
//!
//! let value = Value::from(42);
//! assert!(value.is_number());
//! assert_eq!(value.as_i64(), Some(42));
//! assert_eq!(value.as_str(), None);
//! ```

use crate::error::{Error, Result};
use crate::number::{parse_number, Number};
use crate::quote;
use crate::scanner::is_bare_identifier;
use crate::suffixed::SuffixedDecimal;
use crate::token::{Token, TokenKind};
use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::fmt;

/// The lexical form a value was read in.
///
/// The flag is advisory: a value renders in its recorded form only where the
/// requested [`Format`] allows it and the form can represent the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ValueFlag {
    #[default]
    None,
    Raw,
    Quoted,
    Binary,
    Octal,
    Hexadecimal,
    BareSuffixed,
}

impl ValueFlag {
    /// Returns the radix recorded by a numeric flag, 10 otherwise.
    #[must_use]
    pub const fn radix(self) -> u32 {
        match self {
            ValueFlag::Binary => 2,
            ValueFlag::Octal => 8,
            ValueFlag::Hexadecimal => 16,
            _ => 10,
        }
    }
}

/// How a value is written out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Format {
    /// The recorded form: raw, quoted or bare strings, and the recorded
    /// radix.
    #[default]
    Strict,
    /// Strings always quoted (raw strings included); radix preserved.
    Formatted,
    /// Strings always quoted; numbers in decimal.
    Unformatted,
    /// Strings bare where possible; everything else quoted, numbers in decimal.
    NodeName,
}

/// The payload of a [`Value`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ValueKind {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Suffixed(SuffixedDecimal),
}

/// A scalar with its type annotation and lexical form.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{Value, ValueKind};
///
/// let null = Value::default();
/// assert!(null.is_null());
/// assert_eq!(null.to_string(), "null");
///
/// let text = Value::new(ValueKind::String("two words".into()));
/// assert_eq!(text.to_string(), "\"two words\"");
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Value {
    kind: ValueKind,
    type_annotation: Option<String>,
    flag: ValueFlag,
}

impl Value {
    #[must_use]
    pub const fn new(kind: ValueKind) -> Self {
        Value {
            kind,
            type_annotation: None,
            flag: ValueFlag::None,
        }
    }

    /// Materializes the literal of a value token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`], located at the token, if the literal cannot
    /// be decoded or `token` is not a value token.
    pub fn from_token(token: &Token<'_>) -> Result<Self> {
        Self::decode(token).map_err(|e| e.at(token.position()))
    }

    fn decode(token: &Token<'_>) -> Result<Self> {
        let (kind, flag) = match token.kind {
            TokenKind::QuotedString => (
                ValueKind::String(quote::unquote(&token.text())?),
                ValueFlag::Quoted,
            ),
            TokenKind::RawString => (
                ValueKind::String(quote::parse_raw(&token.text())?),
                ValueFlag::Raw,
            ),
            TokenKind::BareIdentifier => (
                ValueKind::String(token.text().into_owned()),
                ValueFlag::None,
            ),
            TokenKind::Decimal => (
                ValueKind::Number(parse_number(token.bytes(), 10)?),
                ValueFlag::None,
            ),
            TokenKind::Hexadecimal => (
                ValueKind::Number(parse_number(token.bytes(), 16)?),
                ValueFlag::Hexadecimal,
            ),
            TokenKind::Octal => (
                ValueKind::Number(parse_number(token.bytes(), 8)?),
                ValueFlag::Octal,
            ),
            TokenKind::Binary => (
                ValueKind::Number(parse_number(token.bytes(), 2)?),
                ValueFlag::Binary,
            ),
            TokenKind::SuffixedDecimal => (
                ValueKind::Suffixed(SuffixedDecimal::parse(token.bytes())?),
                ValueFlag::BareSuffixed,
            ),
            TokenKind::Boolean => (ValueKind::Bool(token.bytes() == b"true"), ValueFlag::None),
            TokenKind::Null => (ValueKind::Null, ValueFlag::None),
            other => return Err(Error::value(format!("{other} is not a value"))),
        };
        Ok(Value {
            kind,
            type_annotation: None,
            flag,
        })
    }

    /// Sets the type annotation.
    #[must_use]
    pub fn with_type_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.type_annotation = Some(annotation.into());
        self
    }

    /// Sets the lexical form.
    #[must_use]
    pub fn with_flag(mut self, flag: ValueFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn set_type_annotation(&mut self, annotation: Option<String>) {
        self.type_annotation = annotation;
    }

    pub fn set_flag(&mut self, flag: ValueFlag) {
        self.flag = flag;
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &ValueKind {
        &self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn type_annotation(&self) -> Option<&str> {
        self.type_annotation.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn flag(&self) -> ValueFlag {
        self.flag
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self.kind, ValueKind::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self.kind, ValueKind::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, ValueKind::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_suffixed(&self) -> bool {
        matches!(self.kind, ValueKind::Suffixed(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match &self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// Returns the value as the nearest `f64` if it is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[must_use]
    pub fn as_suffixed(&self) -> Option<&SuffixedDecimal> {
        match &self.kind {
            ValueKind::Suffixed(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the plain form of the value: strings unquoted and unescaped,
    /// numbers in their recorded radix, no type annotation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_relaxed::Value;
    ///
    /// assert_eq!(Value::from("a \"b\"").value_string(), "a \"b\"");
    /// assert_eq!(Value::from(1.0).value_string(), "1.0");
    /// ```
    #[must_use]
    pub fn value_string(&self) -> String {
        match &self.kind {
            ValueKind::String(s) => s.clone(),
            _ => {
                let mut out = String::new();
                self.append_scalar(&mut out, Format::Strict);
                out
            }
        }
    }

    /// Returns the literal form of the value, including its type annotation.
    #[must_use]
    pub fn render(&self, format: Format) -> String {
        let mut out = String::new();
        self.append_to(&mut out, format);
        out
    }

    /// Returns the literal this value was read from.
    #[must_use]
    pub fn to_kdl_string(&self) -> String {
        self.render(Format::Strict)
    }

    /// Appends the literal form of the value, including its type annotation.
    pub fn append_to(&self, out: &mut String, format: Format) {
        if let Some(annotation) = &self.type_annotation {
            out.push('(');
            append_identifier(out, annotation);
            out.push(')');
        }
        self.append_scalar(out, format);
    }

    fn append_scalar(&self, out: &mut String, format: Format) {
        if matches!(format, Format::NodeName) && !self.is_string() {
            let mut literal = String::new();
            self.append_scalar(&mut literal, Format::Unformatted);
            quote::append_quoted(out, &literal, '"');
            return;
        }
        match &self.kind {
            ValueKind::Null => out.push_str("null"),
            ValueKind::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            ValueKind::Number(n) => {
                let radix = match format {
                    Format::Strict | Format::Formatted => self.flag.radix(),
                    Format::Unformatted | Format::NodeName => 10,
                };
                n.append_to(out, radix);
            }
            ValueKind::Suffixed(s) => out.push_str(&s.to_string()),
            ValueKind::String(s) => append_string(out, s, self.flag, format),
        }
    }
}

fn append_string(out: &mut String, s: &str, flag: ValueFlag, format: Format) {
    match (format, flag) {
        (Format::Strict, ValueFlag::Raw) => {
            if quote::append_raw(out, s).is_err() {
                quote::append_quoted(out, s, '"');
            }
        }
        (Format::Strict, ValueFlag::Quoted) | (Format::Formatted | Format::Unformatted, _) => {
            quote::append_quoted(out, s, '"');
        }
        _ if is_bare_identifier(s) => out.push_str(s),
        _ => quote::append_quoted(out, s, '"'),
    }
}

/// Appends `s` bare if it is a bare identifier, quoted otherwise.
pub(crate) fn append_identifier(out: &mut String, s: &str) {
    if is_bare_identifier(s) {
        out.push_str(s);
    } else {
        quote::append_quoted(out, s, '"');
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_kdl_string())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.kind {
            ValueKind::Null => serializer.serialize_unit(),
            ValueKind::Bool(b) => serializer.serialize_bool(*b),
            ValueKind::Number(n) => n.serialize(serializer),
            ValueKind::String(s) => serializer.serialize_str(s),
            ValueKind::Suffixed(s) => serializer.collect_str(s),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::value(format!("expected integer, found {value}")))
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::value(format!("expected number, found {value}")))
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::value(format!("expected bool, found {value}")))
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value.kind {
            ValueKind::String(s) => Ok(s),
            _ => Err(Error::value(format!("expected string, found {value}"))),
        }
    }
}

impl From<ValueKind> for Value {
    fn from(kind: ValueKind) -> Self {
        Value::new(kind)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::new(ValueKind::Bool(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(ValueKind::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(ValueKind::String(value))
    }
}

impl From<SuffixedDecimal> for Value {
    fn from(value: SuffixedDecimal) -> Self {
        Value::new(ValueKind::Suffixed(value)).with_flag(ValueFlag::BareSuffixed)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::new(ValueKind::Number(value))
    }
}

macro_rules! value_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::new(ValueKind::Number(Number::from(value)))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, BigInt);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Value::default, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Relaxed;
    use crate::Scanner;

    fn value_of(literal: &str, relaxed: Relaxed) -> Value {
        let token = Scanner::from_slice(literal.as_bytes(), relaxed)
            .next_token()
            .unwrap();
        Value::from_token(&token).unwrap()
    }

    #[test]
    fn test_from_token_flags() {
        assert_eq!(value_of("\"q\"", Relaxed::STRICT).flag(), ValueFlag::Quoted);
        assert_eq!(value_of("r\"q\"", Relaxed::STRICT).flag(), ValueFlag::Raw);
        assert_eq!(value_of("0b11", Relaxed::STRICT).flag(), ValueFlag::Binary);
        assert_eq!(value_of("0o7", Relaxed::STRICT).flag(), ValueFlag::Octal);
        assert_eq!(value_of("0x7", Relaxed::STRICT).flag(), ValueFlag::Hexadecimal);
        assert_eq!(value_of("bare", Relaxed::STRICT).flag(), ValueFlag::None);
        assert_eq!(
            value_of("5k", Relaxed::MULTIPLIER_SUFFIXES).flag(),
            ValueFlag::BareSuffixed
        );
    }

    #[test]
    fn test_from_token_kinds() {
        assert_eq!(value_of("true", Relaxed::STRICT).as_bool(), Some(true));
        assert_eq!(value_of("false", Relaxed::STRICT).as_bool(), Some(false));
        assert!(value_of("null", Relaxed::STRICT).is_null());
        assert_eq!(value_of("-12", Relaxed::STRICT).as_i64(), Some(-12));
        assert_eq!(value_of("1.5", Relaxed::STRICT).as_f64(), Some(1.5));
        assert_eq!(
            value_of("\"a\\tb\"", Relaxed::STRICT).as_str(),
            Some("a\tb")
        );
        assert_eq!(
            value_of("'single'", Relaxed::NGINX_SYNTAX).as_str(),
            Some("single")
        );
    }

    #[test]
    fn test_from_token_reports_position() {
        let token = Scanner::from_slice(b"\"\\u{110000}\"", Relaxed::STRICT)
            .next_token()
            .unwrap();
        let err = Value::from_token(&token).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Value);
        assert_eq!(err.position().map(|p| (p.line, p.column)), Some((1, 1)));

        let brace = Scanner::from_slice(b"{", Relaxed::STRICT)
            .next_token()
            .unwrap();
        assert!(Value::from_token(&brace).is_err());
    }

    #[test]
    fn test_strict_rendering_preserves_form() {
        for literal in [
            "\"quoted\"",
            "r#\"raw \"with\" quotes\"#",
            "bare",
            "0xff",
            "0o17",
            "0b101",
            "-42",
            "1.5",
            "true",
            "null",
        ] {
            assert_eq!(value_of(literal, Relaxed::STRICT).to_string(), literal);
        }
        assert_eq!(
            value_of("1h30m", Relaxed::MULTIPLIER_SUFFIXES).to_string(),
            "1h30m"
        );
    }

    #[test]
    fn test_formatted_and_unformatted() {
        let raw = value_of("r\"x\\y\"", Relaxed::STRICT);
        assert_eq!(raw.render(Format::Formatted), r#""x\\y""#);

        let hex = value_of("0xFF", Relaxed::STRICT);
        assert_eq!(hex.render(Format::Formatted), "0xff");
        assert_eq!(hex.render(Format::Unformatted), "255");
        assert_eq!(hex.render(Format::NodeName), "\"255\"");

        let bare = value_of("/var/www", Relaxed::NGINX_SYNTAX);
        assert_eq!(bare.render(Format::Formatted), "\"/var/www\"");
        assert_eq!(bare.render(Format::NodeName), "\"/var/www\"");

        let suffixed = value_of("10mb", Relaxed::MULTIPLIER_SUFFIXES);
        assert_eq!(suffixed.render(Format::Unformatted), "10mb");
    }

    #[test]
    fn test_node_name_rendering() {
        assert_eq!(Value::from("node").render(Format::NodeName), "node");
        assert_eq!(
            value_of("\"node\"", Relaxed::STRICT).render(Format::NodeName),
            "node"
        );
        assert_eq!(Value::from("a b").render(Format::NodeName), "\"a b\"");
        assert_eq!(Value::from("true").render(Format::NodeName), "\"true\"");
        assert_eq!(Value::from(5).render(Format::NodeName), "\"5\"");
        assert_eq!(Value::from(-1.5).render(Format::NodeName), "\"-1.5\"");
        assert_eq!(Value::from(true).render(Format::NodeName), "\"true\"");
        assert_eq!(Value::default().render(Format::NodeName), "\"null\"");
    }

    #[test]
    fn test_type_annotation_rendering() {
        let v = Value::from("x").with_type_annotation("my type");
        assert_eq!(v.to_string(), "(\"my type\")x");
        assert_eq!(v.type_annotation(), Some("my type"));
    }

    #[test]
    fn test_value_string() {
        assert_eq!(value_of("0x10", Relaxed::STRICT).value_string(), "0x10");
        assert_eq!(value_of("\"a\\nb\"", Relaxed::STRICT).value_string(), "a\nb");
        assert_eq!(Value::default().value_string(), "null");
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::from(7)).unwrap(), 7);
        assert!(i64::try_from(Value::from("7")).is_err());
        assert_eq!(f64::try_from(Value::from(2)).unwrap(), 2.0);
        assert!(bool::try_from(Value::from(true)).unwrap());
        assert_eq!(String::try_from(Value::from("s")).unwrap(), "s");
        assert!(String::try_from(Value::from(1)).is_err());
    }

    #[test]
    fn test_from_option() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some("x")).as_str(), Some("x"));
    }

    #[test]
    fn test_serialize_dump() {
        let json = serde_json::to_string(&Value::from(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let big = Value::from(BigInt::from(u64::MAX) * 4u32);
        assert_eq!(
            serde_json::to_string(&big).unwrap(),
            "\"73786976294838206460\""
        );
        let suffixed = value_of("2k", Relaxed::MULTIPLIER_SUFFIXES);
        assert_eq!(serde_json::to_string(&suffixed).unwrap(), "\"2k\"");
    }
}
