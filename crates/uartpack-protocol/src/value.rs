//! Dynamic value tree for MessagePack payloads.
//!
//! This module provides:
//! - [`Value`] - the value tree exchanged with the device
//! - [`decode`] / [`decode_all`] / [`read_next`] - numerically faithful decoding
//! - the writers used by the request encoders
//!
//! Decoding never widens an integer into a float and never leaves a numeric
//! map key as a string: register maps and named-field maps share one wire
//! shape, so a key such as `"800"` is turned into the integer `800`.

use crate::error::{CodecError, CodecResult};
use rmp::encode;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt::{self, Write as _};

// ============================================================================
// Value Enum
// ============================================================================

/// A node of a decoded (or to-be-encoded) payload.
///
/// The integer and float arms mirror the runtime types a request may carry.
/// Decoding only produces the canonical arms: `Int` when the value fits 32
/// bits, `Long` when it fits 64 signed bits, `BigInt` above that, and
/// `Double` for every float.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Nil,
    /// Boolean value.
    Bool(bool),
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Integer beyond the signed 64-bit range. Only values representable as
    /// `i64` or `u64` can be written to the wire.
    BigInt(i128),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Raw byte string.
    Binary(Vec<u8>),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Ordered mapping.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Build the narrowest canonical integer arm holding `v`.
    pub fn integer(v: i128) -> Value {
        if let Ok(v) = i32::try_from(v) {
            Value::Int(v)
        } else if let Ok(v) = i64::try_from(v) {
            Value::Long(v)
        } else {
            Value::BigInt(v)
        }
    }

    /// Build an array from anything convertible to values.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Value {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a map from key/value pairs, keeping their order.
    pub fn map<K: Into<Value>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the arm, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::BigInt(_) => "big integer",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Convert to i64 if this is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::BigInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Convert to i32 if this is an integer that fits.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// Convert to f64 if this is a float or an integer.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            Value::BigInt(v) => Some(*v as f64),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to bool if possible.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the elements of an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the entries of a map.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Check if the value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if the value is any integer arm.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) | Value::BigInt(_)
        )
    }

    /// Check if the value is any float arm.
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_) | Value::Double(_))
    }

    /// Look up a string key in a map. Returns `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Look up an integer key in a map. Returns `None` for non-maps.
    pub fn get_int(&self, key: i64) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_i64() == Some(key))
            .map(|(_, v)| v)
    }

    /// The tree exactly as [`decode`] would return it after a round trip
    /// through the wire.
    pub fn normalized(&self) -> Value {
        match self {
            Value::Byte(v) => Value::Int(i32::from(*v)),
            Value::Short(v) => Value::Int(i32::from(*v)),
            Value::Long(v) => Value::integer(i128::from(*v)),
            Value::BigInt(v) => Value::integer(*v),
            Value::Float(v) => Value::Double(f64::from(*v)),
            Value::Array(items) => Value::Array(items.iter().map(Value::normalized).collect()),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (coerce_key(k.normalized()), v.normalized()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Adapt a raw MessagePack value into a [`Value`] tree.
    pub fn from_wire(raw: rmpv::Value) -> CodecResult<Value> {
        match raw {
            rmpv::Value::Nil => Ok(Value::Nil),
            rmpv::Value::Boolean(b) => Ok(Value::Bool(b)),
            rmpv::Value::Integer(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Value::integer(i128::from(v)))
                } else if let Some(v) = n.as_u64() {
                    Ok(Value::integer(i128::from(v)))
                } else {
                    Err(CodecError::UnrecognizedTokenKind(format!("integer {:?}", n)))
                }
            }
            rmpv::Value::F32(v) => Ok(Value::Double(f64::from(v))),
            rmpv::Value::F64(v) => Ok(Value::Double(v)),
            rmpv::Value::String(s) => s.into_str().map(Value::String).ok_or_else(|| {
                CodecError::UnrecognizedTokenKind("string with invalid UTF-8".to_string())
            }),
            rmpv::Value::Binary(b) => Ok(Value::Binary(b)),
            rmpv::Value::Array(items) => items
                .into_iter()
                .map(Value::from_wire)
                .collect::<CodecResult<Vec<_>>>()
                .map(Value::Array),
            rmpv::Value::Map(entries) => {
                let mut map = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    map.push((coerce_key(Value::from_wire(k)?), Value::from_wire(v)?));
                }
                Ok(Value::Map(map))
            }
            rmpv::Value::Ext(tag, _) => Err(CodecError::UnrecognizedTokenKind(format!(
                "extension type {}",
                tag
            ))),
        }
    }

    /// Convert back into a raw MessagePack value.
    pub fn to_wire(&self) -> CodecResult<rmpv::Value> {
        Ok(match self {
            Value::Nil => rmpv::Value::Nil,
            Value::Bool(b) => rmpv::Value::Boolean(*b),
            Value::Byte(v) => rmpv::Value::from(*v),
            Value::Short(v) => rmpv::Value::from(*v),
            Value::Int(v) => rmpv::Value::from(*v),
            Value::Long(v) => rmpv::Value::from(*v),
            Value::BigInt(v) => {
                if let Ok(v) = i64::try_from(*v) {
                    rmpv::Value::from(v)
                } else if let Ok(v) = u64::try_from(*v) {
                    rmpv::Value::from(v)
                } else {
                    return Err(out_of_range(*v));
                }
            }
            Value::Float(v) => rmpv::Value::F32(*v),
            Value::Double(v) => rmpv::Value::F64(*v),
            Value::String(s) => rmpv::Value::from(s.as_str()),
            Value::Binary(b) => rmpv::Value::Binary(b.clone()),
            Value::Array(items) => rmpv::Value::Array(
                items
                    .iter()
                    .map(Value::to_wire)
                    .collect::<CodecResult<Vec<_>>>()?,
            ),
            Value::Map(entries) => {
                let mut map = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    map.push((k.to_wire()?, v.to_wire()?));
                }
                rmpv::Value::Map(map)
            }
        })
    }

    /// Append this tree to `buf` as a single MessagePack value.
    pub fn write(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        write_value(buf, self)
    }

    /// Encode this tree as a single MessagePack value.
    pub fn to_bytes(&self) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }

    /// Render as JSON-like text. Map keys are always quoted.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Turn a string key holding an integer token into an integer key.
/// Float tokens stay text.
fn coerce_key(key: Value) -> Value {
    match key {
        Value::String(s) => match number_from_token(&s) {
            Ok(v) if v.is_integer() => v,
            _ => Value::String(s),
        },
        other => other,
    }
}

fn out_of_range(v: i128) -> CodecError {
    CodecError::UnsupportedValueType(format!("integer {} does not fit in 64 bits", v))
}

/// Parse a numeric text token.
///
/// Tokens containing a decimal point or exponent become `Double`; anything
/// else is tried as a 32-bit integer, then as a 64-bit integer.
pub fn number_from_token(token: &str) -> CodecResult<Value> {
    let token = token.trim();
    let not_a_number = || CodecError::UnrecognizedTokenKind(format!("not a number: '{}'", token));

    if token.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        return token
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| not_a_number());
    }
    if let Ok(v) = token.parse::<i32>() {
        return Ok(Value::Int(v));
    }
    token
        .parse::<i64>()
        .map(Value::Long)
        .map_err(|_| not_a_number())
}

// ============================================================================
// From implementations for Value
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::integer(i128::from(v))
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::integer(i128::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::integer(i128::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Nil,
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Read the next top-level value from `buf`, advancing it past the value.
pub fn read_next(buf: &mut &[u8]) -> CodecResult<Value> {
    let raw = rmpv::decode::read_value(buf)?;
    Value::from_wire(raw)
}

/// Decode the first top-level value of `bytes`. Trailing bytes are ignored.
pub fn decode(bytes: &[u8]) -> CodecResult<Value> {
    let mut rd = bytes;
    read_next(&mut rd)
}

/// Decode every top-level value packed back-to-back in `bytes`.
pub fn decode_all(bytes: &[u8]) -> CodecResult<Vec<Value>> {
    let mut rd = bytes;
    let mut values = Vec::new();
    while !rd.is_empty() {
        values.push(read_next(&mut rd)?);
    }
    Ok(values)
}

// ============================================================================
// Encoding
// ============================================================================

fn len_u32(len: usize) -> CodecResult<u32> {
    u32::try_from(len)
        .map_err(|_| CodecError::UnsupportedValueType(format!("collection of {} entries", len)))
}

fn write_integer(buf: &mut Vec<u8>, v: i128) -> CodecResult<()> {
    if let Ok(v) = i64::try_from(v) {
        encode::write_sint(buf, v)?;
    } else if let Ok(v) = u64::try_from(v) {
        encode::write_uint(buf, v)?;
    } else {
        return Err(out_of_range(v));
    }
    Ok(())
}

/// Write a scalar request element (array item or map key).
///
/// Nil, binary, arrays and maps are rejected.
pub(crate) fn write_scalar(buf: &mut Vec<u8>, value: &Value) -> CodecResult<()> {
    match value {
        Value::Bool(b) => {
            encode::write_bool(buf, *b)?;
        }
        Value::Byte(v) => write_integer(buf, i128::from(*v))?,
        Value::Short(v) => write_integer(buf, i128::from(*v))?,
        Value::Int(v) => write_integer(buf, i128::from(*v))?,
        Value::Long(v) => write_integer(buf, i128::from(*v))?,
        Value::BigInt(v) => write_integer(buf, *v)?,
        Value::Float(v) => {
            encode::write_f32(buf, *v)?;
        }
        Value::Double(v) => {
            encode::write_f64(buf, *v)?;
        }
        Value::String(s) => {
            encode::write_str(buf, s)?;
        }
        Value::Nil | Value::Binary(_) | Value::Array(_) | Value::Map(_) => {
            return Err(CodecError::UnsupportedValueType(value.type_name().to_string()));
        }
    }
    Ok(())
}

/// Write a sequence of scalars.
pub(crate) fn write_scalar_array(buf: &mut Vec<u8>, items: &[Value]) -> CodecResult<()> {
    encode::write_array_len(buf, len_u32(items.len())?)?;
    for item in items {
        write_scalar(buf, item)?;
    }
    Ok(())
}

/// Write a register map: scalar keys, values that are scalars, nil or
/// nested maps of the same shape.
pub(crate) fn write_register_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> CodecResult<()> {
    encode::write_map_len(buf, len_u32(entries.len())?)?;
    for (key, value) in entries {
        write_scalar(buf, key)?;
        match value {
            Value::Nil => encode::write_nil(buf)?,
            Value::Map(nested) => write_register_map(buf, nested)?,
            other => write_scalar(buf, other)?,
        }
    }
    Ok(())
}

/// Write a six-component timestamp.
pub(crate) fn write_int_array(buf: &mut Vec<u8>, items: &[i32]) -> CodecResult<()> {
    encode::write_array_len(buf, len_u32(items.len())?)?;
    for item in items {
        encode::write_sint(buf, i64::from(*item))?;
    }
    Ok(())
}

/// Write a map key given as a wire token.
pub(crate) fn write_key(buf: &mut Vec<u8>, token: &str) -> CodecResult<()> {
    encode::write_str(buf, token)?;
    Ok(())
}

/// Write any value, including binary and nested arrays.
pub fn write_value(buf: &mut Vec<u8>, value: &Value) -> CodecResult<()> {
    match value {
        Value::Nil => encode::write_nil(buf)?,
        Value::Binary(b) => {
            encode::write_bin(buf, b)?;
        }
        Value::Array(items) => {
            encode::write_array_len(buf, len_u32(items.len())?)?;
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Map(entries) => {
            encode::write_map_len(buf, len_u32(entries.len())?)?;
            for (k, v) in entries {
                write_value(buf, k)?;
                write_value(buf, v)?;
            }
        }
        scalar => write_scalar(buf, scalar)?,
    }
    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::String(v) => write_quoted(f, v),
            Value::Binary(v) => write!(f, "\"{}\"", hex::encode(v)),
            Value::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
            Value::Map(entries) => {
                f.write_char('{')?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    match k {
                        Value::String(s) => write_quoted(f, s)?,
                        other => write!(f, "\"{}\"", other)?,
                    }
                    write!(f, ":{}", v)?;
                }
                f.write_char('}')
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Byte(v) => serializer.serialize_i8(*v),
            Value::Short(v) => serializer.serialize_i16(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::BigInt(v) => match u64::try_from(*v) {
                Ok(v) => serializer.serialize_u64(v),
                Err(_) => serializer.serialize_i128(*v),
            },
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Binary(v) => serializer.serialize_bytes(v),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_stay_integers() {
        // 41000 as uint16
        let value = decode(&[0xcd, 0xa0, 0x28]).unwrap();
        assert_eq!(value, Value::Int(41000));
        assert!(value.is_integer());

        // 2^32 as uint64
        let value = decode(&[0xcf, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap();
        assert_eq!(value, Value::Long(4_294_967_296));

        // u64::MAX does not fit i64
        let value = decode(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap();
        assert_eq!(value, Value::BigInt(i128::from(u64::MAX)));

        // -128 as int8
        assert_eq!(decode(&[0xd0, 0x80]).unwrap(), Value::Int(-128));
    }

    #[test]
    fn test_floats_stay_floats() {
        let value = decode(&[0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(value, Value::Double(1.0));
        assert!(value.is_float());
        assert_ne!(value, Value::Int(1));

        let value = decode(&[0xca, 0x3f, 0xc0, 0, 0]).unwrap();
        assert_eq!(value, Value::Double(1.5));
    }

    #[test]
    fn test_numeric_string_keys_become_integers() {
        // {"800": 0, "name": "pump"}
        let bytes = [
            0x82, 0xa3, b'8', b'0', b'0', 0x00, 0xa4, b'n', b'a', b'm', b'e', 0xa4, b'p', b'u',
            b'm', b'p',
        ];
        let value = decode(&bytes).unwrap();
        let entries = value.as_map().unwrap();
        assert_eq!(entries[0].0, Value::Int(800));
        assert_eq!(entries[1].0, Value::String("name".to_string()));
        assert_eq!(value.get_int(800), Some(&Value::Int(0)));
        assert_eq!(value.get("name").and_then(Value::as_str), Some("pump"));
    }

    #[test]
    fn test_only_integer_string_keys_are_coerced() {
        assert_eq!(coerce_key(Value::from("41000")), Value::Int(41000));
        assert_eq!(coerce_key(Value::from("4294967296")), Value::Long(4_294_967_296));
        assert_eq!(coerce_key(Value::from("1.5")), Value::from("1.5"));
        assert_eq!(coerce_key(Value::from("2e3")), Value::from("2e3"));
        assert_eq!(coerce_key(Value::from("E")), Value::from("E"));
        assert_eq!(
            coerce_key(Value::from("99999999999999999999")),
            Value::from("99999999999999999999")
        );

        let keyed = Value::map([("1.5", 1), ("800", 2)]).normalized();
        assert_eq!(keyed.get("1.5"), Some(&Value::Int(1)));
        assert_eq!(keyed.get_int(800), Some(&Value::Int(2)));
    }

    #[test]
    fn test_extension_types_are_rejected() {
        let err = decode(&[0xd4, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::UnrecognizedTokenKind(_)));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = decode(&[0xa3, 0xff, 0xfe, 0xfd]).unwrap_err();
        assert!(matches!(err, CodecError::UnrecognizedTokenKind(_)));
    }

    #[test]
    fn test_truncated_payload_is_a_decode_error() {
        let err = decode(&[0xcd, 0xa0]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_decode_all_reads_concatenated_values() {
        let values = decode_all(&[0x01, 0xa1, b'x', 0xc0]).unwrap();
        assert_eq!(
            values,
            vec![Value::Int(1), Value::String("x".to_string()), Value::Nil]
        );
    }

    #[test]
    fn test_number_from_token() {
        assert_eq!(number_from_token("41000").unwrap(), Value::Int(41000));
        assert_eq!(number_from_token("1.0").unwrap(), Value::Double(1.0));
        assert_eq!(
            number_from_token("4294967296").unwrap(),
            Value::Long(4_294_967_296)
        );
        assert_eq!(number_from_token("2e3").unwrap(), Value::Double(2000.0));
        assert!(number_from_token("pump").is_err());
        assert!(number_from_token("99999999999999999999").is_err());
    }

    #[test]
    fn test_normalized_matches_wire_round_trip() {
        let value = Value::map([
            (Value::String("41000".to_string()), Value::Byte(1)),
            (Value::Short(2), Value::Float(0.5)),
            (Value::Long(3), Value::array([Value::Long(7), Value::BigInt(8)])),
        ]);
        let decoded = decode(&value.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, value.normalized());
        assert_eq!(decoded.get_int(41000), Some(&Value::Int(1)));
    }

    #[test]
    fn test_scalar_writer_rejects_containers() {
        let mut buf = Vec::new();
        for value in [
            Value::Nil,
            Value::Binary(vec![1]),
            Value::array([1]),
            Value::map([(1, 2)]),
            Value::BigInt(i128::MAX),
        ] {
            let err = write_scalar(&mut buf, &value).unwrap_err();
            assert!(matches!(err, CodecError::UnsupportedValueType(_)), "{:?}", value);
        }
    }

    #[test]
    fn test_render_quotes_keys() {
        let value = Value::map([
            (Value::from("rid"), Value::from(1)),
            (
                Value::from("read"),
                Value::map([(Value::from(49001), Value::from("a\"b"))]),
            ),
        ]);
        assert_eq!(value.render(), r#"{"rid":1,"read":{"49001":"a\"b"}}"#);
    }

    #[test]
    fn test_wire_conversion_round_trip() {
        let value = Value::map([
            (Value::from("mid"), Value::from(1)),
            (Value::from("data"), Value::Binary(vec![0xde, 0xad])),
            (Value::from("big"), Value::BigInt(i128::from(u64::MAX))),
        ]);
        let wire = value.to_wire().unwrap();
        assert_eq!(Value::from_wire(wire).unwrap(), value.normalized());
        assert!(Value::BigInt(-i128::from(u64::MAX)).to_wire().is_err());
    }
}
