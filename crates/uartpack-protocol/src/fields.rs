//! Helpers for pulling typed fields out of decoded maps.

use crate::error::{CodecError, CodecResult};
use crate::keys::{Field, KeyScheme};
use crate::value::Value;
use std::collections::BTreeMap;

/// Register number to value, ordered by register.
pub type RegisterMap = BTreeMap<i64, Value>;

pub(crate) fn root_map<'a>(value: &'a Value, what: &str) -> CodecResult<&'a [(Value, Value)]> {
    value
        .as_map()
        .ok_or_else(|| CodecError::invalid_field(what, format!("expected a map, got {}", value.type_name())))
}

pub(crate) fn optional<'a>(value: &'a Value, scheme: KeyScheme, field: Field) -> Option<&'a Value> {
    value.get(field.token(scheme))
}

pub(crate) fn require<'a>(value: &'a Value, scheme: KeyScheme, field: Field) -> CodecResult<&'a Value> {
    optional(value, scheme, field)
        .ok_or_else(|| CodecError::MissingField(field.token(scheme).to_string()))
}

pub(crate) fn to_i64(token: &str, value: &Value) -> CodecResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| CodecError::invalid_field(token, format!("expected an integer, got {}", value.type_name())))
}

pub(crate) fn to_i32(token: &str, value: &Value) -> CodecResult<i32> {
    let v = to_i64(token, value)?;
    i32::try_from(v).map_err(|_| CodecError::invalid_field(token, format!("{} does not fit in 32 bits", v)))
}

pub(crate) fn require_i32(value: &Value, scheme: KeyScheme, field: Field) -> CodecResult<i32> {
    to_i32(field.token(scheme), require(value, scheme, field)?)
}

pub(crate) fn rid(value: &Value, scheme: KeyScheme) -> CodecResult<i32> {
    require_i32(value, scheme, Field::Rid)
}

/// Read a map keyed by register number.
pub(crate) fn register_map(token: &str, value: &Value) -> CodecResult<RegisterMap> {
    let entries = root_map(value, token)?;
    let mut registers = RegisterMap::new();
    for (key, val) in entries {
        let register = key
            .as_i64()
            .ok_or_else(|| CodecError::invalid_field(token, format!("non-integer register key {}", key)))?;
        registers.insert(register, val.clone());
    }
    Ok(registers)
}

/// Read an array of integers.
pub(crate) fn int_list(token: &str, value: &Value) -> CodecResult<Vec<i64>> {
    value
        .as_array()
        .ok_or_else(|| CodecError::invalid_field(token, "expected an array"))?
        .iter()
        .map(|item| to_i64(token, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_scheme_token() {
        let value = Value::map([("rid", 1)]);
        assert_eq!(rid(&value, KeyScheme::Legacy).unwrap(), 1);
        match rid(&value, KeyScheme::Current).unwrap_err() {
            CodecError::MissingField(token) => assert_eq!(token, "I"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_register_map_rejects_text_keys() {
        let good = Value::map([(49002, 2), (49001, 1)]);
        let map = register_map("read", &good).unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![49001, 49002]);

        let bad = Value::map([("pump", 1)]);
        assert!(matches!(
            register_map("read", &bad).unwrap_err(),
            CodecError::InvalidField { .. }
        ));
    }

    #[test]
    fn test_to_i32_range() {
        assert!(to_i32("count", &Value::Long(i64::MAX)).is_err());
        assert!(to_i32("count", &Value::from("x")).is_err());
        assert_eq!(to_i32("count", &Value::Int(-3)).unwrap(), -3);
    }
}
