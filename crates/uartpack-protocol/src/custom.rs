//! Decoding payloads into caller-defined types.

use crate::error::{CodecError, CodecResult};
use crate::value::{self, Value};
use serde::de::DeserializeOwned;

/// Project an adapted tree onto `T`.
pub fn from_tree<T: DeserializeOwned>(value: &Value) -> CodecResult<T> {
    rmpv::ext::from_value(value.to_wire()?).map_err(|e| CodecError::Deserialize(e.to_string()))
}

/// Decode the first top-level value of `bytes` into `T`.
///
/// The payload goes through the value tree first, so numeric string keys
/// arrive as integers and may target integer-keyed maps.
pub fn decode_custom_type<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    from_tree(&value::decode(bytes)?)
}

/// Decode every top-level value of `bytes` into `T`.
pub fn decode_custom_stream<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<Vec<T>> {
    value::decode_all(bytes)?.iter().map(from_tree).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Setting {
        id: i32,
        values: BTreeMap<i64, i64>,
    }

    #[test]
    fn test_string_keys_reach_integer_maps() {
        let tree = Value::map([
            (Value::from("id"), Value::from(3)),
            (Value::from("values"), Value::map([("41000", 1), ("41001", 0)])),
        ]);
        let bytes = tree.to_bytes().unwrap();

        let setting: Setting = decode_custom_type(&bytes).unwrap();
        assert_eq!(setting.id, 3);
        assert_eq!(setting.values.get(&41000), Some(&1));
    }

    #[test]
    fn test_shape_mismatch() {
        let bytes = Value::from("not a struct").to_bytes().unwrap();
        let err = decode_custom_type::<Setting>(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Deserialize(_)));
    }
}
