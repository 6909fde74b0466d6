//! Integration tests for request encoding.
//!
//! Every request is encoded, decoded back under the same key scheme, and
//! compared with the value the decoder is expected to produce.

use uartpack_protocol::{
    encode_request, from_hex, CodecError, GetLogsRequest, GetMessagesRequest, KeyScheme,
    ReadLog, ReadMessages, ReadRequest, Request, ResetAllMessagesRequest,
    ResetMessagesByIdRequest, Value, WriteRequest,
};

const SCHEMES: [KeyScheme; 2] = [KeyScheme::Legacy, KeyScheme::Current];

fn mixed_scalars() -> Vec<Value> {
    vec![
        Value::Byte(1),
        Value::Short(300),
        Value::Int(41000),
        Value::Long(5_000_000_000),
        Value::Float(1.5),
        Value::Double(2.25),
        Value::BigInt(i128::from(u64::MAX)),
        Value::Bool(true),
        Value::from("pump"),
    ]
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_read_request_round_trip() {
    let request = ReadRequest {
        rid: 2,
        read: mixed_scalars(),
    };
    for scheme in SCHEMES {
        let bytes = request.encode(scheme).expect("should encode");
        let decoded = ReadRequest::decode(&bytes, scheme).expect("should decode");
        assert_eq!(decoded, request.normalized());
    }
}

#[test]
fn test_read_request_keeps_numeric_types() {
    let request = ReadRequest {
        rid: 2,
        read: mixed_scalars(),
    };
    let bytes = request.encode(KeyScheme::Legacy).unwrap();
    let decoded = ReadRequest::decode(&bytes, KeyScheme::Legacy).unwrap();

    assert_eq!(decoded.read[0], Value::Int(1));
    assert_eq!(decoded.read[2], Value::Int(41000));
    assert_eq!(decoded.read[3], Value::Long(5_000_000_000));
    assert_eq!(decoded.read[4], Value::Double(1.5));
    assert_eq!(decoded.read[6], Value::BigInt(i128::from(u64::MAX)));
}

#[test]
fn test_write_request_round_trip() {
    let request = WriteRequest {
        rid: 3,
        write: vec![
            (Value::from(41000), Value::from(1)),
            (Value::from("41001"), Value::Nil),
            (
                Value::from(41002),
                Value::map([(Value::from(1), Value::from(2.5)), (Value::from("mode"), Value::from("eco"))]),
            ),
            (Value::from("pump"), Value::from("on")),
            (Value::Long(4_294_967_296), Value::Bool(false)),
            (Value::Short(7), Value::Float(0.25)),
        ],
    };
    for scheme in SCHEMES {
        let bytes = request.encode(scheme).expect("should encode");
        let decoded = WriteRequest::decode(&bytes, scheme).expect("should decode");
        assert_eq!(decoded, request.normalized());
        // "41001" comes back as an integer key
        assert_eq!(decoded.write[1].0, Value::Int(41001));
    }
}

#[test]
fn test_write_request_rejects_array_values() {
    let request = WriteRequest::new(1, [(41000, Value::array([1, 2]))]);
    let err = request.encode(KeyScheme::Legacy).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedValueType(_)));

    let request = WriteRequest::new(1, [(Value::Nil, Value::from(1))]);
    let err = request.encode(KeyScheme::Legacy).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedValueType(_)));
}

#[test]
fn test_reset_requests_round_trip() {
    for scheme in SCHEMES {
        let reset_all = ResetAllMessagesRequest::new(5);
        let bytes = reset_all.encode(scheme).unwrap();
        assert_eq!(ResetAllMessagesRequest::decode(&bytes, scheme).unwrap(), reset_all);
        // Indistinguishable from a plain register write
        let write = WriteRequest::decode(&bytes, scheme).unwrap();
        assert_eq!(write.write, vec![(Value::Int(40053), Value::Int(1))]);

        let by_id = ResetMessagesByIdRequest::new(6, [Value::from(800), Value::Long(1 << 40)]);
        let bytes = by_id.encode(scheme).unwrap();
        assert_eq!(
            ResetMessagesByIdRequest::decode(&bytes, scheme).unwrap(),
            by_id.normalized()
        );
    }
}

#[test]
fn test_query_requests_round_trip() {
    for scheme in SCHEMES {
        let messages = GetMessagesRequest {
            rid: 7,
            read_messages: ReadMessages {
                timestamp: vec![20, 1, 1, 2, 46, 36],
                count: 10,
            },
        };
        let bytes = messages.encode(scheme).unwrap();
        assert_eq!(GetMessagesRequest::decode(&bytes, scheme).unwrap(), messages);

        let logs = GetLogsRequest::new(8);
        let bytes = logs.encode(scheme).unwrap();
        let decoded = GetLogsRequest::decode(&bytes, scheme).unwrap();
        assert_eq!(decoded, logs);
        assert_eq!(decoded.read_log.count, 500);
        assert_eq!(decoded.read_log.timestamp, vec![0; 6]);
    }
}

#[test]
fn test_query_defaults() {
    assert_eq!(GetMessagesRequest::new(1).read_messages.count, 0);
    assert_eq!(GetLogsRequest::new(1).read_log, ReadLog::default());
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_timestamp_length_precondition() {
    for len in [5, 7] {
        let messages = GetMessagesRequest {
            rid: 1,
            read_messages: ReadMessages {
                timestamp: vec![0; len],
                count: 0,
            },
        };
        let err = messages.encode(KeyScheme::Legacy).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTimestampLength { actual } if actual == len));

        let logs = GetLogsRequest {
            rid: 1,
            read_log: ReadLog {
                timestamp: vec![0; len],
                count: 500,
            },
        };
        let err = encode_request(&logs.into(), KeyScheme::Current).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTimestampLength { actual } if actual == len));
    }
}

// ============================================================================
// Wire Format
// ============================================================================

#[test]
fn test_read_request_golden_bytes() {
    let request: Request = ReadRequest::new(2, [41000, 41001, 41002, 41003]).into();
    let bytes = encode_request(&request, KeyScheme::Legacy).unwrap();
    let expected = from_hex("82 A3 726964 02 A4 72656164 94 CDA028 CDA029 CDA02A CDA02B").unwrap();
    assert_eq!(bytes, expected);
}

#[test]
fn test_encoding_is_deterministic() {
    let request: Request = WriteRequest::new(1, [(41000, 1), (41001, 2)]).into();
    let first = encode_request(&request, KeyScheme::Current).unwrap();
    let second = encode_request(&request, KeyScheme::Current).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scheme_independence() {
    let request = ReadRequest::new(2, [41000, 41001]);
    let legacy = request.encode(KeyScheme::Legacy).unwrap();
    let current = request.encode(KeyScheme::Current).unwrap();
    assert_ne!(legacy, current);
    assert!(current.len() < legacy.len());

    assert_eq!(ReadRequest::decode(&legacy, KeyScheme::Legacy).unwrap(), request);
    assert_eq!(ReadRequest::decode(&current, KeyScheme::Current).unwrap(), request);

    // Keys never fall back to the other scheme
    let err = ReadRequest::decode(&current, KeyScheme::Legacy).unwrap_err();
    assert!(matches!(err, CodecError::MissingField(ref f) if f == "rid"));
}
