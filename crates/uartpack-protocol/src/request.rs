//! Requests that can be sent to the device.
//!
//! Every request encodes to a two-entry map: the request id first, then a
//! single payload entry whose key depends on the variant and the
//! [`KeyScheme`].

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::fields::{self, require, to_i32};
use crate::keys::{Field, KeyScheme};
use crate::value::{self, write_int_array, write_key, write_register_map, write_scalar_array, Value};
use rmp::encode;
use serde::Serialize;

/// Write the map header, the request id and the payload key.
fn begin(buf: &mut Vec<u8>, scheme: KeyScheme, rid: i32, payload: Field) -> CodecResult<()> {
    encode::write_map_len(buf, 2)?;
    write_key(buf, Field::Rid.token(scheme))?;
    encode::write_sint(buf, i64::from(rid))?;
    write_key(buf, payload.token(scheme))
}

fn check_timestamp(timestamp: &[i32]) -> CodecResult<()> {
    if timestamp.len() != TIMESTAMP_LEN {
        return Err(CodecError::InvalidTimestampLength {
            actual: timestamp.len(),
        });
    }
    Ok(())
}

/// Entry order inside a query payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryOrder {
    /// `{COUNT: count, TIMESTAMP: [..]}`, used by message queries.
    CountFirst,
    /// `{TIMESTAMP: [..], COUNT: count}`, used by log queries.
    TimestampFirst,
}

fn write_query(
    buf: &mut Vec<u8>,
    scheme: KeyScheme,
    order: QueryOrder,
    count: i32,
    timestamp: &[i32],
) -> CodecResult<()> {
    encode::write_map_len(buf, 2)?;
    match order {
        QueryOrder::CountFirst => {
            write_key(buf, Field::Count.token(scheme))?;
            encode::write_sint(buf, i64::from(count))?;
            write_key(buf, Field::Timestamp.token(scheme))?;
            write_int_array(buf, timestamp)
        }
        QueryOrder::TimestampFirst => {
            write_key(buf, Field::Timestamp.token(scheme))?;
            write_int_array(buf, timestamp)?;
            write_key(buf, Field::Count.token(scheme))?;
            encode::write_sint(buf, i64::from(count))?;
            Ok(())
        }
    }
}

fn read_query(root: &Value, scheme: KeyScheme, payload: Field) -> CodecResult<(i32, Vec<i32>)> {
    let query = require(root, scheme, payload)?;
    let count = fields::require_i32(query, scheme, Field::Count)?;
    let token = Field::Timestamp.token(scheme);
    let timestamp = require(query, scheme, Field::Timestamp)?
        .as_array()
        .ok_or_else(|| CodecError::invalid_field(token, "expected an array"))?
        .iter()
        .map(|v| to_i32(token, v))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok((count, timestamp))
}

fn array_payload(root: &Value, scheme: KeyScheme, payload: Field) -> CodecResult<Vec<Value>> {
    let items = require(root, scheme, payload)?;
    items
        .as_array()
        .map(<[Value]>::to_vec)
        .ok_or_else(|| CodecError::invalid_field(payload.token(scheme), "expected an array"))
}

fn map_payload(root: &Value, scheme: KeyScheme, payload: Field) -> CodecResult<Vec<(Value, Value)>> {
    let entries = require(root, scheme, payload)?;
    entries
        .as_map()
        .map(<[(Value, Value)]>::to_vec)
        .ok_or_else(|| CodecError::invalid_field(payload.token(scheme), "expected a map"))
}

// ============================================================================
// Register access
// ============================================================================

/// Read one or more registers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadRequest {
    /// Request id.
    pub rid: i32,
    /// Registers to read, each a scalar.
    pub read: Vec<Value>,
}

impl ReadRequest {
    /// Create a read request for a list of registers.
    pub fn new<T: Into<Value>>(rid: i32, registers: impl IntoIterator<Item = T>) -> Self {
        ReadRequest {
            rid,
            read: registers.into_iter().map(Into::into).collect(),
        }
    }

    /// Encode to wire bytes.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        begin(&mut buf, scheme, self.rid, Field::Read)?;
        write_scalar_array(&mut buf, &self.read)?;
        Ok(buf)
    }

    /// Decode a request previously produced by [`ReadRequest::encode`].
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        let root = value::decode(bytes)?;
        Ok(ReadRequest {
            rid: fields::rid(&root, scheme)?,
            read: array_payload(&root, scheme, Field::Read)?,
        })
    }

    /// This request as it reads back after a round trip.
    pub fn normalized(&self) -> Self {
        ReadRequest {
            rid: self.rid,
            read: self.read.iter().map(Value::normalized).collect(),
        }
    }
}

/// Write one or more registers.
///
/// Values may be scalars, nil, or nested maps of the same shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteRequest {
    /// Request id.
    pub rid: i32,
    /// Register/value pairs, in wire order.
    pub write: Vec<(Value, Value)>,
}

impl WriteRequest {
    /// Create a write request from register/value pairs.
    pub fn new<K: Into<Value>, V: Into<Value>>(rid: i32, entries: impl IntoIterator<Item = (K, V)>) -> Self {
        WriteRequest {
            rid,
            write: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Encode to wire bytes.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        begin(&mut buf, scheme, self.rid, Field::Write)?;
        write_register_map(&mut buf, &self.write)?;
        Ok(buf)
    }

    /// Decode a request previously produced by [`WriteRequest::encode`].
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        let root = value::decode(bytes)?;
        Ok(WriteRequest {
            rid: fields::rid(&root, scheme)?,
            write: map_payload(&root, scheme, Field::Write)?,
        })
    }

    /// This request as it reads back after a round trip.
    pub fn normalized(&self) -> Self {
        let write = match Value::Map(self.write.clone()).normalized() {
            Value::Map(entries) => entries,
            _ => Vec::new(),
        };
        WriteRequest { rid: self.rid, write }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Clear every active message by writing the reset register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetAllMessagesRequest {
    /// Request id.
    pub rid: i32,
    /// Register to write.
    pub register: i32,
    /// Value to write.
    pub value: i32,
}

impl ResetAllMessagesRequest {
    /// Create a request using the default reset register.
    pub fn new(rid: i32) -> Self {
        ResetAllMessagesRequest {
            rid,
            register: RESET_ALL_MESSAGES_REGISTER,
            value: RESET_ALL_MESSAGES_VALUE,
        }
    }

    /// Encode to wire bytes. The payload goes under the write key.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        begin(&mut buf, scheme, self.rid, Field::Write)?;
        write_register_map(&mut buf, &[(Value::Int(self.register), Value::Int(self.value))])?;
        Ok(buf)
    }

    /// Decode a request previously produced by [`ResetAllMessagesRequest::encode`].
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        let root = value::decode(bytes)?;
        let token = Field::Write.token(scheme);
        let entries = map_payload(&root, scheme, Field::Write)?;
        match entries.as_slice() {
            [(register, value)] => Ok(ResetAllMessagesRequest {
                rid: fields::rid(&root, scheme)?,
                register: to_i32(token, register)?,
                value: to_i32(token, value)?,
            }),
            _ => Err(CodecError::invalid_field(
                token,
                format!("expected a single register, got {}", entries.len()),
            )),
        }
    }
}

/// Reset individual messages by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetMessagesByIdRequest {
    /// Request id.
    pub rid: i32,
    /// Message ids to reset.
    pub message_ids: Vec<Value>,
}

impl ResetMessagesByIdRequest {
    /// Create a reset request for the given message ids.
    pub fn new<T: Into<Value>>(rid: i32, message_ids: impl IntoIterator<Item = T>) -> Self {
        ResetMessagesByIdRequest {
            rid,
            message_ids: message_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Encode to wire bytes.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        begin(&mut buf, scheme, self.rid, Field::ResetMessages)?;
        write_scalar_array(&mut buf, &self.message_ids)?;
        Ok(buf)
    }

    /// Decode a request previously produced by [`ResetMessagesByIdRequest::encode`].
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        let root = value::decode(bytes)?;
        Ok(ResetMessagesByIdRequest {
            rid: fields::rid(&root, scheme)?,
            message_ids: array_payload(&root, scheme, Field::ResetMessages)?,
        })
    }

    /// This request as it reads back after a round trip.
    pub fn normalized(&self) -> Self {
        ResetMessagesByIdRequest {
            rid: self.rid,
            message_ids: self.message_ids.iter().map(Value::normalized).collect(),
        }
    }
}

/// Message retrieval query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadMessages {
    /// Retrieve messages since this timestamp. Must hold six components.
    pub timestamp: Vec<i32>,
    /// Maximum number of messages (0 = all).
    pub count: i32,
}

impl Default for ReadMessages {
    fn default() -> Self {
        ReadMessages {
            timestamp: vec![0; TIMESTAMP_LEN],
            count: DEFAULT_MESSAGE_COUNT,
        }
    }
}

/// Retrieve the message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetMessagesRequest {
    /// Request id.
    pub rid: i32,
    /// Query parameters.
    pub read_messages: ReadMessages,
}

impl GetMessagesRequest {
    /// Create a query for every message.
    pub fn new(rid: i32) -> Self {
        GetMessagesRequest {
            rid,
            read_messages: ReadMessages::default(),
        }
    }

    /// Encode to wire bytes.
    ///
    /// Fails with [`CodecError::InvalidTimestampLength`] unless the timestamp
    /// holds exactly six components.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        let query = &self.read_messages;
        check_timestamp(&query.timestamp)?;
        let mut buf = Vec::new();
        begin(&mut buf, scheme, self.rid, Field::ReadMessages)?;
        write_query(&mut buf, scheme, QueryOrder::CountFirst, query.count, &query.timestamp)?;
        Ok(buf)
    }

    /// Decode a request previously produced by [`GetMessagesRequest::encode`].
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        let root = value::decode(bytes)?;
        let (count, timestamp) = read_query(&root, scheme, Field::ReadMessages)?;
        Ok(GetMessagesRequest {
            rid: fields::rid(&root, scheme)?,
            read_messages: ReadMessages { timestamp, count },
        })
    }
}

// ============================================================================
// Logs
// ============================================================================

/// Log retrieval query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadLog {
    /// Retrieve entries since this timestamp. Must hold six components.
    pub timestamp: Vec<i32>,
    /// Maximum number of entries.
    pub count: i32,
}

impl Default for ReadLog {
    fn default() -> Self {
        ReadLog {
            timestamp: vec![0; TIMESTAMP_LEN],
            count: DEFAULT_LOG_COUNT,
        }
    }
}

/// Retrieve the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetLogsRequest {
    /// Request id.
    pub rid: i32,
    /// Query parameters.
    pub read_log: ReadLog,
}

impl GetLogsRequest {
    /// Create a query using the default entry count.
    pub fn new(rid: i32) -> Self {
        GetLogsRequest {
            rid,
            read_log: ReadLog::default(),
        }
    }

    /// Encode to wire bytes. The timestamp is written before the count.
    ///
    /// Fails with [`CodecError::InvalidTimestampLength`] unless the timestamp
    /// holds exactly six components.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        let query = &self.read_log;
        check_timestamp(&query.timestamp)?;
        let mut buf = Vec::new();
        begin(&mut buf, scheme, self.rid, Field::ReadLog)?;
        write_query(&mut buf, scheme, QueryOrder::TimestampFirst, query.count, &query.timestamp)?;
        Ok(buf)
    }

    /// Decode a request previously produced by [`GetLogsRequest::encode`].
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        let root = value::decode(bytes)?;
        let (count, timestamp) = read_query(&root, scheme, Field::ReadLog)?;
        Ok(GetLogsRequest {
            rid: fields::rid(&root, scheme)?,
            read_log: ReadLog { timestamp, count },
        })
    }
}

// ============================================================================
// Request Enum
// ============================================================================

/// Any request that can be sent to the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Register read.
    Read(ReadRequest),
    /// Register write.
    Write(WriteRequest),
    /// Reset every message.
    ResetAllMessages(ResetAllMessagesRequest),
    /// Reset messages by id.
    ResetMessagesById(ResetMessagesByIdRequest),
    /// Message retrieval.
    GetMessages(GetMessagesRequest),
    /// Log retrieval.
    GetLogs(GetLogsRequest),
}

impl Request {
    /// Request id of the wrapped request.
    pub fn rid(&self) -> i32 {
        match self {
            Request::Read(r) => r.rid,
            Request::Write(r) => r.rid,
            Request::ResetAllMessages(r) => r.rid,
            Request::ResetMessagesById(r) => r.rid,
            Request::GetMessages(r) => r.rid,
            Request::GetLogs(r) => r.rid,
        }
    }

    /// Encode to wire bytes.
    pub fn encode(&self, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
        match self {
            Request::Read(r) => r.encode(scheme),
            Request::Write(r) => r.encode(scheme),
            Request::ResetAllMessages(r) => r.encode(scheme),
            Request::ResetMessagesById(r) => r.encode(scheme),
            Request::GetMessages(r) => r.encode(scheme),
            Request::GetLogs(r) => r.encode(scheme),
        }
    }
}

impl From<ReadRequest> for Request {
    fn from(r: ReadRequest) -> Self {
        Request::Read(r)
    }
}

impl From<WriteRequest> for Request {
    fn from(r: WriteRequest) -> Self {
        Request::Write(r)
    }
}

impl From<ResetAllMessagesRequest> for Request {
    fn from(r: ResetAllMessagesRequest) -> Self {
        Request::ResetAllMessages(r)
    }
}

impl From<ResetMessagesByIdRequest> for Request {
    fn from(r: ResetMessagesByIdRequest) -> Self {
        Request::ResetMessagesById(r)
    }
}

impl From<GetMessagesRequest> for Request {
    fn from(r: GetMessagesRequest) -> Self {
        Request::GetMessages(r)
    }
}

impl From<GetLogsRequest> for Request {
    fn from(r: GetLogsRequest) -> Self {
        Request::GetLogs(r)
    }
}

/// Encode any request under the given key scheme.
pub fn encode_request(request: &Request, scheme: KeyScheme) -> CodecResult<Vec<u8>> {
    log::trace!("encoding {:?} request rid={} ({})", request, request.rid(), scheme);
    request.encode(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_request_golden_bytes() {
        let request = ReadRequest::new(2, [41000, 41001, 41002, 41003]);
        let bytes = request.encode(KeyScheme::Legacy).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x82, 0xa3, b'r', b'i', b'd', 0x02, 0xa4, b'r', b'e', b'a', b'd', 0x94, 0xcd, 0xa0,
                0x28, 0xcd, 0xa0, 0x29, 0xcd, 0xa0, 0x2a, 0xcd, 0xa0, 0x2b,
            ]
        );
    }

    #[test]
    fn test_reset_all_uses_write_key() {
        let request = ResetAllMessagesRequest::new(7);
        let bytes = request.encode(KeyScheme::Current).unwrap();
        let root = value::decode(&bytes).unwrap();
        let write = root.get("W").expect("should have write payload");
        assert_eq!(write.get_int(40053), Some(&Value::Int(1)));
        assert_eq!(
            ResetAllMessagesRequest::decode(&bytes, KeyScheme::Current).unwrap(),
            request
        );
    }

    fn query_keys(bytes: &[u8], payload: &str) -> Vec<Value> {
        let root = value::decode(bytes).unwrap();
        let query = root.get(payload).and_then(Value::as_map).expect("should have query map");
        query.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn test_message_query_writes_count_first() {
        let bytes = GetMessagesRequest::new(3).encode(KeyScheme::Legacy).unwrap();
        assert_eq!(
            query_keys(&bytes, "readMessages"),
            vec![Value::from("count"), Value::from("timestamp")]
        );
    }

    #[test]
    fn test_log_query_writes_timestamp_first() {
        let bytes = GetLogsRequest::new(3).encode(KeyScheme::Legacy).unwrap();
        assert_eq!(
            query_keys(&bytes, "readLog"),
            vec![Value::from("timestamp"), Value::from("count")]
        );
        let root = value::decode(&bytes).unwrap();
        let query = root.get("readLog").unwrap();
        assert_eq!(query.get("count"), Some(&Value::Int(500)));

        let bytes = GetLogsRequest::new(3).encode(KeyScheme::Current).unwrap();
        assert_eq!(query_keys(&bytes, "RL"), vec![Value::from("T"), Value::from("C")]);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected_before_encoding() {
        let mut request = GetMessagesRequest::new(1);
        request.read_messages.timestamp = vec![0; 5];
        let err = request.encode(KeyScheme::Legacy).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTimestampLength { actual: 5 }));
    }

    #[test]
    fn test_unsupported_read_element() {
        let request = ReadRequest {
            rid: 1,
            read: vec![Value::Int(1), Value::Nil],
        };
        let err = request.encode(KeyScheme::Legacy).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValueType(_)));
    }

    #[test]
    fn test_request_enum_dispatch() {
        let request: Request = ResetMessagesByIdRequest::new(9, [800, 801]).into();
        assert_eq!(request.rid(), 9);
        let bytes = encode_request(&request, KeyScheme::Current).unwrap();
        let decoded = ResetMessagesByIdRequest::decode(&bytes, KeyScheme::Current).unwrap();
        assert_eq!(decoded.message_ids, vec![Value::Int(800), Value::Int(801)]);
    }
}
